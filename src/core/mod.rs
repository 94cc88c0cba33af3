/*!
 * Core Module
 * Fundamental types, limits, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use config::{LivenessPolicy, McpConfig, ReportFormat, RunMode};
pub use errors::*;
pub use types::*;
