/*!
 * MCP Scheduler Library
 * Cooperative round-robin scheduling of child processes through signals
 */

pub mod core;
pub mod monitoring;
pub mod process;
pub mod workload;

// Re-exports
pub use crate::core::{ExitStatus, LivenessPolicy, McpConfig, McpError, Pid, ReportFormat, RunMode};
pub use monitoring::{init_tracing, Monitor, ProcSampler, Report, ReportSink, Sample, Sampler, StdoutSink};
pub use process::{
    AlarmTicker, Control, OsProcessControl, ProcessControl, ProcessManager, RunSummary, Scheduler,
    SchedulerStats, Slot, SlotState, SlotTable, Ticker,
};
pub use workload::{CommandSource, Workload};
