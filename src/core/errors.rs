/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::{Pid, SlotIndex};
use crate::process::types::SlotState;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Scheduler operation result
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Top-level result for a whole run
pub type McpResult<T> = Result<T, McpError>;

/// Process-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Slot {0} not found")]
    #[diagnostic(
        code(process::slot_not_found),
        help("Slot indexes follow input order and are never removed.")
    )]
    SlotNotFound(SlotIndex),

    #[error("Failed to create process: {0}")]
    #[diagnostic(
        code(process::spawn_failed),
        help("Check the process limit (ulimit -u) and available memory.")
    )]
    SpawnFailed(String),

    #[error("Invalid command: {0}")]
    #[diagnostic(
        code(process::invalid_command),
        help("Commands must not be empty or contain NUL bytes.")
    )]
    InvalidCommand(String),

    #[error("Failed to send {signal} to PID {pid}: {reason}")]
    #[diagnostic(
        code(process::signal_failed),
        help("The process may already have been reaped.")
    )]
    SignalFailed {
        pid: Pid,
        signal: String,
        reason: String,
    },

    #[error("Status query for PID {pid} failed: {reason}")]
    #[diagnostic(
        code(process::status_query_failed),
        help("The scheduler lost track of a child. This is an unrecoverable inconsistency.")
    )]
    StatusQueryFailed { pid: Pid, reason: String },

    #[error("Invalid state transition for slot {slot}: {from:?} -> {to:?}")]
    #[diagnostic(
        code(process::invalid_transition),
        help("Terminated slots never change state again.")
    )]
    InvalidStateTransition {
        slot: SlotIndex,
        from: SlotState,
        to: SlotState,
    },
}

/// Scheduler-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Timer failure: {0}")]
    #[diagnostic(
        code(scheduler::timer_failed),
        help("The quantum timer could not be created, armed or awaited.")
    )]
    TimerFailed(String),

    #[error("Signal mask update failed: {0}")]
    #[diagnostic(code(scheduler::sigmask_failed))]
    SignalMaskFailed(String),
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Unset the variable to use its default.")
    )]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Input file errors
#[derive(Error, Debug, Diagnostic)]
pub enum WorkloadError {
    #[error("Cannot read input file {path}")]
    #[diagnostic(
        code(workload::unreadable),
        help("Pass the path to a text file with one command per line.")
    )]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Unified error type for a run with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum McpError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Input error: {0}")]
    #[diagnostic(transparent)]
    Workload(#[from] WorkloadError),

    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Scheduler error: {0}")]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),
}
