/*!
 * Core Types
 * Common types used across the scheduler
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// OS process ID type
pub type Pid = u32;

/// Position of a workload in the slot table
pub type SlotIndex = usize;

/// Exit status of a reaped process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExitStatus {
    /// Process called exit with this code
    Exited(i32),
    /// Process was killed by this signal number
    Signaled(i32),
}

impl ExitStatus {
    /// Shell-style exit code (128 + signo for signal deaths)
    pub fn code(&self) -> i32 {
        match *self {
            ExitStatus::Exited(code) => code,
            ExitStatus::Signaled(signo) => super::limits::SIGNAL_EXIT_BASE + signo,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Exited(code) => write!(f, "exited with status {}", code),
            ExitStatus::Signaled(signo) => write!(f, "killed by signal {}", signo),
        }
    }
}
