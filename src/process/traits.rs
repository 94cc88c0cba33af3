/*!
 * Process Traits
 * Process control abstractions the scheduler depends on
 */

use super::types::Control;
use crate::core::errors::ProcessResult;
use crate::core::types::{ExitStatus, Pid};
use crate::workload::Workload;

/// Capability set over OS processes
///
/// The scheduler only ever talks to children through this trait, so the
/// whole scheduling loop can run against an in-memory fake.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessControl {
    /// Create a process that pauses until `Control::Start` before running `workload`
    fn spawn_paused(&self, workload: &Workload) -> ProcessResult<Pid>;

    /// Deliver a control signal without waiting for acknowledgment
    fn send(&self, pid: Pid, control: Control) -> ProcessResult<()>;

    /// Reap `pid` if it has exited, never blocking
    fn try_wait(&self, pid: Pid) -> ProcessResult<Option<ExitStatus>>;

    /// Block until `pid` exits and reap it
    fn wait(&self, pid: Pid) -> ProcessResult<ExitStatus>;
}
