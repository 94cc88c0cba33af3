/*!
 * Start Barrier
 * Releases every launched child at once, then parks them all
 */

use super::table::SlotTable;
use super::traits::ProcessControl;
use super::types::{Control, SlotState};
use crate::core::errors::ProcessResult;
use crate::core::types::Pid;
use std::time::Duration;
use tracing::{info, warn};

/// Fire-and-forget release of all paused children
#[derive(Debug, Clone, Copy)]
pub struct StartBarrier {
    grace: Duration,
}

impl StartBarrier {
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    /// Send the start signal to every blocked slot in order
    pub fn release<C>(&self, table: &mut SlotTable, control: &C) -> ProcessResult<()>
    where
        C: ProcessControl + ?Sized,
    {
        if !self.grace.is_zero() {
            info!("{} ms delay", self.grace.as_millis());
            std::thread::sleep(self.grace);
        }

        for index in table.live_indices() {
            let pid = table.slots()[index].pid;
            info!(slot = index, pid, "Sending SIGUSR1 to child process {} PID: {}", index, pid);
            deliver(control, pid, Control::Start);
            table.transition(index, SlotState::Ready)?;
        }
        Ok(())
    }

    /// Suspend every live slot so scheduling starts from a known baseline
    pub fn suspend_all<C>(&self, table: &mut SlotTable, control: &C) -> ProcessResult<()>
    where
        C: ProcessControl + ?Sized,
    {
        for index in table.live_indices() {
            let pid = table.slots()[index].pid;
            info!(slot = index, pid, "Sending SIGSTOP to process {} PID: {}", index, pid);
            deliver(control, pid, Control::Stop);
            table.transition(index, SlotState::Stopped)?;
        }
        Ok(())
    }

    /// Continue every live slot at once
    pub fn resume_all<C>(&self, table: &mut SlotTable, control: &C) -> ProcessResult<()>
    where
        C: ProcessControl + ?Sized,
    {
        for index in table.live_indices() {
            let pid = table.slots()[index].pid;
            info!(slot = index, pid, "Resuming child process {} PID: {}", index, pid);
            deliver(control, pid, Control::Continue);
            table.transition(index, SlotState::Running)?;
        }
        Ok(())
    }
}

fn deliver<C: ProcessControl + ?Sized>(control: &C, pid: Pid, signal: Control) {
    if let Err(e) = control.send(pid, signal) {
        warn!(pid, error = %e, "Signal delivery failed");
    }
}
