/*!
 * Slot Table
 * Per-workload process bookkeeping, state transitions and reaping
 */

use super::traits::ProcessControl;
use super::types::{Control, Slot, SlotState};
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::types::{ExitStatus, Pid, SlotIndex};
use crate::monitoring::Report;
use tracing::{info, warn};

/// Slots in workload order plus the count of slots not yet terminated
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    slots: Vec<Slot>,
    active: usize,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            active: 0,
        }
    }

    /// Record a freshly forked process at the next position
    pub fn insert(&mut self, pid: Pid) -> SlotIndex {
        let index = self.slots.len();
        self.slots.push(Slot::new(index, pid));
        self.active += 1;
        index
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots not yet terminated
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn get(&self, index: SlotIndex) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn live_indices(&self) -> Vec<SlotIndex> {
        self.slots
            .iter()
            .filter(|s| s.is_live())
            .map(|s| s.index)
            .collect()
    }

    pub fn running_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state == SlotState::Running)
            .count()
    }

    /// Move a slot to `to`, returning its previous state
    pub fn transition(&mut self, index: SlotIndex, to: SlotState) -> ProcessResult<SlotState> {
        let slot = self.slot_mut(index)?;
        let from = slot.state;
        if !from.can_transition_to(to) {
            return Err(ProcessError::InvalidStateTransition {
                slot: index,
                from,
                to,
            });
        }
        slot.state = to;
        if to.is_terminated() {
            self.active -= 1;
        }
        Ok(from)
    }

    /// Next live slot after `index` in circular order, `index` itself last
    pub fn next_live_after(&self, index: SlotIndex) -> Option<SlotIndex> {
        let n = self.slots.len();
        if n == 0 {
            return None;
        }
        (1..=n)
            .map(|step| (index + step) % n)
            .find(|&i| self.slots[i].is_live())
    }

    /// Non-blocking exit check for one slot; terminated slots are skipped
    pub fn reap<C>(&mut self, index: SlotIndex, control: &C) -> ProcessResult<Option<ExitStatus>>
    where
        C: ProcessControl + ?Sized,
    {
        let slot = self.slot_mut(index)?;
        if !slot.is_live() {
            return Ok(None);
        }
        let pid = slot.pid;
        match control.try_wait(pid)? {
            Some(status) => {
                self.terminate(index, status)?;
                Ok(Some(status))
            }
            None => Ok(None),
        }
    }

    /// Blocking wait for every live slot in order
    pub fn wait_all<C>(&mut self, control: &C) -> ProcessResult<()>
    where
        C: ProcessControl + ?Sized,
    {
        for index in self.live_indices() {
            let pid = self.slots[index].pid;
            let status = control.wait(pid)?;
            self.terminate(index, status)?;
        }
        Ok(())
    }

    /// Kill and reap every live slot. Used on abort paths; never fails.
    pub fn kill_and_reap_all<C>(&mut self, control: &C)
    where
        C: ProcessControl + ?Sized,
    {
        for index in self.live_indices() {
            let pid = self.slots[index].pid;
            if let Err(e) = control.send(pid, Control::Kill) {
                warn!(pid, error = %e, "Failed to kill child during cleanup");
            }
            match control.wait(pid) {
                Ok(status) => {
                    let _ = self.terminate(index, status);
                }
                Err(e) => {
                    warn!(pid, error = %e, "Failed to reap child during cleanup");
                    let _ = self.transition(index, SlotState::Terminated(-1));
                }
            }
        }
    }

    /// Store the latest monitor rows on their slots
    pub fn record_samples(&mut self, report: &Report) {
        for row in &report.rows {
            if let Some(slot) = self.slots.get_mut(row.slot) {
                slot.last_sample = Some(row.sample.clone());
            }
        }
    }

    fn terminate(&mut self, index: SlotIndex, status: ExitStatus) -> ProcessResult<()> {
        let pid = self.slots[index].pid;
        self.transition(index, SlotState::Terminated(status.code()))?;
        info!(
            pid,
            slot = index,
            code = status.code(),
            active = self.active,
            "PID {} {}",
            pid,
            status
        );
        Ok(())
    }

    fn slot_mut(&mut self, index: SlotIndex) -> ProcessResult<&mut Slot> {
        self.slots
            .get_mut(index)
            .ok_or(ProcessError::SlotNotFound(index))
    }
}
