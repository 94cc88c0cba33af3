/*!
 * Process Launcher
 * Forks one paused child per workload and records it in the slot table
 */

use super::executor::start_signal_set;
use super::sigmask::SigmaskGuard;
use super::table::SlotTable;
use super::traits::ProcessControl;
use super::types::SlotState;
use crate::core::errors::{ProcessResult, SchedulerResult};
use crate::core::types::SlotIndex;
use crate::workload::Workload;
use tracing::info;

/// Launch phase of a run
///
/// Holds the start signal blocked in the parent while alive, so every child
/// inherits it blocked and an early release cannot kill a child that has
/// not reached its wait yet.
pub struct Launcher<'a, C: ProcessControl + ?Sized> {
    control: &'a C,
    mask: SigmaskGuard,
}

impl<'a, C: ProcessControl + ?Sized> Launcher<'a, C> {
    pub fn new(control: &'a C) -> SchedulerResult<Self> {
        let mask = SigmaskGuard::block(&start_signal_set())?;
        Ok(Self { control, mask })
    }

    /// Fork one child and record it before returning
    pub fn launch(&self, table: &mut SlotTable, workload: &Workload) -> ProcessResult<SlotIndex> {
        let pid = self.control.spawn_paused(workload)?;
        let index = table.insert(pid);
        table.transition(index, SlotState::Blocked)?;
        Ok(index)
    }

    /// Launch every workload in order. Stops at the first failure; children
    /// created so far stay in `table` for cleanup.
    pub fn launch_all(&self, table: &mut SlotTable, workloads: &[Workload]) -> ProcessResult<()> {
        for workload in workloads {
            self.launch(table, workload)?;
        }
        info!(count = table.len(), "All child processes launched");
        Ok(())
    }

    /// End the launch phase and restore the parent's signal mask
    pub fn finish(self) -> SchedulerResult<()> {
        self.mask.restore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ProcessError;
    use crate::process::traits::MockProcessControl;
    use crate::workload::CommandSource;

    #[test]
    fn test_launch_all_records_in_order() {
        let workloads = CommandSource::parse("a\nb\nc\n").into_workloads();
        let mut control = MockProcessControl::new();
        control
            .expect_spawn_paused()
            .times(3)
            .returning(|w| Ok(500 + w.index as u32));

        let mut table = SlotTable::new();
        let launcher = Launcher::new(&control).unwrap();
        launcher.launch_all(&mut table, &workloads).unwrap();
        launcher.finish().unwrap();

        let pids: Vec<u32> = table.slots().iter().map(|s| s.pid).collect();
        assert_eq!(pids, vec![500, 501, 502]);
        assert!(table.slots().iter().all(|s| s.state == SlotState::Blocked));
    }

    #[test]
    fn test_spawn_failure_keeps_earlier_children() {
        let workloads = CommandSource::parse("a\nb\nc\n").into_workloads();
        let mut control = MockProcessControl::new();
        control.expect_spawn_paused().returning(|w| {
            if w.index == 1 {
                Err(ProcessError::SpawnFailed("EAGAIN".into()))
            } else {
                Ok(700 + w.index as u32)
            }
        });

        let mut table = SlotTable::new();
        let launcher = Launcher::new(&control).unwrap();
        let err = launcher.launch_all(&mut table, &workloads).unwrap_err();

        assert!(matches!(err, ProcessError::SpawnFailed(_)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().pid, 700);
    }
}
