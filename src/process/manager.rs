/*!
 * Process Manager
 * Runs one batch of workloads end to end: launch, barrier, drive, reap
 */

use super::barrier::StartBarrier;
use super::executor::OsProcessControl;
use super::launcher::Launcher;
use super::scheduler::{Scheduler, SchedulerStats};
use super::table::SlotTable;
use super::timer::Ticker;
use super::traits::ProcessControl;
use super::types::Slot;
use crate::core::config::{McpConfig, RunMode};
use crate::core::errors::McpResult;
use crate::monitoring::{Monitor, ProcSampler, ReportSink, Sampler};
use crate::workload::Workload;
use tracing::{error, info};

/// Final state of a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub slots: Vec<Slot>,
    /// Present for round-robin runs
    pub stats: Option<SchedulerStats>,
}

impl RunSummary {
    /// Exit codes in slot order; `None` for slots that never terminated
    pub fn exit_codes(&self) -> Vec<Option<i32>> {
        self.slots
            .iter()
            .map(|slot| match slot.state {
                super::types::SlotState::Terminated(code) => Some(code),
                _ => None,
            })
            .collect()
    }
}

/// Owns the collaborators of a run
pub struct ProcessManager<C: ProcessControl, S: Sampler> {
    control: C,
    monitor: Monitor<S>,
    config: McpConfig,
}

impl ProcessManager<OsProcessControl, ProcSampler> {
    /// Real OS processes sampled from the configured procfs root
    pub fn from_config(config: McpConfig) -> Self {
        let sampler = ProcSampler::new(&config.proc_root);
        Self::new(OsProcessControl::new(), sampler, config)
    }
}

impl<C: ProcessControl, S: Sampler> ProcessManager<C, S> {
    pub fn new(control: C, sampler: S, config: McpConfig) -> Self {
        info!(mode = ?config.mode, "Process manager initialized");
        Self {
            control,
            monitor: Monitor::new(sampler),
            config,
        }
    }

    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Run every workload to termination
    ///
    /// On any fatal error after the first launch, every live child is killed
    /// and reaped before the error is returned.
    pub fn run<T>(
        &self,
        workloads: &[Workload],
        sink: &mut dyn ReportSink,
        ticker: &mut T,
    ) -> McpResult<RunSummary>
    where
        T: Ticker + ?Sized,
    {
        if workloads.is_empty() {
            info!("No workloads to schedule");
            return Ok(RunSummary {
                slots: Vec::new(),
                stats: None,
            });
        }

        let mut table = SlotTable::with_capacity(workloads.len());
        match self.drive(&mut table, workloads, sink, ticker) {
            Ok(stats) => {
                info!(slots = table.len(), "all processes terminated, exiting");
                Ok(RunSummary {
                    slots: table.slots().to_vec(),
                    stats,
                })
            }
            Err(e) => {
                error!(error = %e, live = table.active_count(), "Fatal error, cleaning up children");
                table.kill_and_reap_all(&self.control);
                Err(e)
            }
        }
    }

    fn drive<T>(
        &self,
        table: &mut SlotTable,
        workloads: &[Workload],
        sink: &mut dyn ReportSink,
        ticker: &mut T,
    ) -> McpResult<Option<SchedulerStats>>
    where
        T: Ticker + ?Sized,
    {
        let launcher = Launcher::new(&self.control)?;
        launcher.launch_all(table, workloads)?;
        launcher.finish()?;

        let barrier = StartBarrier::new(self.config.start_delay);
        barrier.release(table, &self.control)?;

        match self.config.mode {
            RunMode::Launch => {
                table.wait_all(&self.control)?;
                Ok(None)
            }
            RunMode::Barrier => {
                barrier.suspend_all(table, &self.control)?;
                barrier.resume_all(table, &self.control)?;
                table.wait_all(&self.control)?;
                Ok(None)
            }
            RunMode::RoundRobin => {
                barrier.suspend_all(table, &self.control)?;
                let mut scheduler = Scheduler::new(
                    table,
                    &self.control,
                    &self.monitor,
                    sink,
                    self.config.quantum,
                    self.config.liveness,
                );
                Ok(Some(scheduler.run(ticker)?))
            }
        }
    }
}
