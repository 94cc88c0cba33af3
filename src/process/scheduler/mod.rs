/*!
 * Round-Robin Scheduler
 *
 * Time-slices child processes from a single control thread. Exactly one
 * slot holds the run slot between ticks; every other live slot is
 * stopped. State reaches the children only through SIGSTOP/SIGCONT.
 */

use super::table::SlotTable;
use super::traits::ProcessControl;
use crate::core::config::LivenessPolicy;
use crate::core::types::SlotIndex;
use crate::monitoring::{Monitor, ReportSink, Sampler};
use std::time::Duration;
use tracing::info;

mod operations;
mod stats;

pub use stats::SchedulerStats;

/// Result of handling one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Slots remain; re-arm the timer
    Continue,
    /// Every slot is terminated
    Finished,
}

/// Round-robin control loop over a slot table
pub struct Scheduler<'a, C, S>
where
    C: ProcessControl + ?Sized,
    S: Sampler,
{
    table: &'a mut SlotTable,
    control: &'a C,
    monitor: &'a Monitor<S>,
    sink: &'a mut dyn ReportSink,
    quantum: Duration,
    liveness: LivenessPolicy,
    current: SlotIndex,
    tick: u64,
    stats: SchedulerStats,
}

impl<'a, C, S> Scheduler<'a, C, S>
where
    C: ProcessControl + ?Sized,
    S: Sampler,
{
    /// Expects every live slot in `table` to be stopped
    pub fn new(
        table: &'a mut SlotTable,
        control: &'a C,
        monitor: &'a Monitor<S>,
        sink: &'a mut dyn ReportSink,
        quantum: Duration,
        liveness: LivenessPolicy,
    ) -> Self {
        info!(
            slots = table.len(),
            ?quantum,
            ?liveness,
            "Round-robin scheduler initialized"
        );
        Self {
            table,
            control,
            monitor,
            sink,
            quantum,
            liveness,
            current: 0,
            tick: 0,
            stats: SchedulerStats::new(quantum),
        }
    }

    /// Slot believed to be running
    pub fn current(&self) -> SlotIndex {
        self.current
    }

    /// Ticks handled so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn table(&self) -> &SlotTable {
        &*self.table
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn quantum(&self) -> Duration {
        self.quantum
    }
}
