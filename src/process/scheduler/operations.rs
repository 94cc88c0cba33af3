/*!
 * Scheduler Core Operations
 * Start, tick and run loop
 */

use super::{Scheduler, TickOutcome};
use crate::core::config::LivenessPolicy;
use crate::core::errors::SchedulerResult;
use crate::monitoring::Sampler;
use crate::process::timer::Ticker;
use crate::process::traits::ProcessControl;
use crate::process::types::{Control, SlotState};
use tracing::{debug, info, warn};

impl<'a, C, S> Scheduler<'a, C, S>
where
    C: ProcessControl + ?Sized,
    S: Sampler,
{
    /// Give the run slot to the first live slot
    pub fn start(&mut self) -> SchedulerResult<()> {
        let Some(first) = self.table.live_indices().first().copied() else {
            return Ok(());
        };
        self.current = first;
        self.resume(first)?;
        info!(slot = first, "Scheduling started");
        Ok(())
    }

    /// Handle one quantum expiry
    ///
    /// report → reap → stop current → advance → resume next
    pub fn tick(&mut self) -> SchedulerResult<TickOutcome> {
        self.tick += 1;
        self.stats.ticks += 1;

        let report = self.monitor.report(&*self.table);
        self.sink.emit(self.tick, &report);
        self.table.record_samples(&report);

        self.reap()?;
        if self.table.active_count() == 0 {
            info!(tick = self.tick, "All processes terminated");
            return Ok(TickOutcome::Finished);
        }

        let previous = self.current;
        let still_live = self
            .table
            .get(previous)
            .map(|slot| slot.is_live())
            .unwrap_or(false);
        if still_live {
            self.suspend(previous)?;
        }

        let Some(next) = self.table.next_live_after(previous) else {
            return Ok(TickOutcome::Finished);
        };
        self.resume(next)?;
        if next != previous {
            self.stats.context_switches += 1;
        }
        self.current = next;

        debug!(
            tick = self.tick,
            from = previous,
            to = next,
            active = self.table.active_count(),
            "Tick handled"
        );
        Ok(TickOutcome::Continue)
    }

    /// Drive ticks until every slot terminates
    pub fn run<T>(&mut self, ticker: &mut T) -> SchedulerResult<super::SchedulerStats>
    where
        T: Ticker + ?Sized,
    {
        if self.table.active_count() == 0 {
            return Ok(self.stats.clone());
        }

        self.start()?;
        ticker.arm(self.quantum)?;
        info!("alarm set");

        loop {
            ticker.wait()?;
            if !ticker.take_expired() {
                continue;
            }
            match self.tick()? {
                TickOutcome::Finished => break,
                TickOutcome::Continue => ticker.arm(self.quantum)?,
            }
        }

        info!(
            ticks = self.stats.ticks,
            context_switches = self.stats.context_switches,
            preemptions = self.stats.preemptions,
            terminated = self.stats.terminated,
            "Scheduler finished"
        );
        Ok(self.stats.clone())
    }

    /// Non-blocking exit checks per the liveness policy
    fn reap(&mut self) -> SchedulerResult<()> {
        let candidates = match self.liveness {
            LivenessPolicy::Current => vec![self.current],
            LivenessPolicy::All => self.table.live_indices(),
        };
        for index in candidates {
            if self.table.reap(index, self.control)?.is_some() {
                self.stats.terminated += 1;
            }
        }
        Ok(())
    }

    fn suspend(&mut self, index: usize) -> SchedulerResult<()> {
        let pid = self.table.slots()[index].pid;
        if let Err(e) = self.control.send(pid, Control::Stop) {
            warn!(pid, error = %e, "Failed to stop process");
        }
        if self.table.transition(index, SlotState::Stopped)? == SlotState::Running {
            self.stats.preemptions += 1;
        }
        Ok(())
    }

    fn resume(&mut self, index: usize) -> SchedulerResult<()> {
        let pid = self.table.slots()[index].pid;
        if let Err(e) = self.control.send(pid, Control::Continue) {
            warn!(pid, error = %e, "Failed to resume process");
        }
        self.table.transition(index, SlotState::Running)?;
        Ok(())
    }
}
