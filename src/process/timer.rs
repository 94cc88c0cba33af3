/*!
 * Quantum Timer
 *
 * One-shot POSIX timer delivering SIGALRM to the parent, consumed
 * synchronously with sigwait. Expiry is published through a single atomic
 * flag that only the expiry path raises and only the control loop clears.
 * Several expiries before the loop observes them collapse into one tick.
 */

use super::sigmask::SigmaskGuard;
use crate::core::errors::{SchedulerError, SchedulerResult};
use nix::sys::signal::{signal, SigEvent, SigHandler, SigSet, SigevNotify, Signal as UnixSignal};
use nix::sys::time::TimeSpec;
use nix::sys::timer::{Expiration, Timer, TimerSetTimeFlags};
use nix::time::ClockId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// Signal carrying quantum expiry
pub const TICK_SIGNAL: UnixSignal = UnixSignal::SIGALRM;

/// Single-word expiry notification
#[derive(Debug, Default)]
pub struct TickFlag(AtomicBool);

impl TickFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Called from the expiry path only
    #[inline]
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Observe and clear in one step
    #[inline]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Wakeup source driving the scheduling loop
///
/// `wait` may return without an expiry (a wakeup shared with other events);
/// the loop only ticks when `take_expired` reports one. Expiries that pile
/// up before `take_expired` is called count as a single tick.
pub trait Ticker {
    /// Arm for exactly one more quantum
    fn arm(&mut self, quantum: Duration) -> SchedulerResult<()>;

    /// Block until the next wakeup
    fn wait(&mut self) -> SchedulerResult<()>;

    /// Consume a pending expiry, if any
    fn take_expired(&self) -> bool;
}

/// SIGALRM-backed ticker for the real scheduler
pub struct AlarmTicker {
    timer: Option<Timer>,
    signals: SigSet,
    flag: TickFlag,
    _mask: SigmaskGuard,
}

impl AlarmTicker {
    /// Block the tick signal on this thread and create a disarmed timer
    pub fn new() -> SchedulerResult<Self> {
        let mut signals = SigSet::empty();
        signals.add(TICK_SIGNAL);
        let mask = SigmaskGuard::block(&signals)?;
        // An ignored signal is discarded even while blocked, so sigwait needs
        // the default disposition (a previous ticker leaves SIG_IGN behind)
        // SAFETY: installs SIG_DFL, no handler code runs
        unsafe { signal(TICK_SIGNAL, SigHandler::SigDfl) }
            .map_err(|e| SchedulerError::TimerFailed(format!("signal: {}", e)))?;

        let event = SigEvent::new(SigevNotify::SigevSignal {
            signal: TICK_SIGNAL,
            si_value: 0,
        });
        let timer = Timer::new(ClockId::CLOCK_MONOTONIC, event)
            .map_err(|e| SchedulerError::TimerFailed(format!("timer_create: {}", e)))?;

        Ok(Self {
            timer: Some(timer),
            signals,
            flag: TickFlag::new(),
            _mask: mask,
        })
    }
}

impl Ticker for AlarmTicker {
    fn arm(&mut self, quantum: Duration) -> SchedulerResult<()> {
        let timer = self
            .timer
            .as_mut()
            .ok_or_else(|| SchedulerError::TimerFailed("timer already released".into()))?;
        timer
            .set(
                Expiration::OneShot(TimeSpec::from(quantum)),
                TimerSetTimeFlags::empty(),
            )
            .map_err(|e| SchedulerError::TimerFailed(format!("timer_settime: {}", e)))?;
        debug!(?quantum, "Timer armed");
        Ok(())
    }

    fn wait(&mut self) -> SchedulerResult<()> {
        loop {
            match self.signals.wait() {
                Ok(sig) if sig == TICK_SIGNAL => {
                    self.flag.raise();
                    return Ok(());
                }
                Ok(_) => continue,
                Err(e) => return Err(SchedulerError::TimerFailed(format!("sigwait: {}", e))),
            }
        }
    }

    fn take_expired(&self) -> bool {
        self.flag.take()
    }
}

impl Drop for AlarmTicker {
    fn drop(&mut self) {
        // timer_delete first, then discard a possibly pending expiry so the
        // restored mask cannot let a stray SIGALRM terminate the parent
        self.timer.take();
        // SAFETY: installs SIG_IGN, no handler code runs
        let _ = unsafe { signal(TICK_SIGNAL, SigHandler::SigIgn) };
    }
}
