/*!
 * Signal Mask Guard
 * Scoped blocking of signals on the calling thread with automatic restore
 */

use crate::core::errors::{SchedulerError, SchedulerResult};
use nix::sys::signal::{SigSet, SigmaskHow};
use tracing::warn;

/// Blocks a signal set until dropped, then restores the previous mask
///
/// Children forked while the guard is alive inherit the blocked set.
#[must_use = "the mask is restored as soon as the guard is dropped"]
pub struct SigmaskGuard {
    previous: Option<SigSet>,
}

impl SigmaskGuard {
    pub fn block(set: &SigSet) -> SchedulerResult<Self> {
        let previous = set
            .thread_swap_mask(SigmaskHow::SIG_BLOCK)
            .map_err(|e| SchedulerError::SignalMaskFailed(e.to_string()))?;
        Ok(Self {
            previous: Some(previous),
        })
    }

    /// Restore the previous mask now instead of at drop
    pub fn restore(mut self) -> SchedulerResult<()> {
        match self.previous.take() {
            Some(previous) => previous
                .thread_set_mask()
                .map_err(|e| SchedulerError::SignalMaskFailed(e.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for SigmaskGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = previous.thread_set_mask() {
                warn!(error = %e, "Failed to restore signal mask");
            }
        }
    }
}
