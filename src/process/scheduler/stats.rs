/*!
 * Scheduler Statistics
 * Track and report scheduler activity over one run
 */

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters accumulated by the round-robin loop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerStats {
    /// Timer expiries handled
    pub ticks: u64,
    /// Resumes of a slot other than the one just preempted
    pub context_switches: u64,
    /// Stops of a live running slot at quantum end
    pub preemptions: u64,
    /// Slots reaped by the loop
    pub terminated: u64,
    pub quantum_ms: u64,
}

impl SchedulerStats {
    pub fn new(quantum: Duration) -> Self {
        Self {
            quantum_ms: quantum.as_millis() as u64,
            ..Self::default()
        }
    }
}
