/*!
 * Process Types
 * Slot bookkeeping and the control signals exchanged with children
 */

use crate::core::types::{Pid, SlotIndex};
use crate::monitoring::Sample;
use nix::sys::signal::Signal as UnixSignal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// Fork in progress
    Launching,
    /// Paused in the child, waiting for the start signal
    Blocked,
    /// Start signal sent
    Ready,
    /// Currently holding the single run slot
    Running,
    /// Suspended with SIGSTOP
    Stopped,
    /// Reaped with this exit code
    Terminated(i32),
}

impl SlotState {
    #[inline]
    pub fn is_terminated(&self) -> bool {
        matches!(self, SlotState::Terminated(_))
    }

    /// Whether moving to `to` is a legal lifecycle step
    pub fn can_transition_to(&self, to: SlotState) -> bool {
        use SlotState::*;
        match (*self, to) {
            (Terminated(_), _) => false,
            (_, Terminated(_)) => true,
            (Launching, Blocked) => true,
            (Blocked, Ready) => true,
            (Ready, Stopped) | (Ready, Running) => true,
            (Stopped, Running) | (Running, Stopped) => true,
            // Re-selecting the only live slot
            (Running, Running) | (Stopped, Stopped) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotState::Launching => write!(f, "launching"),
            SlotState::Blocked => write!(f, "blocked"),
            SlotState::Ready => write!(f, "ready"),
            SlotState::Running => write!(f, "running"),
            SlotState::Stopped => write!(f, "stopped"),
            SlotState::Terminated(code) => write!(f, "terminated({})", code),
        }
    }
}

/// Scheduler bookkeeping for one workload's process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub index: SlotIndex,
    pub pid: Pid,
    pub state: SlotState,
    pub last_sample: Option<Sample>,
}

impl Slot {
    pub fn new(index: SlotIndex, pid: Pid) -> Self {
        Self {
            index,
            pid,
            state: SlotState::Launching,
            last_sample: None,
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.state.is_terminated()
    }
}

/// Signals the parent sends to children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// Release from the start barrier
    Start,
    /// Suspend at the end of a quantum
    Stop,
    /// Resume for a quantum
    Continue,
    /// Forced termination on abort
    Kill,
}

impl Control {
    pub fn as_unix(&self) -> UnixSignal {
        match self {
            Control::Start => UnixSignal::SIGUSR1,
            Control::Stop => UnixSignal::SIGSTOP,
            Control::Continue => UnixSignal::SIGCONT,
            Control::Kill => UnixSignal::SIGKILL,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_unix().as_str())
    }
}
