/*!
 * Process Module
 * Process launching, start barrier, slot bookkeeping and round-robin scheduling
 */

pub mod barrier;
pub mod executor;
pub mod launcher;
pub mod manager;
pub mod scheduler;
pub mod sigmask;
pub mod table;
pub mod timer;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use barrier::StartBarrier;
pub use executor::{OsProcessControl, START_SIGNAL};
pub use launcher::Launcher;
pub use manager::{ProcessManager, RunSummary};
pub use scheduler::{Scheduler, SchedulerStats, TickOutcome};
pub use sigmask::SigmaskGuard;
pub use table::SlotTable;
pub use timer::{AlarmTicker, TickFlag, Ticker, TICK_SIGNAL};
pub use traits::ProcessControl;
pub use types::{Control, Slot, SlotState};
