/*!
 * Scheduler Limits and Constants
 *
 * Defaults and fixed values shared by the launcher, scheduler and monitor.
 */

use std::time::Duration;

// =============================================================================
// SCHEDULING
// =============================================================================

/// Default quantum length between scheduling decisions
pub const DEFAULT_QUANTUM: Duration = Duration::from_secs(1);

/// Default grace delay between the last launch and the start signal
/// Lets every child reach its wait before release
pub const DEFAULT_START_DELAY: Duration = Duration::from_secs(1);

// =============================================================================
// PROCESS
// =============================================================================

/// Exit status of a child whose program could not be executed
/// Matches `exit(-1)` truncated to 8 bits
pub const EXEC_FAILED_EXIT_CODE: i32 = 255;

/// Offset added to the signal number for children killed by a signal
pub const SIGNAL_EXIT_BASE: i32 = 128;

// =============================================================================
// MONITORING
// =============================================================================

/// Default procfs mount point
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Fallback clock tick rate when sysconf(CLK_TCK) is unavailable
/// [LINUX-COMPAT] USER_HZ is 100 on every mainstream Linux ABI
pub const FALLBACK_CLOCK_TICKS: u64 = 100;
