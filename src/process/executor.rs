/*!
 * Process Executor
 * Handles OS-level process spawning and control through fork/exec and signals
 */

use super::traits::ProcessControl;
use super::types::Control;
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::limits::EXEC_FAILED_EXIT_CODE;
use crate::core::types::{ExitStatus, Pid};
use crate::workload::Workload;
use nix::sys::signal::{kill, SigSet, Signal as UnixSignal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{execvp, fork, getpid, ForkResult, Pid as NixPid};
use std::ffi::CString;
use std::io::Write;
use tracing::{debug, info};

/// Signal that releases a child from the start barrier
pub const START_SIGNAL: UnixSignal = UnixSignal::SIGUSR1;

/// Set containing only the start signal
pub fn start_signal_set() -> SigSet {
    let mut set = SigSet::empty();
    set.add(START_SIGNAL);
    set
}

/// Controls real OS processes
///
/// Stateless: every call maps to one syscall family (fork, kill, waitpid).
/// Must be used from a single-threaded parent, since children run Rust code
/// between fork and exec.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProcessControl;

impl OsProcessControl {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessControl for OsProcessControl {
    fn spawn_paused(&self, workload: &Workload) -> ProcessResult<Pid> {
        if workload.argv.is_empty() {
            return Err(ProcessError::InvalidCommand(format!(
                "line {}: empty command",
                workload.line
            )));
        }

        // Build the exec arguments before forking so the child does no fallible setup
        let argv = workload
            .argv
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                ProcessError::InvalidCommand(format!("line {}: {}", workload.line, e))
            })?;

        // Buffered output would otherwise be duplicated into the child
        if let Err(e) = std::io::stdout().flush() {
            debug!(error = %e, "Failed to flush stdout before fork");
        }

        // SAFETY: the parent is single-threaded, and the child only adjusts its
        // signal mask, waits and execs (or exits).
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                let pid = child.as_raw() as Pid;
                info!(
                    pid,
                    slot = workload.index,
                    command = %workload.display_command(),
                    "Spawned child process"
                );
                Ok(pid)
            }
            Ok(ForkResult::Child) => await_start_then_exec(&argv),
            Err(e) => Err(ProcessError::SpawnFailed(format!(
                "{}: {}",
                workload.display_command(),
                e
            ))),
        }
    }

    fn send(&self, pid: Pid, control: Control) -> ProcessResult<()> {
        kill(NixPid::from_raw(pid as i32), control.as_unix()).map_err(|e| {
            ProcessError::SignalFailed {
                pid,
                signal: control.to_string(),
                reason: e.to_string(),
            }
        })?;
        debug!(pid, signal = %control, "Signal sent");
        Ok(())
    }

    fn try_wait(&self, pid: Pid) -> ProcessResult<Option<ExitStatus>> {
        let status = waitpid(NixPid::from_raw(pid as i32), Some(WaitPidFlag::WNOHANG))
            .map_err(|e| ProcessError::StatusQueryFailed {
                pid,
                reason: e.to_string(),
            })?;
        Ok(exit_status(status))
    }

    fn wait(&self, pid: Pid) -> ProcessResult<ExitStatus> {
        loop {
            let status = waitpid(NixPid::from_raw(pid as i32), None).map_err(|e| {
                ProcessError::StatusQueryFailed {
                    pid,
                    reason: e.to_string(),
                }
            })?;
            if let Some(exit) = exit_status(status) {
                return Ok(exit);
            }
        }
    }
}

/// Map a wait status to a final exit status, `None` while the child lives
fn exit_status(status: WaitStatus) -> Option<ExitStatus> {
    match status {
        WaitStatus::Exited(_, code) => Some(ExitStatus::Exited(code)),
        WaitStatus::Signaled(_, signal, _) => Some(ExitStatus::Signaled(signal as i32)),
        _ => None,
    }
}

/// Child side of the start barrier. Never returns.
fn await_start_then_exec(argv: &[CString]) -> ! {
    let me = getpid();
    let start = start_signal_set();

    let Some(program) = argv.first() else {
        child_exit()
    };

    // The parent already blocks the start signal across fork; blocking again
    // keeps this correct for callers that did not.
    if start.thread_block().is_err() {
        println!("PID {} cannot block {}", me, START_SIGNAL.as_str());
        child_exit()
    }

    println!("PID {} waiting for {}", me, START_SIGNAL.as_str());
    if let Err(e) = start.wait() {
        println!("PID {} sigwait failed: {}", me, e);
        child_exit()
    }
    println!("PID {} received {}", me, START_SIGNAL.as_str());

    // The workload starts with a clean signal mask
    let _ = SigSet::empty().thread_set_mask();

    let _ = execvp(program, argv);

    println!("execvp() failed for '{}'", program.to_string_lossy());
    child_exit()
}

/// Leave the child without returning into the parent's forked stack
fn child_exit() -> ! {
    let _ = std::io::stdout().flush();
    std::process::exit(EXEC_FAILED_EXIT_CODE)
}
