/*!
 * Shared test fixtures
 * In-memory process world driven by a fake quantum timer
 */

#![allow(dead_code)]

use mcp_scheduler::core::errors::{ProcessError, ProcessResult, SchedulerResult};
use mcp_scheduler::process::TickFlag;
use mcp_scheduler::{
    Control, ExitStatus, Pid, ProcessControl, Report, ReportSink, Sample, Sampler, Ticker,
    Workload,
};
use std::cell::RefCell;
use std::time::Duration;

pub const FIRST_PID: Pid = 1000;

/// Simulated child process
#[derive(Debug, Clone)]
pub struct FakeProc {
    pub pid: Pid,
    /// Quanta of CPU still needed before exit
    pub remaining: u32,
    pub exit_code: i32,
    pub started: bool,
    pub running: bool,
    pub exited: bool,
    pub reaped: bool,
    /// Quanta actually spent running
    pub quanta_run: u32,
}

#[derive(Debug, Default)]
struct WorldState {
    procs: Vec<FakeProc>,
    signals: Vec<(Pid, Control)>,
    rejected: usize,
    fail_status_queries: bool,
    max_running: usize,
    quanta: u64,
}

/// Process table standing in for the kernel
///
/// Workloads are `work <quanta> <exit-code>`; anything else needs one
/// quantum and exits 0.
#[derive(Debug, Default)]
pub struct FakeWorld {
    state: RefCell<WorldState>,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let one quantum elapse: every running, unexited process consumes it
    pub fn advance(&self) {
        let mut state = self.state.borrow_mut();
        state.quanta += 1;
        let running = state
            .procs
            .iter()
            .filter(|p| p.running && !p.exited)
            .count();
        state.max_running = state.max_running.max(running);
        for proc in state.procs.iter_mut().filter(|p| p.running && !p.exited) {
            proc.quanta_run += 1;
            proc.remaining = proc.remaining.saturating_sub(1);
            if proc.remaining == 0 {
                proc.exited = true;
            }
        }
    }

    pub fn procs(&self) -> Vec<FakeProc> {
        self.state.borrow().procs.clone()
    }

    pub fn signals(&self) -> Vec<(Pid, Control)> {
        self.state.borrow().signals.clone()
    }

    pub fn signals_of(&self, kind: Control) -> Vec<Pid> {
        self.state
            .borrow()
            .signals
            .iter()
            .filter(|(_, c)| *c == kind)
            .map(|(pid, _)| *pid)
            .collect()
    }

    /// Most processes ever seen running during one quantum
    pub fn max_running(&self) -> usize {
        self.state.borrow().max_running
    }

    /// Signals aimed at already reaped processes
    pub fn rejected_signals(&self) -> usize {
        self.state.borrow().rejected
    }

    /// Make every later non-blocking status query fail
    pub fn fail_status_queries(&self) {
        self.state.borrow_mut().fail_status_queries = true;
    }

    pub fn quanta(&self) -> u64 {
        self.state.borrow().quanta
    }

    fn with_proc<T>(
        &self,
        pid: Pid,
        f: impl FnOnce(&mut FakeProc) -> ProcessResult<T>,
    ) -> ProcessResult<T> {
        let mut state = self.state.borrow_mut();
        let proc = state
            .procs
            .iter_mut()
            .find(|p| p.pid == pid)
            .ok_or_else(|| ProcessError::StatusQueryFailed {
                pid,
                reason: "no such child".into(),
            })?;
        f(proc)
    }
}

fn parse_work(workload: &Workload) -> (u32, i32) {
    let args = workload.args();
    if workload.program() != Some("work") {
        return (1, 0);
    }
    let quanta = args.first().and_then(|v| v.parse().ok()).unwrap_or(1);
    let code = args.get(1).and_then(|v| v.parse().ok()).unwrap_or(0);
    (quanta, code)
}

impl ProcessControl for FakeWorld {
    fn spawn_paused(&self, workload: &Workload) -> ProcessResult<Pid> {
        let (remaining, exit_code) = parse_work(workload);
        let mut state = self.state.borrow_mut();
        let pid = FIRST_PID + state.procs.len() as Pid;
        state.procs.push(FakeProc {
            pid,
            remaining: remaining.max(1),
            exit_code,
            started: false,
            running: false,
            exited: false,
            reaped: false,
            quanta_run: 0,
        });
        Ok(pid)
    }

    fn send(&self, pid: Pid, control: Control) -> ProcessResult<()> {
        self.state.borrow_mut().signals.push((pid, control));
        let result = self.with_proc(pid, |proc| {
            if proc.reaped {
                return Err(ProcessError::SignalFailed {
                    pid,
                    signal: control.to_string(),
                    reason: "ESRCH".into(),
                });
            }
            match control {
                Control::Start => {
                    proc.started = true;
                    proc.running = true;
                }
                Control::Stop => proc.running = false,
                Control::Continue => proc.running = true,
                Control::Kill => {
                    proc.exited = true;
                    proc.exit_code = 137;
                }
            }
            Ok(())
        });
        if result.is_err() {
            self.state.borrow_mut().rejected += 1;
        }
        result
    }

    fn try_wait(&self, pid: Pid) -> ProcessResult<Option<ExitStatus>> {
        if self.state.borrow().fail_status_queries {
            return Err(ProcessError::StatusQueryFailed {
                pid,
                reason: "EINVAL".into(),
            });
        }
        self.with_proc(pid, |proc| {
            if proc.reaped {
                return Err(ProcessError::StatusQueryFailed {
                    pid,
                    reason: "ECHILD".into(),
                });
            }
            if !proc.exited {
                return Ok(None);
            }
            proc.reaped = true;
            Ok(Some(ExitStatus::Exited(proc.exit_code)))
        })
    }

    fn wait(&self, pid: Pid) -> ProcessResult<ExitStatus> {
        self.with_proc(pid, |proc| {
            if proc.reaped {
                return Err(ProcessError::StatusQueryFailed {
                    pid,
                    reason: "ECHILD".into(),
                });
            }
            // Blocking wait lets the process run to completion
            if !proc.exited {
                proc.quanta_run += proc.remaining;
                proc.remaining = 0;
                proc.exited = true;
            }
            proc.reaped = true;
            Ok(ExitStatus::Exited(proc.exit_code))
        })
    }
}

/// Timer whose every wait is exactly one quantum of the fake world
pub struct FakeTicker<'w> {
    world: &'w FakeWorld,
    flag: TickFlag,
    armed: Option<Duration>,
    pub arms: usize,
}

impl<'w> FakeTicker<'w> {
    pub fn new(world: &'w FakeWorld) -> Self {
        Self {
            world,
            flag: TickFlag::new(),
            armed: None,
            arms: 0,
        }
    }
}

impl Ticker for FakeTicker<'_> {
    fn arm(&mut self, quantum: Duration) -> SchedulerResult<()> {
        self.armed = Some(quantum);
        self.arms += 1;
        Ok(())
    }

    fn wait(&mut self) -> SchedulerResult<()> {
        assert!(self.armed.take().is_some(), "waited on a disarmed timer");
        self.world.advance();
        self.flag.raise();
        Ok(())
    }

    fn take_expired(&self) -> bool {
        self.flag.take()
    }
}

/// Sampler that knows nothing
pub struct BlankSampler;

impl Sampler for BlankSampler {
    fn sample(&self, _pid: Pid) -> Sample {
        Sample::unavailable()
    }
}

/// Sink that keeps every report it sees
#[derive(Default)]
pub struct CollectingSink {
    pub reports: Vec<(u64, Report)>,
}

impl ReportSink for CollectingSink {
    fn emit(&mut self, tick: u64, report: &Report) {
        self.reports.push((tick, report.clone()));
    }
}

/// `work <quanta> <code>` workloads in order
pub fn work(jobs: &[(u32, i32)]) -> Vec<Workload> {
    jobs.iter()
        .enumerate()
        .filter_map(|(i, (quanta, code))| {
            Workload::parse_line(i, i + 1, &format!("work {} {}", quanta, code))
        })
        .collect()
}
