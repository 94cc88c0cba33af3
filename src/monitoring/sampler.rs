/*!
 * Process Sampling
 * Best-effort per-process accounting read from procfs
 *
 * Sources:
 * - /proc/<pid>/stat: name, state, utime (field 14), stime (field 15)
 * - /proc/<pid>/io: rchar, wchar
 *
 * Any field whose source is missing (the process was reaped between the
 * scheduler's check and the read) comes back as `None`.
 */

use super::report::{Report, ReportRow};
use crate::core::limits::FALLBACK_CLOCK_TICKS;
use crate::core::types::Pid;
use crate::process::SlotTable;
use nix::unistd::{sysconf, SysconfVar};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One snapshot of a process's accounting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub name: Option<String>,
    pub state: Option<char>,
    pub user_secs: Option<f64>,
    pub kernel_secs: Option<f64>,
    pub read_bytes: Option<u64>,
    pub write_bytes: Option<u64>,
}

impl Sample {
    /// Nothing could be read
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Source of per-process samples
pub trait Sampler {
    fn sample(&self, pid: Pid) -> Sample;
}

/// Fields of interest from a stat line
#[derive(Debug, Clone, PartialEq)]
struct StatFields {
    name: String,
    state: char,
    utime_ticks: u64,
    stime_ticks: u64,
}

impl StatFields {
    /// Parse `pid (comm) state ... utime stime ...`
    ///
    /// comm may hold spaces and parentheses, so it runs from the first `(`
    /// to the last `)`.
    fn parse(line: &str) -> Option<Self> {
        let open = line.find('(')?;
        let close = line.rfind(')')?;
        if close < open {
            return None;
        }
        let name = line[open + 1..close].to_string();

        // Fields after comm, starting at field 3 (state)
        let rest: Vec<&str> = line[close + 1..].split_whitespace().collect();
        let state = rest.first()?.chars().next()?;
        let utime_ticks = rest.get(11)?.parse().ok()?;
        let stime_ticks = rest.get(12)?.parse().ok()?;

        Some(Self {
            name,
            state,
            utime_ticks,
            stime_ticks,
        })
    }
}

/// `rchar`/`wchar` counters from an io file
fn parse_io(text: &str) -> (Option<u64>, Option<u64>) {
    let mut read = None;
    let mut write = None;
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("rchar:"), Some(v)) => read = v.parse().ok(),
            (Some("wchar:"), Some(v)) => write = v.parse().ok(),
            _ => {}
        }
    }
    (read, write)
}

/// Clock ticks per second for stat time fields
pub fn clock_ticks_per_sec() -> u64 {
    match sysconf(SysconfVar::CLK_TCK) {
        Ok(Some(ticks)) if ticks > 0 => ticks as u64,
        _ => FALLBACK_CLOCK_TICKS,
    }
}

/// procfs-backed sampler
#[derive(Debug, Clone)]
pub struct ProcSampler {
    root: PathBuf,
    clock_ticks: u64,
}

impl ProcSampler {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_clock_ticks(root, clock_ticks_per_sec())
    }

    pub fn with_clock_ticks(root: impl AsRef<Path>, clock_ticks: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            clock_ticks: clock_ticks.max(1),
        }
    }

    fn ticks_to_secs(&self, ticks: u64) -> f64 {
        ticks as f64 / self.clock_ticks as f64
    }
}

impl Sampler for ProcSampler {
    fn sample(&self, pid: Pid) -> Sample {
        let dir = self.root.join(pid.to_string());

        let stat = std::fs::read_to_string(dir.join("stat"))
            .ok()
            .and_then(|text| StatFields::parse(&text));
        let (read_bytes, write_bytes) = std::fs::read_to_string(dir.join("io"))
            .map(|text| parse_io(&text))
            .unwrap_or((None, None));

        match stat {
            Some(stat) => Sample {
                user_secs: Some(self.ticks_to_secs(stat.utime_ticks)),
                kernel_secs: Some(self.ticks_to_secs(stat.stime_ticks)),
                name: Some(stat.name),
                state: Some(stat.state),
                read_bytes,
                write_bytes,
            },
            None => Sample {
                read_bytes,
                write_bytes,
                ..Sample::unavailable()
            },
        }
    }
}

/// Builds per-tick reports from a sampler
#[derive(Debug, Clone)]
pub struct Monitor<S: Sampler> {
    sampler: S,
}

impl<S: Sampler> Monitor<S> {
    pub fn new(sampler: S) -> Self {
        Self { sampler }
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// One row per live slot in slot order. Reads only; never mutates `table`.
    pub fn report(&self, table: &SlotTable) -> Report {
        let rows = table
            .slots()
            .iter()
            .filter(|slot| slot.is_live())
            .map(|slot| ReportRow {
                slot: slot.index,
                pid: slot.pid,
                sample: self.sampler.sample(slot.pid),
            })
            .collect();
        Report { rows }
    }
}
