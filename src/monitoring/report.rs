/*!
 * Tick Reports
 * Tabular and JSON rendering of per-slot samples
 */

use super::sampler::Sample;
use crate::core::config::ReportFormat;
use crate::core::types::{Pid, SlotIndex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use tracing::warn;

/// Sample of one live slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub slot: SlotIndex,
    pub pid: Pid,
    #[serde(flatten)]
    pub sample: Sample,
}

/// Samples of every live slot at one instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct Field<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for Field<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => fmt::Display::fmt(v, f),
            None => f.write_str("-"),
        }
    }
}

fn secs(value: &Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.6}", v),
        None => "-".to_string(),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<8} {:<16} {:<6} {:>12} {:>12} {:>12} {:>12}",
            "PID", "PROC NAME", "STATE", "USER TIME", "KERNEL TIME", "READ", "WRITE"
        )?;
        for row in &self.rows {
            let s = &row.sample;
            writeln!(
                f,
                "{:<8} {:<16} {:<6} {:>12} {:>12} {:>12} {:>12}",
                row.pid,
                Field(&s.name).to_string(),
                Field(&s.state).to_string(),
                secs(&s.user_secs),
                secs(&s.kernel_secs),
                Field(&s.read_bytes).to_string(),
                Field(&s.write_bytes).to_string(),
            )?;
        }
        Ok(())
    }
}

/// JSON line for one row
#[derive(Serialize)]
struct JsonRow<'a> {
    tick: u64,
    #[serde(flatten)]
    row: &'a ReportRow,
}

/// Destination for per-tick reports
pub trait ReportSink {
    fn emit(&mut self, tick: u64, report: &Report);
}

/// Writes reports to stdout in the configured format
#[derive(Debug, Clone, Copy)]
pub struct StdoutSink {
    format: ReportFormat,
}

impl StdoutSink {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }
}

impl ReportSink for StdoutSink {
    fn emit(&mut self, tick: u64, report: &Report) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let result = render(self.format, tick, report, &mut out);
        if let Err(e) = result {
            warn!(tick, error = %e, "Failed to write report");
        }
    }
}

/// Render one report into `out`
pub fn render<W: Write>(
    format: ReportFormat,
    tick: u64,
    report: &Report,
    out: &mut W,
) -> std::io::Result<()> {
    match format {
        ReportFormat::Off => Ok(()),
        ReportFormat::Table => write!(out, "{}", report),
        ReportFormat::Json => {
            for row in &report.rows {
                serde_json::to_writer(&mut *out, &JsonRow { tick, row })?;
                writeln!(out)?;
            }
            Ok(())
        }
    }
}

/// Discards every report
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn emit(&mut self, _tick: u64, _report: &Report) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_report() -> Report {
        Report {
            rows: vec![
                ReportRow {
                    slot: 0,
                    pid: 101,
                    sample: Sample {
                        name: Some("sleep".into()),
                        state: Some('T'),
                        user_secs: Some(0.5),
                        kernel_secs: Some(0.01),
                        read_bytes: Some(1024),
                        write_bytes: Some(0),
                    },
                },
                ReportRow {
                    slot: 1,
                    pid: 102,
                    sample: Sample::unavailable(),
                },
            ],
        }
    }

    #[test]
    fn test_table_rendering() {
        let text = sample_report().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("PID"));
        assert!(lines[1].contains("sleep"));
        assert!(lines[1].contains("0.500000"));
        assert!(lines[1].contains("1024"));
        // Unavailable fields degrade to dashes
        let cols: Vec<&str> = lines[2].split_whitespace().collect();
        assert_eq!(cols, vec!["102", "-", "-", "-", "-", "-", "-"]);
    }

    #[test]
    fn test_json_rendering() {
        let mut buf = Vec::new();
        render(ReportFormat::Json, 3, &sample_report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["tick"], 3);
        assert_eq!(first["pid"], 101);
        assert_eq!(first["name"], "sleep");
        assert_eq!(first["state"], "T");

        let second: serde_json::Value = serde_json::from_str(text.lines().nth(1).unwrap()).unwrap();
        assert!(second["name"].is_null());
    }

    #[test]
    fn test_off_renders_nothing() {
        let mut buf = Vec::new();
        render(ReportFormat::Off, 1, &sample_report(), &mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
