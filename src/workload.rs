/*!
 * Workload Source
 * Turns an input file into an ordered list of commands to schedule
 */

use crate::core::errors::WorkloadError;
use crate::core::types::SlotIndex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One command to run as a scheduled process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Position in the slot table
    pub index: SlotIndex,
    /// 1-based line number in the input file
    pub line: usize,
    /// Program followed by its arguments
    pub argv: Vec<String>,
}

impl Workload {
    /// Parse one input line. Returns `None` for blank lines.
    pub fn parse_line(index: SlotIndex, line: usize, text: &str) -> Option<Self> {
        let argv: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        if argv.is_empty() {
            return None;
        }
        Some(Self { index, line, argv })
    }

    /// Program to execute, resolved through PATH at exec time
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Arguments after the program name
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }

    pub fn display_command(&self) -> String {
        self.argv.join(" ")
    }
}

/// Ordered, finite sequence of workloads with the count known up front
#[derive(Debug, Clone, Default)]
pub struct CommandSource {
    workloads: Vec<Workload>,
}

impl CommandSource {
    /// Read and parse an input file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, WorkloadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| WorkloadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let mut workloads = Vec::new();
        for (n, line) in text.lines().enumerate() {
            if let Some(workload) = Workload::parse_line(workloads.len(), n + 1, line) {
                workloads.push(workload);
            }
        }
        Self { workloads }
    }

    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workload> {
        self.workloads.iter()
    }

    pub fn into_workloads(self) -> Vec<Workload> {
        self.workloads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_line_splits_on_whitespace() {
        let w = Workload::parse_line(0, 1, "  sleep\t2   \n").unwrap();
        assert_eq!(w.argv, vec!["sleep".to_string(), "2".to_string()]);
        assert_eq!(w.program(), Some("sleep"));
        assert_eq!(w.args(), &["2".to_string()]);
    }

    #[test]
    fn test_hand_built_empty_workload_has_no_program() {
        let w = Workload {
            index: 0,
            line: 1,
            argv: Vec::new(),
        };
        assert_eq!(w.program(), None);
        assert!(w.args().is_empty());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert!(Workload::parse_line(0, 1, "   ").is_none());

        let source = CommandSource::parse("ls -l\n\n   \nsleep 1\n");
        assert_eq!(source.len(), 2);

        let workloads = source.into_workloads();
        assert_eq!(workloads[0].index, 0);
        assert_eq!(workloads[0].line, 1);
        assert_eq!(workloads[1].index, 1);
        assert_eq!(workloads[1].line, 4);
        assert_eq!(workloads[1].display_command(), "sleep 1");
    }

    #[test]
    fn test_empty_input() {
        let source = CommandSource::parse("");
        assert!(source.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = CommandSource::from_path("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, WorkloadError::Unreadable { .. }));
    }
}
