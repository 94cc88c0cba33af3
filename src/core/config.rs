/*!
 * Runtime Configuration
 *
 * Environment variables:
 * - MCP_QUANTUM_MS: quantum length in milliseconds (default: 1000)
 * - MCP_START_DELAY_MS: grace delay before the start signal (default: 1000)
 * - MCP_LIVENESS: `all` or `current` (default: all)
 * - MCP_MODE: `round-robin`, `barrier` or `launch` (default: round-robin)
 * - MCP_REPORT: `table`, `json` or `off` (default: table)
 * - MCP_PROC_ROOT: procfs root for the monitor (default: /proc)
 */

use super::errors::ConfigError;
use super::limits::{DEFAULT_PROC_ROOT, DEFAULT_QUANTUM, DEFAULT_START_DELAY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which slots are checked for exit on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessPolicy {
    /// Poll every live slot each tick
    #[default]
    All,
    /// Poll only the slot about to be preempted
    Current,
}

/// How the launched workloads are driven after the start barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Release everyone and wait for each child in order
    Launch,
    /// Release, stop all, continue all, then wait
    Barrier,
    /// Time-slice with SIGSTOP/SIGCONT on every quantum
    #[default]
    RoundRobin,
}

/// Per-tick report output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Off,
}

impl FromStr for LivenessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "eager" => Ok(Self::All),
            "current" | "lazy" => Ok(Self::Current),
            other => Err(format!("expected `all` or `current`, got `{}`", other)),
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "launch" => Ok(Self::Launch),
            "barrier" => Ok(Self::Barrier),
            "round-robin" | "round_robin" | "rr" => Ok(Self::RoundRobin),
            other => Err(format!(
                "expected `launch`, `barrier` or `round-robin`, got `{}`",
                other
            )),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "off" | "none" => Ok(Self::Off),
            other => Err(format!("expected `table`, `json` or `off`, got `{}`", other)),
        }
    }
}

/// Complete runtime configuration for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpConfig {
    pub quantum: Duration,
    pub start_delay: Duration,
    pub liveness: LivenessPolicy,
    pub mode: RunMode,
    pub report: ReportFormat,
    pub proc_root: PathBuf,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            start_delay: DEFAULT_START_DELAY,
            liveness: LivenessPolicy::default(),
            mode: RunMode::default(),
            report: ReportFormat::default(),
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
        }
    }
}

impl McpConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("MCP_QUANTUM_MS") {
            let millis = parse_millis("MCP_QUANTUM_MS", &raw)?;
            if millis == 0 {
                return Err(invalid("MCP_QUANTUM_MS", raw, "quantum must be positive"));
            }
            config.quantum = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup("MCP_START_DELAY_MS") {
            config.start_delay = Duration::from_millis(parse_millis("MCP_START_DELAY_MS", &raw)?);
        }
        if let Some(raw) = lookup("MCP_LIVENESS") {
            config.liveness = raw.parse().map_err(|e| invalid("MCP_LIVENESS", raw, e))?;
        }
        if let Some(raw) = lookup("MCP_MODE") {
            config.mode = raw.parse().map_err(|e| invalid("MCP_MODE", raw, e))?;
        }
        if let Some(raw) = lookup("MCP_REPORT") {
            config.report = raw.parse().map_err(|e| invalid("MCP_REPORT", raw, e))?;
        }
        if let Some(raw) = lookup("MCP_PROC_ROOT") {
            if raw.trim().is_empty() {
                return Err(invalid("MCP_PROC_ROOT", raw, "path is empty"));
            }
            config.proc_root = PathBuf::from(raw);
        }

        Ok(config)
    }
}

fn parse_millis(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| invalid(key, raw.to_string(), e.to_string()))
}

fn invalid(key: &'static str, value: String, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = McpConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, McpConfig::default());
        assert_eq!(config.quantum, Duration::from_secs(1));
        assert_eq!(config.liveness, LivenessPolicy::All);
        assert_eq!(config.mode, RunMode::RoundRobin);
    }

    #[test]
    fn test_overrides() {
        let config = McpConfig::from_lookup(lookup_from(&[
            ("MCP_QUANTUM_MS", "50"),
            ("MCP_START_DELAY_MS", "0"),
            ("MCP_LIVENESS", "current"),
            ("MCP_MODE", "barrier"),
            ("MCP_REPORT", "json"),
            ("MCP_PROC_ROOT", "/tmp/fakeproc"),
        ]))
        .unwrap();

        assert_eq!(config.quantum, Duration::from_millis(50));
        assert_eq!(config.start_delay, Duration::ZERO);
        assert_eq!(config.liveness, LivenessPolicy::Current);
        assert_eq!(config.mode, RunMode::Barrier);
        assert_eq!(config.report, ReportFormat::Json);
        assert_eq!(config.proc_root, PathBuf::from("/tmp/fakeproc"));
    }

    #[test]
    fn test_zero_quantum_rejected() {
        let err = McpConfig::from_lookup(lookup_from(&[("MCP_QUANTUM_MS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "MCP_QUANTUM_MS",
                ..
            }
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(McpConfig::from_lookup(lookup_from(&[("MCP_QUANTUM_MS", "fast")])).is_err());
        assert!(McpConfig::from_lookup(lookup_from(&[("MCP_MODE", "fifo")])).is_err());
        assert!(McpConfig::from_lookup(lookup_from(&[("MCP_REPORT", "xml")])).is_err());
    }
}
