// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Everything has a default, so `vigild` runs without any config file.
//! A TOML file tunes intervals, log sources, state location and the
//! writer queue; `VIGIL_STATE_DIR` overrides the state directory last.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use vigil_collectors::LogFileSource;
use vigil_core::LogSource;
use vigil_engine::SchedulerConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root directory for the database and collector state files.
    pub state_dir: PathBuf,
    pub intervals: Intervals,
    pub log_files: Vec<LogFileEntry>,
    pub process: ProcessSection,
    pub network: NetworkSection,
    pub writer: WriterSection,
}

/// Per-worker tick intervals in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Intervals {
    pub metrics: u64,
    pub process: u64,
    pub network: u64,
    pub log: u64,
    pub health: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogFileEntry {
    /// Source tag: auth, syslog, kernel, dpkg or ufw.
    pub source: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessSection {
    /// Hash executables (sha256) to detect binary replacement.
    pub hash_execs: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSection {
    /// Local `ip:port` endpoints to exclude from diffing (the agent's
    /// own sockets).
    pub ignore_local: Vec<String>,
    /// Remote addresses that raise CONNECTION_SUSPICIOUS_REMOTE.
    pub watch_remotes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterSection {
    pub queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            intervals: Intervals::default(),
            log_files: default_log_files(),
            process: ProcessSection::default(),
            network: NetworkSection::default(),
            writer: WriterSection::default(),
        }
    }
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            metrics: 60,
            process: 15,
            network: 15,
            log: 3,
            health: 2,
        }
    }
}

impl Default for WriterSection {
    fn default() -> Self {
        Self {
            queue_capacity: 10_000,
        }
    }
}

fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .map(|dir| dir.join("vigil"))
        .unwrap_or_else(|| PathBuf::from("/var/lib/vigil"))
}

fn default_log_files() -> Vec<LogFileEntry> {
    let entry = |source: &str, path: &str| LogFileEntry {
        source: source.to_string(),
        path: PathBuf::from(path),
    };
    vec![
        entry("auth", "/var/log/auth.log"),
        entry("syslog", "/var/log/syslog"),
        entry("kernel", "/var/log/kern.log"),
        entry("dpkg", "/var/log/dpkg.log"),
        entry("ufw", "/var/log/ufw.log"),
    ]
}

impl Config {
    /// Load configuration, defaults first, file second, environment
    /// override last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => toml::from_str(&std::fs::read_to_string(path)?)?,
            None => Config::default(),
        };
        if let Ok(dir) = std::env::var("VIGIL_STATE_DIR") {
            if !dir.is_empty() {
                config.state_dir = PathBuf::from(dir);
            }
        }
        Ok(config)
    }

    pub fn db_path(&self) -> PathBuf {
        self.state_dir.join("hids.db")
    }

    pub fn offsets_path(&self) -> PathBuf {
        self.state_dir.join("log_offsets.json")
    }

    pub fn process_prev_path(&self) -> PathBuf {
        self.state_dir.join("process_prev.json")
    }

    pub fn network_state_path(&self) -> PathBuf {
        self.state_dir.join("network_state.json")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join("vigild.pid")
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("vigild.log")
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            metrics_interval: Duration::from_secs(self.intervals.metrics),
            process_interval: Duration::from_secs(self.intervals.process),
            network_interval: Duration::from_secs(self.intervals.network),
            log_interval: Duration::from_secs(self.intervals.log),
            health_interval: Duration::from_secs(self.intervals.health),
        }
    }

    /// Log sources with recognized tags; unknown tags are skipped with
    /// a warning.
    pub fn log_sources(&self) -> Vec<LogFileSource> {
        self.log_files
            .iter()
            .filter_map(|entry| match LogSource::parse(&entry.source) {
                Some(source) => Some(LogFileSource {
                    source,
                    path: entry.path.clone(),
                }),
                None => {
                    warn!(source = %entry.source, "unknown log source tag, skipping");
                    None
                }
            })
            .collect()
    }

    /// Parsed `ip:port` ignore list; malformed entries are skipped with
    /// a warning.
    pub fn ignore_local_endpoints(&self) -> Vec<(String, u16)> {
        self.network
            .ignore_local
            .iter()
            .filter_map(|entry| {
                let (ip, port) = entry.rsplit_once(':')?;
                match port.parse::<u16>() {
                    Ok(port) => Some((ip.to_string(), port)),
                    Err(_) => {
                        warn!(entry = %entry, "malformed ignore_local endpoint, skipping");
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
