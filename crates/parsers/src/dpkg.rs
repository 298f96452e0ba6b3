// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for /var/log/dpkg.log: package install/upgrade/remove activity

use crate::registry::{LineParser, ParsedLine};
use crate::timestamp::parse_line_timestamp;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use vigil_core::catalog::{contains, HACKING_TOOLS};
use vigil_core::{LogCategory, LogEvent, LogSource, Severity};

// Allow expect here as the regexes are compile-time verified to be valid
#[allow(clippy::expect_used)]
static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static PACKAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s([a-zA-Z0-9.+-]+):([a-z0-9]+)\s").expect("constant regex pattern is valid")
});

const ACTIONS: &[&str] = &["install", "upgrade", "remove", "purge"];

const NO_VERSION: &str = "<none>";

/// Structured events from dpkg.log lines.
#[derive(Debug, Default)]
pub struct DpkgParser;

impl DpkgParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_action(line: &str) -> Option<&'static str> {
        ACTIONS
            .iter()
            .find(|action| line.contains(&format!(" {action} ")))
            .copied()
    }

    fn extract_package(line: &str) -> Option<(String, String)> {
        let captured = PACKAGE_PATTERN.captures(line)?;
        Some((
            captured.get(1)?.as_str().to_string(),
            captured.get(2)?.as_str().to_string(),
        ))
    }

    /// Old and new versions are the final two columns.
    fn extract_versions(line: &str) -> (String, String) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            return (NO_VERSION.to_string(), NO_VERSION.to_string());
        }
        (
            parts[parts.len() - 2].to_string(),
            parts[parts.len() - 1].to_string(),
        )
    }

    // TODO: replace with proper Debian version ordering (epoch:upstream-revision)
    fn is_downgrade(old_version: &str, new_version: &str) -> bool {
        if old_version == NO_VERSION || new_version == NO_VERSION {
            return false;
        }
        new_version < old_version
    }

    fn normalize_event_type(action: &str, old_version: &str, new_version: &str) -> &'static str {
        match action {
            "install" => "PACKAGE_INSTALL",
            "remove" => "PACKAGE_REMOVE",
            "purge" => "PACKAGE_PURGE",
            "upgrade" => {
                if Self::is_downgrade(old_version, new_version) {
                    "PACKAGE_DOWNGRADE"
                } else {
                    "PACKAGE_UPGRADE"
                }
            }
            _ => "PACKAGE_EVENT",
        }
    }

    fn estimate_severity(action: &str, package: Option<&str>) -> Severity {
        if let Some(package) = package {
            if contains(HACKING_TOOLS, package) {
                return Severity::High;
            }
        }
        if action == "install" || action == "remove" {
            return Severity::Medium;
        }
        Severity::Low
    }
}

impl LineParser for DpkgParser {
    fn source(&self) -> LogSource {
        LogSource::Dpkg
    }

    fn matches(&self, line: &str) -> bool {
        if line.is_empty() || !TIMESTAMP_PATTERN.is_match(line) {
            return false;
        }
        ACTIONS
            .iter()
            .any(|action| line.contains(&format!(" {action} ")))
    }

    fn parse(&self, line: &str) -> Option<ParsedLine> {
        let trimmed = line.trim();
        let action = Self::extract_action(trimmed)?;
        let package = Self::extract_package(trimmed);
        let (old_version, new_version) = Self::extract_versions(trimmed);

        let event_type = Self::normalize_event_type(action, &old_version, &new_version);
        let package_name = package.as_ref().map(|(name, _)| name.as_str());
        let severity = Self::estimate_severity(action, package_name);

        let message = format!(
            "{action} {} (old:{old_version} new:{new_version})",
            package_name.unwrap_or("unknown")
        );

        Some(ParsedLine {
            timestamp: parse_line_timestamp(trimmed),
            event: LogEvent {
                log_source: LogSource::Dpkg,
                event_type: event_type.to_string(),
                category: LogCategory::Package,
                severity,
                message,
                user: None,
                ip: None,
                process: None,
                extra: Some(json!({
                    "package": package.as_ref().map(|(name, _)| name.clone()),
                    "arch": package.as_ref().map(|(_, arch)| arch.clone()),
                    "action": action,
                    "old_version": old_version,
                    "new_version": new_version,
                })),
            },
        })
    }
}

#[cfg(test)]
#[path = "dpkg_tests.rs"]
mod tests;
