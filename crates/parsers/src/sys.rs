// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for /var/log/syslog: service lifecycle and general system noise

use crate::registry::{LineParser, ParsedLine};
use crate::timestamp::{has_leading_timestamp, parse_line_timestamp};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use vigil_core::{LogCategory, LogEvent, LogSource, Severity};

// Allow expect here as the regexes are compile-time verified to be valid
#[allow(clippy::expect_used)]
static UNIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9@_.\-]+)\.(?:service|socket|timer|mount)")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static VERB_TARGET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Failed to start|Started|Stopped)\s+(.+?)\.?$")
        .expect("constant regex pattern is valid")
});

/// Classifies syslog lines into service and system events.
#[derive(Debug, Default)]
pub struct SysParser;

impl SysParser {
    pub fn new() -> Self {
        Self
    }

    fn detect_event_type(line: &str) -> &'static str {
        let lower = line.to_ascii_lowercase();

        if line.contains("Failed to start") {
            return "SERVICE_FAILED";
        }
        if line.contains("Started ") {
            return "SERVICE_STARTED";
        }
        if line.contains("Stopped ") {
            return "SERVICE_STOPPED";
        }
        if lower.contains("error") {
            return "SYSTEM_ERROR";
        }
        if lower.contains("warning") {
            return "SYSTEM_WARNING";
        }
        "SYS_EVENT"
    }

    fn extract_service(line: &str) -> Option<String> {
        if let Some(captured) = UNIT_PATTERN.captures(line) {
            return captured.get(1).map(|m| m.as_str().to_string());
        }
        VERB_TARGET_PATTERN
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn estimate_severity(event_type: &str) -> Severity {
        match event_type {
            "SERVICE_FAILED" | "SYSTEM_ERROR" => Severity::High,
            "SERVICE_STOPPED" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl LineParser for SysParser {
    fn source(&self) -> LogSource {
        LogSource::Syslog
    }

    fn matches(&self, line: &str) -> bool {
        !line.is_empty() && has_leading_timestamp(line)
    }

    fn parse(&self, line: &str) -> Option<ParsedLine> {
        let trimmed = line.trim();
        let event_type = Self::detect_event_type(trimmed);
        let service = Self::extract_service(trimmed);

        Some(ParsedLine {
            timestamp: parse_line_timestamp(trimmed),
            event: LogEvent {
                log_source: LogSource::Syslog,
                event_type: event_type.to_string(),
                category: LogCategory::System,
                severity: Self::estimate_severity(event_type),
                message: trimmed.to_string(),
                user: None,
                ip: None,
                process: service.clone(),
                extra: service.map(|s| json!({ "service": s })),
            },
        })
    }
}

#[cfg(test)]
#[path = "sys_tests.rs"]
mod tests;
