// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for /var/log/auth.log: SSH logins, sudo and PAM session events

use crate::registry::{LineParser, ParsedLine};
use crate::timestamp::parse_line_timestamp;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;
use vigil_core::{LogCategory, LogEvent, LogSource, Severity};

// Allow expect here as the regexes are compile-time verified to be valid
#[allow(clippy::expect_used)]
static PID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]:").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static IP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"from\s+(\d{1,3}(?:\.\d{1,3}){3})").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static PROCESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s([A-Za-z0-9_.\-]+)\[\d+\]:").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static USER_LOGIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Failed|Accepted)\s+\S+\s+for\s+(?:invalid user\s+)?(\S+)")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static USER_SESSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"for user\s+(\S+)").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static USER_PAM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\buser=(\S+)").expect("constant regex pattern is valid"));

const KEYWORDS: &[&str] = &[
    "sshd",
    "sudo",
    "authentication failure",
    "Failed password",
    "Accepted password",
    "session opened",
    "session closed",
];

/// Structured events from auth.log lines.
#[derive(Debug, Default)]
pub struct AuthParser;

impl AuthParser {
    pub fn new() -> Self {
        Self
    }

    fn detect_event_type(line: &str) -> &'static str {
        let lower = line.to_ascii_lowercase();

        if lower.contains("failed password") {
            return "FAILED_LOGIN";
        }
        if lower.contains("accepted password") || lower.contains("accepted publickey") {
            return "SUCCESS_LOGIN";
        }

        // sudo-qualified checks run before the generic PAM ones so the
        // SUDO_* types are reachable.
        let is_sudo = lower.contains("sudo:");
        if is_sudo && lower.contains("authentication failure") {
            return "SUDO_FAILED";
        }
        if is_sudo && lower.contains("session opened") {
            return "SUDO_SESSION_OPEN";
        }
        if is_sudo && lower.contains("session closed") {
            return "SUDO_SESSION_CLOSE";
        }

        if lower.contains("authentication failure") {
            return "FAILED_AUTH";
        }
        if lower.contains("session opened") {
            return "SESSION_OPEN";
        }
        if lower.contains("session closed") {
            return "SESSION_CLOSE";
        }

        "AUTH_EVENT"
    }

    fn extract_user(line: &str) -> Option<String> {
        let captured = USER_LOGIN_PATTERN
            .captures(line)
            .or_else(|| USER_SESSION_PATTERN.captures(line))
            .or_else(|| USER_PAM_PATTERN.captures(line))?;

        // Session lines append "(uid=0)" directly to the name
        let user = captured.get(1)?.as_str();
        let user = user.split('(').next().unwrap_or(user);

        if user.is_empty() || user == "invalid" || user == "user" {
            return None;
        }
        Some(user.to_string())
    }

    fn extract_method(line: &str) -> Option<&'static str> {
        let lower = line.to_ascii_lowercase();
        if lower.contains("password") {
            Some("password")
        } else if lower.contains("publickey") {
            Some("publickey")
        } else if lower.contains("keyboard-interactive") {
            Some("keyboard-interactive")
        } else {
            None
        }
    }

    fn estimate_severity(event_type: &str, user: Option<&str>) -> Severity {
        if event_type == "FAILED_LOGIN" || event_type == "FAILED_AUTH" {
            return Severity::Medium;
        }
        if event_type == "SUCCESS_LOGIN" && user == Some("root") {
            return Severity::High;
        }
        if event_type.starts_with("SUDO") {
            return Severity::High;
        }
        Severity::Low
    }
}

impl LineParser for AuthParser {
    fn source(&self) -> LogSource {
        LogSource::Auth
    }

    fn matches(&self, line: &str) -> bool {
        !line.is_empty() && KEYWORDS.iter().any(|k| line.contains(k))
    }

    fn parse(&self, line: &str) -> Option<ParsedLine> {
        let trimmed = line.trim();
        let event_type = Self::detect_event_type(trimmed);
        let user = Self::extract_user(trimmed);
        let ip = IP_PATTERN
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let process = PROCESS_PATTERN
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let pid = PID_PATTERN
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok());

        let mut extra = Map::new();
        if let Some(pid) = pid {
            extra.insert("pid".to_string(), json!(pid));
        }
        if let Some(method) = Self::extract_method(trimmed) {
            extra.insert("method".to_string(), json!(method));
        }

        let severity = Self::estimate_severity(event_type, user.as_deref());

        Some(ParsedLine {
            timestamp: parse_line_timestamp(trimmed),
            event: LogEvent {
                log_source: LogSource::Auth,
                event_type: event_type.to_string(),
                category: LogCategory::Auth,
                severity,
                message: trimmed.to_string(),
                user,
                ip,
                process,
                extra: (!extra.is_empty()).then_some(Value::Object(extra)),
            },
        })
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
