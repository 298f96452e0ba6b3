// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for /var/log/ufw.log: firewall block/allow records

use crate::registry::{LineParser, ParsedLine};
use crate::timestamp::parse_line_timestamp;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use vigil_core::{LogCategory, LogEvent, LogSource, Severity};

// Allow expect here as the regexes are compile-time verified to be valid
#[allow(clippy::expect_used)]
static ACTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[UFW ([A-Z]+)").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static SRC_IP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SRC=(\S+)").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static DST_IP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DST=(\S+)").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static PROTO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PROTO=(\S+)").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static SRC_PORT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SPT=(\d+)").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static DST_PORT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DPT=(\d+)").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static IN_IF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bIN=(\S+)").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static OUT_IF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bOUT=(\S+)").expect("constant regex pattern is valid"));

/// Structured events from UFW firewall log lines.
#[derive(Debug, Default)]
pub struct UfwParser;

impl UfwParser {
    pub fn new() -> Self {
        Self
    }

    fn capture(pattern: &Regex, line: &str) -> Option<String> {
        pattern
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn capture_port(pattern: &Regex, line: &str) -> Option<u16> {
        pattern
            .captures(line)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    fn extract_event_type(line: &str) -> String {
        match ACTION_PATTERN.captures(line).and_then(|c| c.get(1)) {
            Some(action) => format!("UFW_{}", action.as_str()),
            None => "UFW_EVENT".to_string(),
        }
    }

    fn estimate_severity(event_type: &str) -> Severity {
        if event_type == "UFW_BLOCK" {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl LineParser for UfwParser {
    fn source(&self) -> LogSource {
        LogSource::Ufw
    }

    fn matches(&self, line: &str) -> bool {
        !line.is_empty() && line.contains("UFW ")
    }

    fn parse(&self, line: &str) -> Option<ParsedLine> {
        let trimmed = line.trim();
        let event_type = Self::extract_event_type(trimmed);
        let src_ip = Self::capture(&SRC_IP_PATTERN, trimmed);

        Some(ParsedLine {
            timestamp: parse_line_timestamp(trimmed),
            event: LogEvent {
                log_source: LogSource::Ufw,
                event_type: event_type.clone(),
                category: LogCategory::Firewall,
                severity: Self::estimate_severity(&event_type),
                message: trimmed.to_string(),
                user: None,
                ip: src_ip.clone(),
                process: None,
                extra: Some(json!({
                    "src_ip": src_ip,
                    "dst_ip": Self::capture(&DST_IP_PATTERN, trimmed),
                    "protocol": Self::capture(&PROTO_PATTERN, trimmed).map(|p| p.to_lowercase()),
                    "src_port": Self::capture_port(&SRC_PORT_PATTERN, trimmed),
                    "dst_port": Self::capture_port(&DST_PORT_PATTERN, trimmed),
                    "in_interface": Self::capture(&IN_IF_PATTERN, trimmed),
                    "out_interface": Self::capture(&OUT_IF_PATTERN, trimmed),
                })),
            },
        })
    }
}

#[cfg(test)]
#[path = "ufw_tests.rs"]
mod tests;
