// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for /var/log/kern.log: panics, OOM kills, segfaults, driver noise

use crate::registry::{LineParser, ParsedLine};
use crate::timestamp::parse_line_timestamp;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use vigil_core::{LogCategory, LogEvent, LogSource, Severity};

// Allow expect here as the regexes are compile-time verified to be valid
#[allow(clippy::expect_used)]
static PANIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)kernel panic").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static SEGFAULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)segfault|segmentation fault").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static OOM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Out of memory|oom-kill|\bOOM\b").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static USB_ERROR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)usb.*(?:error|fail|disconnect)").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static DRIVER_ERROR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)driver.*(?:error|fail)").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static PROC_PID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_.\-]+)\[(\d+)\]").expect("constant regex pattern is valid")
});

const KEYWORDS: &[&str] = &[
    "kernel",
    "panic",
    "segfault",
    "out of memory",
    "oom",
    "driver",
    "usb",
    "segmentation fault",
];

/// Extracts critical kernel events.
#[derive(Debug, Default)]
pub struct KernelParser;

impl KernelParser {
    pub fn new() -> Self {
        Self
    }

    fn detect_event_type(line: &str) -> &'static str {
        if PANIC_PATTERN.is_match(line) {
            return "KERNEL_PANIC";
        }
        if SEGFAULT_PATTERN.is_match(line) {
            return "SEGFAULT";
        }
        if OOM_PATTERN.is_match(line) {
            return "OOM_KILLER";
        }
        if USB_ERROR_PATTERN.is_match(line) {
            return "USB_ERROR";
        }
        if DRIVER_ERROR_PATTERN.is_match(line) {
            return "DRIVER_ERROR";
        }
        "KERNEL_EVENT"
    }

    fn estimate_severity(event_type: &str) -> Severity {
        match event_type {
            "KERNEL_PANIC" => Severity::Critical,
            "OOM_KILLER" | "SEGFAULT" => Severity::High,
            "USB_ERROR" | "DRIVER_ERROR" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl LineParser for KernelParser {
    fn source(&self) -> LogSource {
        LogSource::Kernel
    }

    fn matches(&self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        let lower = line.to_ascii_lowercase();
        KEYWORDS.iter().any(|k| lower.contains(k))
    }

    fn parse(&self, line: &str) -> Option<ParsedLine> {
        let trimmed = line.trim();
        let event_type = Self::detect_event_type(trimmed);

        // The offending process shows up as "name[pid]" on segfault and
        // OOM lines; the syslog prefix "kernel:" never matches because
        // it carries no bracketed pid.
        let (process, pid) = match PROC_PID_PATTERN.captures(trimmed) {
            Some(captured) => (
                captured.get(1).map(|m| m.as_str().to_string()),
                captured.get(2).and_then(|m| m.as_str().parse::<i64>().ok()),
            ),
            None => (None, None),
        };

        Some(ParsedLine {
            timestamp: parse_line_timestamp(trimmed),
            event: LogEvent {
                log_source: LogSource::Kernel,
                event_type: event_type.to_string(),
                category: LogCategory::Kernel,
                severity: Self::estimate_severity(event_type),
                message: trimmed.to_string(),
                user: None,
                ip: None,
                process,
                extra: pid.map(|p| json!({ "pid": p })),
            },
        })
    }
}

#[cfg(test)]
#[path = "kernel_tests.rs"]
mod tests;
