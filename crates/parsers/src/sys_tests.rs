// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::LineParser;
use yare::parameterized;

fn parser() -> SysParser {
    SysParser::new()
}

#[parameterized(
    failed = { "Dec  4 10:00:00 host systemd[1]: Failed to start nginx.service - A high performance web server.", "SERVICE_FAILED", Severity::High },
    started = { "Dec  4 10:00:01 host systemd[1]: Started cron.service - Regular background program processing daemon.", "SERVICE_STARTED", Severity::Low },
    stopped = { "Dec  4 10:00:02 host systemd[1]: Stopped ssh.service - OpenBSD Secure Shell server.", "SERVICE_STOPPED", Severity::Medium },
    error = { "Dec  4 10:00:03 host app[12]: error: unable to open database", "SYSTEM_ERROR", Severity::High },
    warning = { "Dec  4 10:00:04 host app[12]: warning: disk nearly full", "SYSTEM_WARNING", Severity::Low },
    generic = { "Dec  4 10:00:05 host dhclient[900]: bound to 192.168.1.50", "SYS_EVENT", Severity::Low },
)]
fn classifies_lines(line: &str, expected_type: &str, expected_severity: Severity) {
    let parsed = parser().parse(line).unwrap();
    assert_eq!(parsed.event.event_type, expected_type);
    assert_eq!(parsed.event.severity, expected_severity);
    assert_eq!(parsed.event.category, LogCategory::System);
}

#[test]
fn extracts_unit_name() {
    let parsed = parser()
        .parse("Dec  4 10:00:00 host systemd[1]: Failed to start nginx.service - A web server.")
        .unwrap();
    assert_eq!(parsed.event.process.as_deref(), Some("nginx"));
    assert_eq!(parsed.event.extra.unwrap()["service"], "nginx");
}

#[test]
fn match_requires_leading_timestamp() {
    let p = parser();
    assert!(p.matches("Dec  4 10:00:00 host systemd[1]: Started x"));
    assert!(p.matches("2025-01-02 03:04:05 host systemd[1]: Started x"));
    assert!(!p.matches("free-floating text without timestamp"));
    assert!(!p.matches(""));
}
