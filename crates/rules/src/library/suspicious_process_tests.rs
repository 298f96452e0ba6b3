// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::rule::StatelessRule;
use crate::test_support::{process_new, process_payload};
use yare::parameterized;

#[parameterized(
    nmap = { "nmap", true },
    uppercase = { "NMAP", true },
    hydra = { "hydra", true },
    netcat = { "netcat", true },
    benign = { "firefox", false },
    empty = { "", false },
)]
fn matches_known_tools(name: &str, expected: bool) {
    assert_eq!(
        SuspiciousProcessRule.matches(&process_new(100, 4321, name)),
        expected
    );
}

#[test]
fn only_new_processes_match() {
    let mut event = process_new(100, 4321, "nmap");
    process_payload(&mut event).kind = vigil_core::ProcessEventKind::Terminated;
    assert!(!SuspiciousProcessRule.matches(&event));
}

#[test]
fn alert_links_by_pid_and_name() {
    let event = process_new(100, 4321, "nmap");
    let alert = SuspiciousProcessRule.build_alert(&event);

    assert_eq!(alert.rule_name, "PROC_001");
    assert_eq!(alert.severity, Severity::High);
    assert!(alert.message.contains("nmap"));

    let resolve = alert.resolve_spec().unwrap();
    assert_eq!(resolve.source, EvidenceSource::ProcessEvents);
    assert_eq!(resolve.filters.get("pid"), Some(&serde_json::json!(4321)));
    assert_eq!(resolve.limit, Some(1));
}
