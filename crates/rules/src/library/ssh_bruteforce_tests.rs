// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{auth_log, process_new};
use yare::parameterized;

fn hits(timestamps: &[EpochSecs]) -> Vec<EventRef> {
    timestamps
        .iter()
        .map(|ts| EventRef {
            event_id: None,
            event_type: "LOG_EVENT".to_string(),
            ts: *ts,
        })
        .collect()
}

#[parameterized(
    failed_login = { "FAILED_LOGIN", true },
    failed_auth = { "FAILED_AUTH", true },
    success = { "SUCCESS_LOGIN", false },
    session = { "SESSION_OPEN", false },
)]
fn relevance_by_event_type(event_type: &str, expected: bool) {
    let rule = SshBruteforce;
    assert_eq!(
        rule.is_relevant(&auth_log(100, event_type, "10.0.0.9", "admin")),
        expected
    );
}

#[test]
fn process_events_are_irrelevant() {
    assert!(!SshBruteforce.is_relevant(&process_new(100, 1, "sshd")));
}

#[test]
fn key_is_ip_and_user() {
    let key = SshBruteforce
        .key(&auth_log(100, "FAILED_LOGIN", "10.0.0.9", "admin"))
        .unwrap();
    assert_eq!(key.parts(), ["10.0.0.9", "admin"]);
}

#[test]
fn missing_ip_yields_no_key() {
    let mut event = auth_log(100, "FAILED_LOGIN", "10.0.0.9", "admin");
    if let vigil_core::EventPayload::Log(log) = &mut event.payload {
        log.ip = None;
    }
    assert!(!SshBruteforce.is_relevant(&event));
}

#[test]
fn alert_carries_resolver_spec_over_hit_span() {
    let alert = SshBruteforce.build_alert(
        &CorrelationKey::new(["10.0.0.9", "admin"]),
        &hits(&[100, 105, 110, 115, 120]),
    );

    assert_eq!(alert.rule_name, "AUTH_001");
    assert_eq!(alert.severity, Severity::High);
    assert!(alert.message.contains("10.0.0.9"));
    assert!(alert.message.contains("admin"));
    assert!(alert.message.contains("5 failed attempts"));

    let resolve = alert.resolve_spec().unwrap();
    assert_eq!(resolve.source, EvidenceSource::LogEvents);
    assert_eq!(resolve.time_range.map(|r| (r.from, r.to)), Some((100, 120)));
    assert_eq!(resolve.order, Some(SortOrder::Asc));
    assert_eq!(
        resolve.filters.get("ip_address"),
        Some(&serde_json::json!("10.0.0.9"))
    );
}

#[test]
fn alert_extra_records_attempt_count() {
    let alert = SshBruteforce.build_alert(
        &CorrelationKey::new(["10.0.0.9", "admin"]),
        &hits(&[100, 101, 102, 103, 104]),
    );
    let extra = alert.extra.unwrap();
    assert_eq!(extra["attempts"], 5);
    assert_eq!(extra["window_seconds"], 60);
}
