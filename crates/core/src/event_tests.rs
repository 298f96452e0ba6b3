// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::severity::Severity;
use yare::parameterized;

fn sample_log_event() -> LogEvent {
    LogEvent {
        log_source: LogSource::Auth,
        event_type: "FAILED_LOGIN".to_string(),
        category: LogCategory::Auth,
        severity: Severity::Medium,
        message: "Failed password for admin from 10.0.0.9 port 2200 ssh2".to_string(),
        user: Some("admin".to_string()),
        ip: Some("10.0.0.9".to_string()),
        process: Some("sshd".to_string()),
        extra: None,
    }
}

#[test]
fn log_event_type_tag() {
    let event = Event::new(1_700_000_000, EventPayload::Log(sample_log_event()));
    assert_eq!(event.type_tag(), "LOG_EVENT");
}

#[parameterized(
    new = { ProcessEventKind::New, "PROCESS_NEW" },
    terminated = { ProcessEventKind::Terminated, "PROCESS_TERMINATED" },
    exec = { ProcessEventKind::ExecChanged, "PROCESS_EXEC_CHANGED" },
    cmdline = { ProcessEventKind::CmdlineChanged, "PROCESS_CMDLINE_CHANGED" },
    priv_esc = { ProcessEventKind::PrivEscalation, "PROCESS_PRIV_ESCALATION" },
    status = { ProcessEventKind::StatusChanged, "PROCESS_STATUS_CHANGED" },
    zombie = { ProcessEventKind::ZombieProcess, "PROCESS_ZOMBIE_PROCESS" },
    deleted = { ProcessEventKind::ExecDeleted, "PROCESS_EXEC_DELETED" },
    hash = { ProcessEventKind::ExecHashChanged, "PROCESS_EXEC_HASH_CHANGED" },
)]
fn process_kind_tags(kind: ProcessEventKind, expected: &str) {
    let event = Event::new(0, EventPayload::Process(ProcessEvent::new(kind, 42)));
    assert_eq!(event.type_tag(), expected);
}

#[parameterized(
    new_conn = { NetworkEventKind::NewConnection, "NET_NEW_CONNECTION" },
    closed_conn = { NetworkEventKind::ClosedConnection, "NET_CLOSED_CONNECTION" },
    new_listen = { NetworkEventKind::NewListenPort, "NET_NEW_LISTEN_PORT" },
    closed_listen = { NetworkEventKind::ClosedListenPort, "NET_CLOSED_LISTEN_PORT" },
    suspicious = { NetworkEventKind::SuspiciousRemote, "CONNECTION_SUSPICIOUS_REMOTE" },
    iface = { NetworkEventKind::InterfaceStats, "NET_INTERFACE_STATS" },
)]
fn network_kind_tags(kind: NetworkEventKind, expected: &str) {
    let event = Event::new(0, EventPayload::Network(NetworkEvent::new(kind, Protocol::Tcp)));
    assert_eq!(event.type_tag(), expected);
}

#[test]
fn metric_type_tag_and_accessors() {
    let mut snapshot = MetricSnapshot::default();
    snapshot.cpu.percent = 85.0;
    snapshot.memory.ram.percent = 42.5;

    let event = Event::new(0, EventPayload::Metric(snapshot));
    assert_eq!(event.type_tag(), "METRIC_SNAPSHOT");
    let metric = event.as_metric().unwrap();
    assert_eq!(metric.cpu_percent(), 85.0);
    assert_eq!(metric.ram_percent(), 42.5);
}

#[test]
fn event_serde_round_trip() {
    let mut process = ProcessEvent::new(ProcessEventKind::New, 4321);
    process.name = Some("nmap".to_string());
    process.username = Some("ubuntu".to_string());
    process.cmdline = Some("nmap -sS 192.168.1.0/24".to_string());

    let event = Event::new(1_700_000_123, EventPayload::Process(process));
    let json = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
    assert_eq!(back.type_tag(), "PROCESS_NEW");
}

#[test]
fn event_json_carries_family_tag() {
    let event = Event::new(10, EventPayload::Log(sample_log_event()));
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["family"], "log");
    assert_eq!(value["event_type"], "FAILED_LOGIN");
    assert_eq!(value["timestamp"], 10);
}

#[test]
fn payload_accessors_are_exclusive() {
    let event = Event::new(0, EventPayload::Log(sample_log_event()));
    assert!(event.as_log().is_some());
    assert!(event.as_process().is_none());
    assert!(event.as_network().is_none());
    assert!(event.as_metric().is_none());
}

#[test]
fn log_summary_mentions_key_fields() {
    let event = Event::new(0, EventPayload::Log(sample_log_event()));
    let summary = event.log_summary();
    assert!(summary.contains("FAILED_LOGIN"));
    assert!(summary.contains("10.0.0.9"));
    assert!(summary.contains("admin"));
}
