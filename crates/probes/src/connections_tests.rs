// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn record(status: &str) -> ConnRecord {
    ConnRecord {
        pid: Some(100),
        process_name: Some("curl".to_string()),
        protocol: Protocol::Tcp,
        laddr_ip: "192.168.1.5".to_string(),
        laddr_port: 44000,
        raddr_ip: Some("93.184.216.34".to_string()),
        raddr_port: Some(443),
        status: status.to_string(),
        is_listen: false,
    }
}

#[test]
fn key_ignores_tcp_state() {
    let established = record("ESTABLISHED");
    let fin_wait = record("FIN_WAIT1");
    assert_eq!(established.key(), fin_wait.key());
}

#[test]
fn key_distinguishes_endpoints() {
    let a = record("ESTABLISHED");
    let mut b = record("ESTABLISHED");
    b.raddr_port = Some(80);
    assert_ne!(a.key(), b.key());
}

#[test]
fn tcp_status_labels() {
    assert_eq!(ProcfsConnectionProbe::tcp_status(&TcpState::Established), "ESTABLISHED");
    assert_eq!(ProcfsConnectionProbe::tcp_status(&TcpState::TimeWait), "TIME_WAIT");
    assert_eq!(ProcfsConnectionProbe::tcp_status(&TcpState::Listen), "LISTEN");
}

#[test]
fn record_serde_round_trips() {
    let original = record("ESTABLISHED");
    let json = serde_json::to_string(&original).unwrap();
    let back: ConnRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
}

#[test]
fn live_snapshot_reads_proc_net() {
    let mut probe = ProcfsConnectionProbe::new();
    // Must not error on a Linux host; contents depend on the machine.
    let records = probe.snapshot().unwrap();
    for listener in records.iter().filter(|r| r.is_listen) {
        assert!(listener.raddr_ip.is_none());
    }
}

#[test]
fn live_interface_io_has_loopback() {
    let mut probe = ProcfsConnectionProbe::new();
    let interfaces = probe.interface_io().unwrap();
    assert!(interfaces.contains_key("lo"), "loopback interface expected");
}
