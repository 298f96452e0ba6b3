//! Black-box specs for the `vigil` query CLI.

use assert_cmd::Command;
use vigil_core::{Event, EventPayload, LogCategory, LogEvent, LogSource, Severity};
use vigil_storage::Store;

fn seeded_state_dir() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    let mut store = Store::open(&dir.path().join("hids.db")).unwrap();
    store
        .insert_event(&Event::new(
            1_700_000_000,
            EventPayload::Log(LogEvent {
                log_source: LogSource::Auth,
                event_type: "FAILED_LOGIN".to_string(),
                category: LogCategory::Auth,
                severity: Severity::Medium,
                message: "Failed password for admin from 10.0.0.9".to_string(),
                user: Some("admin".to_string()),
                ip: Some("10.0.0.9".to_string()),
                process: Some("sshd".to_string()),
                extra: None,
            }),
        ))
        .unwrap();
    dir
}

fn vigil() -> Command {
    Command::cargo_bin("vigil").unwrap()
}

#[test]
fn help_names_the_subcommands() {
    let assert = vigil().arg("--help").assert().success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for expected in ["events", "processes", "network", "alerts", "status"] {
        assert!(output.contains(expected), "help should mention {expected}");
    }
}

#[test]
fn status_reports_counts() {
    let dir = seeded_state_dir();
    let assert = vigil()
        .args(["--state-dir", &dir.path().display().to_string(), "status"])
        .assert()
        .success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(output.contains("log_events:     1"));
}

#[test]
fn events_filter_by_ip() {
    let dir = seeded_state_dir();
    let assert = vigil()
        .args([
            "--state-dir",
            &dir.path().display().to_string(),
            "events",
            "--ip",
            "10.0.0.9",
        ])
        .assert()
        .success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(output.contains("FAILED_LOGIN"));

    let assert = vigil()
        .args([
            "--state-dir",
            &dir.path().display().to_string(),
            "events",
            "--ip",
            "203.0.113.1",
        ])
        .assert()
        .success();
    assert!(assert.get_output().stdout.is_empty());
}

#[test]
fn json_output_is_parseable() {
    let dir = seeded_state_dir();
    let assert = vigil()
        .args([
            "--state-dir",
            &dir.path().display().to_string(),
            "--json",
            "events",
        ])
        .assert()
        .success();
    let parsed: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    similar_asserts::assert_eq!(parsed[0]["event_type"], serde_json::json!("FAILED_LOGIN"));
}

#[test]
fn missing_database_is_a_clear_error() {
    let dir = tempfile::TempDir::new().unwrap();
    vigil()
        .args(["--state-dir", &dir.path().display().to_string(), "status"])
        .assert()
        .failure();
}
