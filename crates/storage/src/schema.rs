// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite schema for the event store.
//!
//! AUTOINCREMENT keeps ids strictly increasing and never reused, which
//! the evidence rows rely on. Timestamps are second-resolution epoch
//! integers and indexed on every table.

pub const DDL: &str = "
CREATE TABLE IF NOT EXISTS log_events (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp       INTEGER NOT NULL,
    log_source      TEXT NOT NULL,
    event_type      TEXT NOT NULL,
    category        TEXT NOT NULL,
    severity        TEXT NOT NULL,
    raw_log         TEXT,
    message         TEXT NOT NULL,
    user            TEXT,
    ip_address      TEXT,
    process_name    TEXT,
    rule_triggered  TEXT,
    extra_data      TEXT
);
CREATE INDEX IF NOT EXISTS idx_log_events_timestamp ON log_events(timestamp);
CREATE INDEX IF NOT EXISTS idx_log_events_event_type ON log_events(event_type);
CREATE INDEX IF NOT EXISTS idx_log_events_ip ON log_events(ip_address);

CREATE TABLE IF NOT EXISTS process_events (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp       INTEGER NOT NULL,
    event_type      TEXT NOT NULL,
    pid             INTEGER,
    ppid            INTEGER,
    process_name    TEXT,
    exe             TEXT,
    cmdline         TEXT,
    username        TEXT,
    create_time     INTEGER,
    cpu_percent     REAL,
    memory_rss      INTEGER,
    memory_vms      INTEGER,
    old_value       TEXT,
    new_value       TEXT,
    exe_deleted     INTEGER,
    snapshot_data   TEXT,
    alert_id        INTEGER,
    raw_event       TEXT
);
CREATE INDEX IF NOT EXISTS idx_process_events_timestamp ON process_events(timestamp);
CREATE INDEX IF NOT EXISTS idx_process_events_event_type ON process_events(event_type);
CREATE INDEX IF NOT EXISTS idx_process_events_pid ON process_events(pid);

CREATE TABLE IF NOT EXISTS network_events (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp       INTEGER NOT NULL,
    event_type      TEXT NOT NULL,
    pid             INTEGER,
    process_name    TEXT,
    protocol        TEXT,
    laddr_ip        TEXT,
    laddr_port      INTEGER,
    raddr_ip        TEXT,
    raddr_port      INTEGER,
    status          TEXT,
    reason          TEXT,
    description     TEXT,
    ports_tried     TEXT,
    snapshot_data   TEXT,
    alert_id        INTEGER,
    raw_event       TEXT
);
CREATE INDEX IF NOT EXISTS idx_network_events_timestamp ON network_events(timestamp);
CREATE INDEX IF NOT EXISTS idx_network_events_event_type ON network_events(event_type);
CREATE INDEX IF NOT EXISTS idx_network_events_pid ON network_events(pid);

CREATE TABLE IF NOT EXISTS metrics (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp       INTEGER NOT NULL,
    snapshot        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_metrics_timestamp ON metrics(timestamp);

CREATE TABLE IF NOT EXISTS alerts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp       INTEGER NOT NULL,
    rule_name       TEXT NOT NULL,
    severity        TEXT NOT NULL,
    alert_type      TEXT NOT NULL,
    message         TEXT NOT NULL,
    log_event_id    INTEGER,
    extra_data      TEXT
);
CREATE INDEX IF NOT EXISTS idx_alerts_timestamp ON alerts(timestamp);
CREATE INDEX IF NOT EXISTS idx_alerts_rule_name ON alerts(rule_name);

CREATE TABLE IF NOT EXISTS alert_evidence (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    alert_id        INTEGER NOT NULL,
    event_type      TEXT NOT NULL,
    event_id        INTEGER NOT NULL,
    role            TEXT NOT NULL,
    sequence        INTEGER,
    timestamp       INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alert_evidence_alert ON alert_evidence(alert_id, event_type);
CREATE INDEX IF NOT EXISTS idx_alert_evidence_timestamp ON alert_evidence(timestamp);
";
