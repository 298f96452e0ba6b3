// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite event store.
//!
//! The writer service owns the only writable [`Store`]; every other
//! component reads through its own read-only handle. Inserts are one
//! transaction per payload; alert insertion materializes evidence rows
//! inside the same transaction.

use crate::resolver;
use crate::schema;
use rusqlite::{params, Connection, ErrorCode, OpenFlags};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};
use vigil_core::{
    AlertDraft, EpochSecs, Event, EventPayload, EvidenceRef, EvidenceRole, LogEvent,
    MetricSnapshot, NetworkEvent, ProcessEvent,
};

/// Errors that can occur in store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Transient lock contention, worth a bounded retry.
    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::DatabaseBusy || err.code == ErrorCode::DatabaseLocked
        )
    }
}

/// Handle over the SQLite database.
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    /// Open (creating if needed) the store and apply the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::configure(&conn)?;
        conn.execute_batch(schema::DDL)?;
        Ok(Self { conn })
    }

    /// Read-only handle for query surfaces.
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::DDL)?;
        Ok(Self { conn })
    }

    fn configure(conn: &Connection) -> Result<(), StoreError> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        Ok(())
    }

    /// Insert one event into the table its payload implies.
    ///
    /// Returns the assigned row id. Ids are strictly increasing, so
    /// enqueue order equals id order for a single writer.
    pub fn insert_event(&mut self, event: &Event) -> Result<i64, StoreError> {
        let id = match &event.payload {
            EventPayload::Log(ev) => self.insert_log_event(event, ev)?,
            EventPayload::Process(ev) => self.insert_process_event(event, ev)?,
            EventPayload::Network(ev) => self.insert_network_event(event, ev)?,
            EventPayload::Metric(snapshot) => self.insert_metric_snapshot(event, snapshot)?,
        };
        debug!(id, event = %event.log_summary(), "event persisted");
        Ok(id)
    }

    fn insert_log_event(&self, event: &Event, ev: &LogEvent) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO log_events (timestamp, log_source, event_type, category, severity,
                                     raw_log, message, user, ip_address, process_name,
                                     rule_triggered, extra_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, NULL, ?11)",
            params![
                event.timestamp,
                ev.log_source.as_str(),
                ev.event_type,
                ev.category.as_str(),
                ev.severity.as_str(),
                event.raw,
                ev.message,
                ev.user,
                ev.ip,
                ev.process,
                ev.extra.as_ref().map(|v| v.to_string()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_process_event(&self, event: &Event, ev: &ProcessEvent) -> Result<i64, StoreError> {
        let raw_event = serde_json::to_string(event)?;
        self.conn.execute(
            "INSERT INTO process_events (timestamp, event_type, pid, ppid, process_name, exe,
                                         cmdline, username, create_time, cpu_percent,
                                         memory_rss, memory_vms, old_value, new_value,
                                         exe_deleted, snapshot_data, alert_id, raw_event)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, NULL, ?17)",
            params![
                event.timestamp,
                ev.kind.as_str(),
                ev.pid,
                ev.ppid,
                ev.name,
                ev.exe,
                ev.cmdline,
                ev.username,
                ev.create_time,
                ev.cpu_percent.map(f64::from),
                ev.memory_rss.map(|v| v as i64),
                ev.memory_vms.map(|v| v as i64),
                ev.old,
                ev.new,
                ev.exe_deleted,
                ev.snapshot.as_ref().map(|v| v.to_string()),
                raw_event,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_network_event(&self, event: &Event, ev: &NetworkEvent) -> Result<i64, StoreError> {
        let raw_event = serde_json::to_string(event)?;
        self.conn.execute(
            "INSERT INTO network_events (timestamp, event_type, pid, process_name, protocol,
                                         laddr_ip, laddr_port, raddr_ip, raddr_port, status,
                                         reason, description, ports_tried, snapshot_data,
                                         alert_id, raw_event)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, NULL, ?13, NULL, ?14)",
            params![
                event.timestamp,
                ev.kind.as_str(),
                ev.pid,
                ev.process_name,
                ev.protocol.as_str(),
                ev.laddr_ip,
                ev.laddr_port,
                ev.raddr_ip,
                ev.raddr_port,
                ev.status,
                ev.reason,
                ev.description,
                ev.snapshot.as_ref().map(|v| v.to_string()),
                raw_event,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_metric_snapshot(
        &self,
        event: &Event,
        snapshot: &MetricSnapshot,
    ) -> Result<i64, StoreError> {
        let blob = serde_json::to_string(snapshot)?;
        self.conn.execute(
            "INSERT INTO metrics (timestamp, snapshot) VALUES (?1, ?2)",
            params![event.timestamp, blob],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert an alert with its evidence, atomically.
    ///
    /// Explicit evidence items carrying event ids go first (keeping any
    /// given sequence); a resolver spec in the draft's extra then adds
    /// SUPPORT rows with the sequence continuing monotonically.
    pub fn insert_alert(
        &mut self,
        draft: &AlertDraft,
        timestamp: EpochSecs,
        evidence: &[EvidenceRef],
    ) -> Result<i64, StoreError> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO alerts (timestamp, rule_name, severity, alert_type, message,
                                 log_event_id, extra_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                timestamp,
                draft.rule_name,
                draft.severity.as_str(),
                draft.alert_type,
                draft.message,
                draft.log_event_id,
                draft.extra.as_ref().map(|v| v.to_string()),
            ],
        )?;
        let alert_id = tx.last_insert_rowid();

        let mut next_sequence: i64 = 1;
        for item in evidence {
            let Some(event_id) = item.event_id else {
                warn!(
                    rule = %draft.rule_name,
                    event_type = %item.event_type,
                    "skipping evidence item with missing event id"
                );
                continue;
            };
            let sequence = item.sequence.unwrap_or(next_sequence);
            tx.execute(
                "INSERT INTO alert_evidence (alert_id, event_type, event_id, role, sequence, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    alert_id,
                    item.event_type,
                    event_id,
                    item.role.as_str(),
                    sequence,
                    timestamp,
                ],
            )?;
            next_sequence = next_sequence.max(sequence) + 1;
        }

        if let Some(spec) = draft.resolve_spec() {
            for row in resolver::resolve(&tx, &spec)? {
                tx.execute(
                    "INSERT INTO alert_evidence (alert_id, event_type, event_id, role, sequence, timestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        alert_id,
                        row.event_type,
                        row.event_id,
                        EvidenceRole::Support.as_str(),
                        next_sequence,
                        row.timestamp,
                    ],
                )?;
                next_sequence += 1;
            }
        }

        tx.commit()?;
        debug!(alert_id, rule = %draft.rule_name, "alert persisted");
        Ok(alert_id)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
