// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-side query helpers.
//!
//! These back the CLI and any external read surface. Filters mirror the
//! recognized request parameters; unknown combinations simply go unused
//! for the table being queried.

use crate::store::{Store, StoreError};
use rusqlite::types::Value as SqlValue;
use serde::Serialize;
use vigil_core::{EpochSecs, LogCategory, LogSource, Protocol, Severity};

/// Filter set for event listings.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub severity: Option<Severity>,
    pub source: Option<LogSource>,
    pub category: Option<LogCategory>,
    pub event_type: Option<String>,
    /// Substring match on the message (log events) or cmdline (process events).
    pub search: Option<String>,
    pub pid: Option<i64>,
    pub protocol: Option<Protocol>,
    pub ip: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl EventQuery {
    fn limit(&self) -> u32 {
        self.limit.unwrap_or(50)
    }

    fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

/// Filter set for alert listings.
#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub rule_name: Option<String>,
    pub severity: Option<Severity>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Load the evidence rows for each alert.
    pub expand: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEventRow {
    pub id: i64,
    pub timestamp: EpochSecs,
    pub log_source: String,
    pub event_type: String,
    pub category: String,
    pub severity: String,
    pub message: String,
    pub user: Option<String>,
    pub ip_address: Option<String>,
    pub process_name: Option<String>,
    pub raw_log: Option<String>,
    pub extra_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessEventRow {
    pub id: i64,
    pub timestamp: EpochSecs,
    pub event_type: String,
    pub pid: Option<i64>,
    pub ppid: Option<i64>,
    pub process_name: Option<String>,
    pub exe: Option<String>,
    pub cmdline: Option<String>,
    pub username: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub exe_deleted: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkEventRow {
    pub id: i64,
    pub timestamp: EpochSecs,
    pub event_type: String,
    pub pid: Option<i64>,
    pub process_name: Option<String>,
    pub protocol: Option<String>,
    pub laddr_ip: Option<String>,
    pub laddr_port: Option<i64>,
    pub raddr_ip: Option<String>,
    pub raddr_port: Option<i64>,
    pub status: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub id: i64,
    pub timestamp: EpochSecs,
    pub snapshot: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRow {
    pub id: i64,
    pub timestamp: EpochSecs,
    pub rule_name: String,
    pub severity: String,
    pub alert_type: String,
    pub message: String,
    pub log_event_id: Option<i64>,
    pub extra_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceRow {
    pub id: i64,
    pub alert_id: i64,
    pub event_type: String,
    pub event_id: i64,
    pub role: String,
    pub sequence: Option<i64>,
    pub timestamp: EpochSecs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertWithEvidence {
    pub alert: AlertRow,
    pub evidence: Vec<EvidenceRow>,
}

/// Row counts for the status surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct TableCounts {
    pub log_events: i64,
    pub process_events: i64,
    pub network_events: i64,
    pub metrics: i64,
    pub alerts: i64,
}

struct Conditions {
    clauses: Vec<String>,
    params: Vec<SqlValue>,
}

impl Conditions {
    fn new() -> Self {
        Self {
            clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, clause: &str, value: impl Into<SqlValue>) {
        self.clauses.push(clause.to_string());
        self.params.push(value.into());
    }

    fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

impl Store {
    pub fn log_events(&self, query: &EventQuery) -> Result<Vec<LogEventRow>, StoreError> {
        let mut cond = Conditions::new();
        if let Some(severity) = query.severity {
            cond.push("severity = ?", severity.as_str().to_string());
        }
        if let Some(source) = query.source {
            cond.push("log_source = ?", source.as_str().to_string());
        }
        if let Some(category) = query.category {
            cond.push("category = ?", category.as_str().to_string());
        }
        if let Some(event_type) = &query.event_type {
            cond.push("event_type = ?", event_type.clone());
        }
        if let Some(search) = &query.search {
            cond.push("message LIKE ?", format!("%{search}%"));
        }
        if let Some(ip) = &query.ip {
            cond.push("ip_address = ?", ip.clone());
        }

        let sql = format!(
            "SELECT id, timestamp, log_source, event_type, category, severity, message,
                    user, ip_address, process_name, raw_log, extra_data
             FROM log_events{} ORDER BY timestamp DESC, id DESC LIMIT {} OFFSET {}",
            cond.where_clause(),
            query.limit(),
            query.offset(),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(cond.params), |row| {
            Ok(LogEventRow {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                log_source: row.get(2)?,
                event_type: row.get(3)?,
                category: row.get(4)?,
                severity: row.get(5)?,
                message: row.get(6)?,
                user: row.get(7)?,
                ip_address: row.get(8)?,
                process_name: row.get(9)?,
                raw_log: row.get(10)?,
                extra_data: row.get(11)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn process_events(&self, query: &EventQuery) -> Result<Vec<ProcessEventRow>, StoreError> {
        let mut cond = Conditions::new();
        if let Some(event_type) = &query.event_type {
            cond.push("event_type = ?", event_type.clone());
        }
        if let Some(pid) = query.pid {
            cond.push("pid = ?", pid);
        }
        if let Some(search) = &query.search {
            cond.push("cmdline LIKE ?", format!("%{search}%"));
        }

        let sql = format!(
            "SELECT id, timestamp, event_type, pid, ppid, process_name, exe, cmdline,
                    username, old_value, new_value, exe_deleted
             FROM process_events{} ORDER BY timestamp DESC, id DESC LIMIT {} OFFSET {}",
            cond.where_clause(),
            query.limit(),
            query.offset(),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(cond.params), |row| {
            Ok(ProcessEventRow {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                event_type: row.get(2)?,
                pid: row.get(3)?,
                ppid: row.get(4)?,
                process_name: row.get(5)?,
                exe: row.get(6)?,
                cmdline: row.get(7)?,
                username: row.get(8)?,
                old_value: row.get(9)?,
                new_value: row.get(10)?,
                exe_deleted: row.get(11)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn network_events(&self, query: &EventQuery) -> Result<Vec<NetworkEventRow>, StoreError> {
        let mut cond = Conditions::new();
        if let Some(event_type) = &query.event_type {
            cond.push("event_type = ?", event_type.clone());
        }
        if let Some(pid) = query.pid {
            cond.push("pid = ?", pid);
        }
        if let Some(protocol) = query.protocol {
            cond.push("protocol = ?", protocol.as_str().to_string());
        }
        if let Some(ip) = &query.ip {
            cond.clauses.push("(laddr_ip = ? OR raddr_ip = ?)".to_string());
            cond.params.push(ip.clone().into());
            cond.params.push(ip.clone().into());
        }

        let sql = format!(
            "SELECT id, timestamp, event_type, pid, process_name, protocol, laddr_ip,
                    laddr_port, raddr_ip, raddr_port, status, reason
             FROM network_events{} ORDER BY timestamp DESC, id DESC LIMIT {} OFFSET {}",
            cond.where_clause(),
            query.limit(),
            query.offset(),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(cond.params), |row| {
            Ok(NetworkEventRow {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                event_type: row.get(2)?,
                pid: row.get(3)?,
                process_name: row.get(4)?,
                protocol: row.get(5)?,
                laddr_ip: row.get(6)?,
                laddr_port: row.get(7)?,
                raddr_ip: row.get(8)?,
                raddr_port: row.get(9)?,
                status: row.get(10)?,
                reason: row.get(11)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn metrics(&self, limit: u32, offset: u32) -> Result<Vec<MetricRow>, StoreError> {
        let sql = format!(
            "SELECT id, timestamp, snapshot FROM metrics
             ORDER BY timestamp DESC, id DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(MetricRow {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                snapshot: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn alerts(&self, query: &AlertQuery) -> Result<Vec<AlertWithEvidence>, StoreError> {
        let mut cond = Conditions::new();
        if let Some(rule_name) = &query.rule_name {
            cond.push("rule_name = ?", rule_name.clone());
        }
        if let Some(severity) = query.severity {
            cond.push("severity = ?", severity.as_str().to_string());
        }

        let sql = format!(
            "SELECT id, timestamp, rule_name, severity, alert_type, message, log_event_id,
                    extra_data
             FROM alerts{} ORDER BY timestamp DESC, id DESC LIMIT {} OFFSET {}",
            cond.where_clause(),
            query.limit.unwrap_or(50),
            query.offset.unwrap_or(0),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(cond.params), |row| {
            Ok(AlertRow {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                rule_name: row.get(2)?,
                severity: row.get(3)?,
                alert_type: row.get(4)?,
                message: row.get(5)?,
                log_event_id: row.get(6)?,
                extra_data: row.get(7)?,
            })
        })?;
        let alerts = rows.collect::<Result<Vec<_>, rusqlite::Error>>()?;

        let mut out = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let evidence = if query.expand {
                self.alert_evidence(alert.id)?
            } else {
                Vec::new()
            };
            out.push(AlertWithEvidence { alert, evidence });
        }
        Ok(out)
    }

    pub fn alert_evidence(&self, alert_id: i64) -> Result<Vec<EvidenceRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, alert_id, event_type, event_id, role, sequence, timestamp
             FROM alert_evidence WHERE alert_id = ?1 ORDER BY sequence ASC, id ASC",
        )?;
        let rows = stmt.query_map([alert_id], |row| {
            Ok(EvidenceRow {
                id: row.get(0)?,
                alert_id: row.get(1)?,
                event_type: row.get(2)?,
                event_id: row.get(3)?,
                role: row.get(4)?,
                sequence: row.get(5)?,
                timestamp: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn counts(&self) -> Result<TableCounts, StoreError> {
        let count = |table: &str| -> Result<i64, rusqlite::Error> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        };
        Ok(TableCounts {
            log_events: count("log_events")?,
            process_events: count("process_events")?,
            network_events: count("network_events")?,
            metrics: count("metrics")?,
            alerts: count("alerts")?,
        })
    }

    /// Timestamp of the most recent row across the event tables.
    pub fn latest_event_timestamp(&self) -> Result<Option<EpochSecs>, StoreError> {
        let latest: Option<EpochSecs> = self.conn.query_row(
            "SELECT MAX(ts) FROM (
                SELECT MAX(timestamp) AS ts FROM log_events
                UNION ALL SELECT MAX(timestamp) FROM process_events
                UNION ALL SELECT MAX(timestamp) FROM network_events
                UNION ALL SELECT MAX(timestamp) FROM metrics
             )",
            [],
            |row| row.get(0),
        )?;
        Ok(latest)
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
