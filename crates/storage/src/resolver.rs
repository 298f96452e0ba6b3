// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic evidence resolver.
//!
//! Turns the declarative `evidence_resolve` spec carried in an alert's
//! extra payload into concrete event rows. Filters are equality matches
//! against a per-table allowlist; `id__in` short-circuits everything
//! else; time ranges are widened by a small grace because events may
//! commit slightly after the moment that triggered the alert.

use crate::store::StoreError;
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use vigil_core::{EpochSecs, EvidenceResolve, EvidenceSource, SortOrder};

/// Grace applied to `time_range.from` (events may predate the trigger).
const FROM_GRACE_SECS: EpochSecs = 10;
/// Grace applied to `time_range.to` (writes commit after the trigger).
const TO_GRACE_SECS: EpochSecs = 2;

const DEFAULT_LIMIT: u32 = 20;

/// One event row matched by a resolver spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedEvent {
    pub event_id: i64,
    pub event_type: String,
    pub timestamp: EpochSecs,
}

struct SourceMeta {
    table: &'static str,
    /// Filterable columns; anything else is logged and skipped.
    fields: &'static [&'static str],
    /// Fixed evidence event_type, or `None` to read the row's own.
    fixed_type: Option<&'static str>,
}

fn source_meta(source: EvidenceSource) -> SourceMeta {
    match source {
        EvidenceSource::LogEvents => SourceMeta {
            table: "log_events",
            fields: &[
                "log_source",
                "event_type",
                "category",
                "severity",
                "message",
                "user",
                "ip_address",
                "process_name",
            ],
            fixed_type: Some("LOG_EVENT"),
        },
        EvidenceSource::ProcessEvents => SourceMeta {
            table: "process_events",
            fields: &["event_type", "pid", "ppid", "process_name", "username", "exe"],
            fixed_type: None,
        },
        EvidenceSource::NetworkEvents => SourceMeta {
            table: "network_events",
            fields: &[
                "event_type",
                "pid",
                "process_name",
                "protocol",
                "laddr_ip",
                "laddr_port",
                "raddr_ip",
                "raddr_port",
                "status",
            ],
            fixed_type: None,
        },
        EvidenceSource::MetricEvents => SourceMeta {
            table: "metrics",
            fields: &[],
            fixed_type: Some("METRIC_SNAPSHOT"),
        },
    }
}

/// Accept the model-level field names alongside raw column names.
fn canonical_field(field: &str) -> &str {
    match field {
        "ip" => "ip_address",
        "process" | "name" => "process_name",
        "source" => "log_source",
        "user_name" => "username",
        other => other,
    }
}

fn json_to_sql(value: &JsonValue) -> Option<SqlValue> {
    match value {
        JsonValue::String(s) => Some(SqlValue::Text(s.clone())),
        JsonValue::Bool(b) => Some(SqlValue::Integer(*b as i64)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(SqlValue::Integer(i))
            } else {
                n.as_f64().map(SqlValue::Real)
            }
        }
        _ => None,
    }
}

fn order_keyword(order: Option<SortOrder>) -> &'static str {
    match order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// Resolve a spec against the store.
///
/// Returned rows are ordered as requested and capped by the limit;
/// the caller assigns evidence sequence numbers.
pub(crate) fn resolve(
    conn: &Connection,
    spec: &EvidenceResolve,
) -> Result<Vec<ResolvedEvent>, StoreError> {
    let meta = source_meta(spec.source);
    let select = match meta.fixed_type {
        Some(_) => format!("SELECT id, timestamp FROM {}", meta.table),
        None => format!("SELECT id, timestamp, event_type FROM {}", meta.table),
    };
    let order = order_keyword(spec.order);

    // Nearest-precision linking: explicit ids win over everything else.
    if let Some(JsonValue::Array(raw_ids)) = spec.filters.get("id__in") {
        let ids: Vec<i64> = raw_ids.iter().filter_map(JsonValue::as_i64).collect();
        if !ids.is_empty() {
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql =
                format!("{select} WHERE id IN ({placeholders}) ORDER BY timestamp {order}");
            let params: Vec<SqlValue> = ids.iter().map(|id| SqlValue::Integer(*id)).collect();
            return run(conn, &sql, params, &meta, ids.len());
        }
    }

    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<SqlValue> = Vec::new();

    for (raw_field, value) in &spec.filters {
        let (field, is_membership) = match raw_field.strip_suffix("__in") {
            Some(field) => (field, true),
            None => (raw_field.as_str(), false),
        };
        let field = canonical_field(field);

        if !meta.fields.contains(&field) {
            warn!(source = meta.table, field, "unrecognized resolver filter field, skipping");
            continue;
        }

        if is_membership {
            let JsonValue::Array(values) = value else {
                warn!(field, "membership filter is not a list, skipping");
                continue;
            };
            let converted: Vec<SqlValue> = values.iter().filter_map(json_to_sql).collect();
            if converted.is_empty() {
                continue;
            }
            let placeholders = vec!["?"; converted.len()].join(", ");
            conditions.push(format!("{field} IN ({placeholders})"));
            params.extend(converted);
        } else if let Some(converted) = json_to_sql(value) {
            conditions.push(format!("{field} = ?"));
            params.push(converted);
        } else {
            warn!(field, "unsupported resolver filter value, skipping");
        }
    }

    if let Some(range) = spec.time_range {
        conditions.push("timestamp >= ?".to_string());
        params.push(SqlValue::Integer(range.from - FROM_GRACE_SECS));
        conditions.push("timestamp <= ?".to_string());
        params.push(SqlValue::Integer(range.to + TO_GRACE_SECS));
    }

    let limit = spec.limit.unwrap_or(DEFAULT_LIMIT) as usize;
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    let sql = format!("{select}{where_clause} ORDER BY timestamp {order} LIMIT {limit}");

    run(conn, &sql, params, &meta, limit)
}

fn run(
    conn: &Connection,
    sql: &str,
    params: Vec<SqlValue>,
    meta: &SourceMeta,
    limit: usize,
) -> Result<Vec<ResolvedEvent>, StoreError> {
    debug!(sql, "resolving evidence");
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
        Ok(ResolvedEvent {
            event_id: row.get(0)?,
            timestamp: row.get(1)?,
            event_type: match meta.fixed_type {
                Some(fixed) => fixed.to_string(),
                None => row.get(2)?,
            },
        })
    })?;

    let mut resolved = Vec::new();
    for row in rows {
        resolved.push(row?);
        if resolved.len() >= limit {
            break;
        }
    }
    Ok(resolved)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
