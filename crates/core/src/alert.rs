// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert drafts, evidence references and the declarative resolver spec
//!
//! Rules build an [`AlertDraft`] plus zero or more explicit
//! [`EvidenceRef`]s. Because event ids are assigned only when the writer
//! inserts the rows, most rules instead attach an [`EvidenceResolve`]
//! spec under `extra["evidence_resolve"]`; the writer materializes it
//! into evidence rows after the alert row is committed.

use crate::event::EpochSecs;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Alert as produced by a rule, before storage assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDraft {
    pub rule_name: String,
    pub alert_type: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_event_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

impl AlertDraft {
    pub fn new(
        rule_name: impl Into<String>,
        alert_type: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            alert_type: alert_type.into(),
            severity,
            message: message.into(),
            log_event_id: None,
            extra: None,
        }
    }

    /// Merge a key into the `extra` object, creating it if absent.
    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        let mut map = match self.extra.take() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        map.insert(key.to_string(), value);
        self.extra = Some(Value::Object(map));
        self
    }

    /// Attach a resolver spec under `extra["evidence_resolve"]`.
    pub fn with_resolve(self, resolve: EvidenceResolve) -> Self {
        match serde_json::to_value(&resolve) {
            Ok(value) => self.with_extra(EvidenceResolve::EXTRA_KEY, value),
            Err(_) => self,
        }
    }

    /// Parse the resolver spec back out of `extra`, if present.
    pub fn resolve_spec(&self) -> Option<EvidenceResolve> {
        let extra = self.extra.as_ref()?;
        let spec = extra.get(EvidenceResolve::EXTRA_KEY)?;
        serde_json::from_value(spec.clone()).ok()
    }
}

/// Role of an evidence row relative to its alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceRole {
    /// Primary event that fired the rule.
    Trigger,
    /// Contributing event resolved after the fact.
    Support,
    /// Ambient event included for context.
    Context,
}

impl EvidenceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceRole::Trigger => "TRIGGER",
            EvidenceRole::Support => "SUPPORT",
            EvidenceRole::Context => "CONTEXT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TRIGGER" => Some(EvidenceRole::Trigger),
            "SUPPORT" => Some(EvidenceRole::Support),
            "CONTEXT" => Some(EvidenceRole::Context),
            _ => None,
        }
    }
}

/// Explicit link from an alert to a persisted event.
///
/// Rows with `event_id: None` cannot be materialized and are skipped by
/// the writer with a warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRef {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i64>,
    pub role: EvidenceRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i64>,
}

/// Event table a resolver spec queries against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    LogEvents,
    ProcessEvents,
    NetworkEvents,
    MetricEvents,
}

impl EvidenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceSource::LogEvents => "log_events",
            EvidenceSource::ProcessEvents => "process_events",
            EvidenceSource::NetworkEvents => "network_events",
            EvidenceSource::MetricEvents => "metric_events",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Inclusive epoch-second range; the resolver widens it by a small grace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: EpochSecs,
    pub to: EpochSecs,
}

/// Declarative spec the writer resolves into SUPPORT evidence rows.
///
/// Filter keys are column names; a `__in` suffix makes the value a
/// membership list. `id__in` short-circuits everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceResolve {
    pub source: EvidenceSource,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl EvidenceResolve {
    pub const EXTRA_KEY: &'static str = "evidence_resolve";

    pub fn new(source: EvidenceSource) -> Self {
        Self {
            source,
            filters: BTreeMap::new(),
            time_range: None,
            limit: None,
            order: None,
        }
    }

    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.insert(field.to_string(), value.into());
        self
    }

    /// Membership filter; stored under `<field>__in`.
    pub fn filter_in<V: Into<Value>>(mut self, field: &str, values: Vec<V>) -> Self {
        let list: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.filters.insert(format!("{field}__in"), Value::Array(list));
        self
    }

    pub fn between(mut self, from: EpochSecs, to: EpochSecs) -> Self {
        self.time_range = Some(TimeRange { from, to });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
