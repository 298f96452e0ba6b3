// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AUTH_001: SSH bruteforce detection.
//!
//! Counts failed authentication events per `(ip, user)` and fires when
//! the threshold is met inside the window. Evidence is resolved by the
//! writer from the log_events table over the span of the counted hits;
//! the context only holds timestamps because the rows are not yet
//! persisted when the rule fires.

use crate::context::{CorrelationKey, EventRef};
use crate::threshold::ThresholdSpec;
use serde_json::json;
use vigil_core::{
    AlertDraft, EpochSecs, Event, EvidenceResolve, EvidenceSource, LogCategory, Severity,
    SortOrder,
};

const FAILED_TYPES: &[&str] = &["FAILED_LOGIN", "FAILED_AUTH"];

#[derive(Debug, Default)]
pub struct SshBruteforce;

impl SshBruteforce {
    fn relevant_log(event: &Event) -> Option<(&str, Option<&str>)> {
        let log = event.as_log()?;
        if log.category != LogCategory::Auth {
            return None;
        }
        if !FAILED_TYPES.contains(&log.event_type.as_str()) {
            return None;
        }
        let ip = log.ip.as_deref()?;
        Some((ip, log.user.as_deref()))
    }
}

impl ThresholdSpec for SshBruteforce {
    fn rule_id(&self) -> &'static str {
        "AUTH_001"
    }

    fn event_prefix(&self) -> &'static str {
        "LOG_"
    }

    fn threshold(&self) -> usize {
        5
    }

    fn window_seconds(&self) -> EpochSecs {
        60
    }

    fn is_relevant(&self, event: &Event) -> bool {
        Self::relevant_log(event).is_some()
    }

    fn key(&self, event: &Event) -> Option<CorrelationKey> {
        let (ip, user) = Self::relevant_log(event)?;
        Some(CorrelationKey::new([ip, user.unwrap_or_default()]))
    }

    fn build_alert(&self, key: &CorrelationKey, hits: &[EventRef]) -> AlertDraft {
        let ip = key.parts().first().cloned().unwrap_or_default();
        let user = key.parts().get(1).cloned().unwrap_or_default();
        let attempts = hits.len();

        // Resolve over the span of the counted events rather than the
        // wall clock; the writer widens the range by its own grace.
        let from = hits.iter().map(|h| h.ts).min().unwrap_or_default();
        let to = hits.iter().map(|h| h.ts).max().unwrap_or_default();

        let message = if user.is_empty() {
            format!(
                "SSH brute force detected from {ip} ({attempts} failed attempts in {}s)",
                self.window_seconds()
            )
        } else {
            format!(
                "SSH brute force detected from {ip} against user '{user}' \
                 ({attempts} failed attempts in {}s)",
                self.window_seconds()
            )
        };

        AlertDraft::new("AUTH_001", "ALERT_SSH_BRUTEFORCE", Severity::High, message)
            .with_extra("ip", json!(ip))
            .with_extra("user", json!(user))
            .with_extra("attempts", json!(attempts))
            .with_extra("window_seconds", json!(self.window_seconds()))
            .with_resolve(
                EvidenceResolve::new(EvidenceSource::LogEvents)
                    .filter("category", LogCategory::Auth.as_str())
                    .filter_in("event_type", FAILED_TYPES.to_vec())
                    .filter("ip_address", ip)
                    .between(from, to)
                    .order(SortOrder::Asc),
            )
    }
}

#[cfg(test)]
#[path = "ssh_bruteforce_tests.rs"]
mod tests;
