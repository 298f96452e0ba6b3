// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LOG_001: log clearing / history deletion attempt.
//!
//! Hybrid rule: catches the command at process start and the trace it
//! leaves in the logs.

use crate::rule::StatelessRule;
use vigil_core::catalog::{contains, LOG_CLEARING_TARGETS, LOG_CLEARING_TOOLS};
use vigil_core::{
    AlertDraft, Event, EventPayload, EvidenceResolve, EvidenceSource, ProcessEventKind, Severity,
};

pub struct LogClearingRule;

impl LogClearingRule {
    fn references_target(content: &str) -> bool {
        let lowered = content.to_lowercase();
        LOG_CLEARING_TARGETS
            .iter()
            .any(|target| lowered.contains(&target.to_lowercase()))
    }

    /// Redirecting shell history into /dev/null is clearing by another name.
    fn null_history(content: &str) -> bool {
        let lowered = content.to_lowercase();
        lowered.contains("/dev/null") && lowered.contains("history")
    }
}

impl StatelessRule for LogClearingRule {
    fn rule_id(&self) -> &'static str {
        "LOG_001"
    }

    fn event_prefix(&self) -> &'static str {
        ""
    }

    fn matches(&self, event: &Event) -> bool {
        match &event.payload {
            EventPayload::Log(ev) => {
                let message = ev.message.to_lowercase();
                let mentions_tool = LOG_CLEARING_TOOLS
                    .iter()
                    .any(|tool| message.contains(tool));
                (mentions_tool && Self::references_target(&message)) || Self::null_history(&message)
            }
            EventPayload::Process(ev) => {
                if ev.kind != ProcessEventKind::New {
                    return false;
                }
                let cmdline = ev.cmdline.clone().unwrap_or_default();
                let name = ev.name.clone().unwrap_or_default().to_lowercase();
                (contains(LOG_CLEARING_TOOLS, &name) && Self::references_target(&cmdline))
                    || Self::null_history(&cmdline)
            }
            _ => false,
        }
    }

    fn build_alert(&self, event: &Event) -> AlertDraft {
        let (via, user) = match &event.payload {
            EventPayload::Process(ev) => ("process", ev.username.clone().unwrap_or_default()),
            _ => (
                "log",
                event
                    .as_log()
                    .and_then(|ev| ev.user.clone())
                    .unwrap_or_default(),
            ),
        };

        let draft = AlertDraft::new(
            "LOG_001",
            "ALERT_LOG_DELETION",
            Severity::High,
            format!("Log clearing attempt detected via {via} activity by user '{user}'"),
        );

        match &event.payload {
            EventPayload::Process(ev) => draft.with_resolve(
                EvidenceResolve::new(EvidenceSource::ProcessEvents)
                    .filter("event_type", ProcessEventKind::New.as_str())
                    .filter("pid", ev.pid)
                    .between(event.timestamp, event.timestamp)
                    .limit(1),
            ),
            EventPayload::Log(ev) => draft.with_resolve(
                EvidenceResolve::new(EvidenceSource::LogEvents)
                    .filter("message", ev.message.clone())
                    .between(event.timestamp, event.timestamp)
                    .limit(1),
            ),
            _ => draft,
        }
    }
}

#[cfg(test)]
#[path = "log_clearing_tests.rs"]
mod tests;
