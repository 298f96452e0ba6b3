// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PER_001: persistence attempt via cron.
//!
//! Hybrid rule: the crontab invocation shows up as a new process, the
//! actual modification shows up in syslog.

use crate::rule::StatelessRule;
use vigil_core::catalog::CRON_TARGETS;
use vigil_core::{
    AlertDraft, Event, EventPayload, EvidenceResolve, EvidenceSource, ProcessEventKind, Severity,
};

const LOG_ACTIONS: &[&str] = &["edit", "replace", "delete", "list"];

pub struct CronPersistenceRule;

impl StatelessRule for CronPersistenceRule {
    fn rule_id(&self) -> &'static str {
        "PER_001"
    }

    fn event_prefix(&self) -> &'static str {
        ""
    }

    fn matches(&self, event: &Event) -> bool {
        match &event.payload {
            EventPayload::Process(ev) => {
                if ev.kind != ProcessEventKind::New {
                    return false;
                }
                let cmdline = ev.cmdline.clone().unwrap_or_default().to_lowercase();
                let name = ev.name.clone().unwrap_or_default().to_lowercase();
                name == "crontab" || CRON_TARGETS.iter().any(|target| cmdline.contains(target))
            }
            EventPayload::Log(ev) => {
                let message = ev.message.to_lowercase();
                message.contains("crontab")
                    && LOG_ACTIONS.iter().any(|action| message.contains(action))
            }
            _ => false,
        }
    }

    fn build_alert(&self, event: &Event) -> AlertDraft {
        match &event.payload {
            EventPayload::Process(ev) => {
                let user = ev.username.clone().unwrap_or_default();
                AlertDraft::new(
                    "PER_001",
                    "ALERT_PERSISTENCE_CRON",
                    Severity::High,
                    format!("Possible persistence attempt: user '{user}' ran a cron-related command"),
                )
                .with_resolve(
                    EvidenceResolve::new(EvidenceSource::ProcessEvents)
                        .filter("event_type", ProcessEventKind::New.as_str())
                        .filter("pid", ev.pid)
                        .between(event.timestamp, event.timestamp)
                        .limit(1),
                )
            }
            _ => {
                let (user, message) = event
                    .as_log()
                    .map(|ev| (ev.user.clone().unwrap_or_default(), ev.message.clone()))
                    .unwrap_or_default();
                AlertDraft::new(
                    "PER_001",
                    "ALERT_PERSISTENCE_CRON",
                    Severity::High,
                    format!("Crontab modification detected for user '{user}'"),
                )
                .with_resolve(
                    EvidenceResolve::new(EvidenceSource::LogEvents)
                        .filter("message", message)
                        .between(event.timestamp, event.timestamp)
                        .limit(1),
                )
            }
        }
    }
}

#[cfg(test)]
#[path = "cron_persistence_tests.rs"]
mod tests;
