// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UUC_001: account creation observed in the logs

use crate::rule::StatelessRule;
use vigil_core::{AlertDraft, Event, EvidenceResolve, EvidenceSource, Severity};

const KEYWORDS: &[&str] = &["new user", "new group", "useradd", "adduser"];

pub struct UserCreationRule;

impl StatelessRule for UserCreationRule {
    fn rule_id(&self) -> &'static str {
        "UUC_001"
    }

    fn event_prefix(&self) -> &'static str {
        "LOG_"
    }

    fn matches(&self, event: &Event) -> bool {
        event.as_log().is_some_and(|ev| {
            let message = ev.message.to_lowercase();
            KEYWORDS.iter().any(|keyword| message.contains(keyword))
        })
    }

    fn build_alert(&self, event: &Event) -> AlertDraft {
        let log = event.as_log();
        let user = log
            .and_then(|ev| ev.user.clone())
            .unwrap_or_else(|| "system".to_string());
        let message = log.map(|ev| ev.message.clone()).unwrap_or_default();

        AlertDraft::new(
            "UUC_001",
            "ALERT_USER_CREATION",
            Severity::Critical,
            format!("New user or group created on host (actor '{user}')"),
        )
        .with_resolve(
            EvidenceResolve::new(EvidenceSource::LogEvents)
                .filter("message", message)
                .between(event.timestamp, event.timestamp)
                .limit(1),
        )
    }
}

#[cfg(test)]
#[path = "user_creation_tests.rs"]
mod tests;
