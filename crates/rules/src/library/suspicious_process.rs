// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PROC_001: known offensive tooling started on the host

use crate::rule::StatelessRule;
use vigil_core::catalog::{contains, HACKING_TOOLS};
use vigil_core::{
    AlertDraft, Event, EvidenceResolve, EvidenceSource, ProcessEventKind, Severity,
};

pub struct SuspiciousProcessRule;

impl SuspiciousProcessRule {
    fn process_name(event: &Event) -> Option<String> {
        let ev = event.as_process()?;
        (ev.kind == ProcessEventKind::New).then(|| ev.name.clone().unwrap_or_default().to_lowercase())
    }
}

impl StatelessRule for SuspiciousProcessRule {
    fn rule_id(&self) -> &'static str {
        "PROC_001"
    }

    fn event_prefix(&self) -> &'static str {
        "PROCESS_"
    }

    fn matches(&self, event: &Event) -> bool {
        Self::process_name(event).is_some_and(|name| contains(HACKING_TOOLS, &name))
    }

    fn build_alert(&self, event: &Event) -> AlertDraft {
        let name = Self::process_name(event).unwrap_or_default();
        let pid = event.as_process().map(|ev| ev.pid).unwrap_or_default();

        AlertDraft::new(
            "PROC_001",
            "ALERT_PROCESS_SUSPICIOUS",
            Severity::High,
            format!("Suspicious process detected: {name} (pid {pid})"),
        )
        .with_resolve(
            EvidenceResolve::new(EvidenceSource::ProcessEvents)
                .filter("event_type", ProcessEventKind::New.as_str())
                .filter("pid", pid)
                .filter("process_name", name)
                .between(event.timestamp, event.timestamp)
                .limit(1),
        )
    }
}

#[cfg(test)]
#[path = "suspicious_process_tests.rs"]
mod tests;
