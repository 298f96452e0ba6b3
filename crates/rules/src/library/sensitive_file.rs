// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FILE_001: command line touches a sensitive system file

use crate::rule::StatelessRule;
use vigil_core::catalog::{contains, SENSITIVE_ACCESS_WHITELIST, SENSITIVE_FILES};
use vigil_core::{
    AlertDraft, Event, EvidenceResolve, EvidenceSource, ProcessEventKind, Severity,
};

pub struct SensitiveFileRule;

impl SensitiveFileRule {
    /// Sensitive path referenced by the command line, if any. Globbed
    /// entries match when their literal fragments appear in order.
    fn referenced_path(cmdline: &str) -> Option<&'static str> {
        let lowered = cmdline.to_lowercase();
        SENSITIVE_FILES.iter().copied().find(|path| {
            let mut rest = lowered.as_str();
            path.to_lowercase().split('*').all(|fragment| {
                if fragment.is_empty() {
                    return true;
                }
                match rest.find(fragment) {
                    Some(at) => {
                        rest = &rest[at + fragment.len()..];
                        true
                    }
                    None => false,
                }
            })
        })
    }
}

impl StatelessRule for SensitiveFileRule {
    fn rule_id(&self) -> &'static str {
        "FILE_001"
    }

    fn event_prefix(&self) -> &'static str {
        "PROCESS_"
    }

    fn matches(&self, event: &Event) -> bool {
        let Some(ev) = event.as_process() else {
            return false;
        };
        if ev.kind != ProcessEventKind::New {
            return false;
        }
        let name = ev.name.clone().unwrap_or_default().to_lowercase();
        if contains(SENSITIVE_ACCESS_WHITELIST, &name) {
            return false;
        }
        ev.cmdline
            .as_deref()
            .is_some_and(|cmdline| Self::referenced_path(cmdline).is_some())
    }

    fn build_alert(&self, event: &Event) -> AlertDraft {
        let (pid, user, cmdline) = event
            .as_process()
            .map(|ev| {
                (
                    ev.pid,
                    ev.username.clone().unwrap_or_default(),
                    ev.cmdline.clone().unwrap_or_default(),
                )
            })
            .unwrap_or_default();

        AlertDraft::new(
            "FILE_001",
            "ALERT_SENSITIVE_FILE_ACCESS",
            Severity::High,
            format!("Sensitive file access by user '{user}': {cmdline} (pid {pid})"),
        )
        .with_resolve(
            EvidenceResolve::new(EvidenceSource::ProcessEvents)
                .filter("event_type", ProcessEventKind::New.as_str())
                .filter("pid", pid)
                .between(event.timestamp, event.timestamp)
                .limit(1),
        )
    }
}

#[cfg(test)]
#[path = "sensitive_file_tests.rs"]
mod tests;
