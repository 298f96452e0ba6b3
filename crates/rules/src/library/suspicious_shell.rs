// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PROC_002: interactive shell spawned by an interpreter or netcat,
//! the classic reverse-shell shape

use crate::rule::StatelessRule;
use vigil_core::catalog::{contains, SHELL_PROCESSES, SUSPICIOUS_SHELL_PARENTS};
use vigil_core::{
    AlertDraft, Event, EvidenceResolve, EvidenceSource, ProcessEventKind, Severity,
};

pub struct SuspiciousShellRule;

impl SuspiciousShellRule {
    fn shell_spawn(event: &Event) -> Option<(String, String)> {
        let ev = event.as_process()?;
        if ev.kind != ProcessEventKind::New {
            return None;
        }
        let name = ev.name.clone().unwrap_or_default().to_lowercase();
        let parent = ev.parent_name.clone().unwrap_or_default().to_lowercase();
        Some((name, parent))
    }
}

impl StatelessRule for SuspiciousShellRule {
    fn rule_id(&self) -> &'static str {
        "PROC_002"
    }

    fn event_prefix(&self) -> &'static str {
        "PROCESS_"
    }

    fn matches(&self, event: &Event) -> bool {
        let Some((name, parent)) = Self::shell_spawn(event) else {
            return false;
        };
        contains(SHELL_PROCESSES, &name)
            && SUSPICIOUS_SHELL_PARENTS.iter().any(|p| parent.contains(p))
    }

    fn build_alert(&self, event: &Event) -> AlertDraft {
        let (name, parent) = Self::shell_spawn(event).unwrap_or_default();
        let (pid, user) = event
            .as_process()
            .map(|ev| (ev.pid, ev.username.clone().unwrap_or_default()))
            .unwrap_or_default();

        AlertDraft::new(
            "PROC_002",
            "ALERT_SUSPICIOUS_SHELL",
            Severity::Critical,
            format!(
                "Process '{parent}' spawned a shell '{name}' under user '{user}' \
                 (pid {pid}); possible reverse shell"
            ),
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
#[path = "suspicious_shell_tests.rs"]
mod tests;
