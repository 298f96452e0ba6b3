// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RES_001: sustained high resource usage.
//!
//! A metric snapshot counts toward the threshold only when it already
//! breaches a CPU or RAM limit; the rule fires once enough breaching
//! samples land inside the window.

use crate::context::{CorrelationKey, EventRef};
use crate::threshold::ThresholdSpec;
use serde_json::json;
use vigil_core::{AlertDraft, EpochSecs, Event, EvidenceResolve, EvidenceSource, Severity, SortOrder};

const CPU_THRESHOLD: f32 = 70.0;
const RAM_THRESHOLD: f32 = 80.0;

#[derive(Debug, Default)]
pub struct ResourceUsage;

impl ThresholdSpec for ResourceUsage {
    fn rule_id(&self) -> &'static str {
        "RES_001"
    }

    fn event_prefix(&self) -> &'static str {
        "METRIC_"
    }

    fn threshold(&self) -> usize {
        3
    }

    fn window_seconds(&self) -> EpochSecs {
        180
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.as_metric().is_some_and(|snapshot| {
            snapshot.cpu_percent() > CPU_THRESHOLD || snapshot.ram_percent() > RAM_THRESHOLD
        })
    }

    fn key(&self, _event: &Event) -> Option<CorrelationKey> {
        Some(CorrelationKey::single("system_resources"))
    }

    fn build_alert(&self, _key: &CorrelationKey, hits: &[EventRef]) -> AlertDraft {
        let samples = hits.len();
        let draft = AlertDraft::new(
            "RES_001",
            "ALERT_HIGH_RESOURCE_USAGE",
            Severity::Medium,
            format!(
                "High resource usage sustained across {samples} samples within {}s \
                 (cpu > {CPU_THRESHOLD}% or ram > {RAM_THRESHOLD}%)",
                self.window_seconds()
            ),
        )
        .with_extra("samples", json!(samples));

        // Prefer exact ids when the refs carry them; fall back to the
        // sampled time span otherwise.
        let ids: Vec<i64> = hits.iter().filter_map(|h| h.event_id).collect();
        let resolve = if ids.len() == hits.len() && !ids.is_empty() {
            EvidenceResolve::new(EvidenceSource::MetricEvents).filter_in("id", ids)
        } else {
            let from = hits.iter().map(|h| h.ts).min().unwrap_or_default();
            let to = hits.iter().map(|h| h.ts).max().unwrap_or_default();
            EvidenceResolve::new(EvidenceSource::MetricEvents)
                .between(from, to)
                .limit(self.threshold() as u32)
                .order(SortOrder::Asc)
        };
        draft.with_resolve(resolve)
    }
}

#[cfg(test)]
#[path = "resource_usage_tests.rs"]
mod tests;
