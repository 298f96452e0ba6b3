// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Threshold rule template: "the same event kind against the same key
//! occurs at least N times within the window".

use crate::context::{CorrelationContext, CorrelationKey, EventRef};
use crate::rule::{RuleOutcome, StatefulRule};
use tracing::info;
use vigil_core::{AlertDraft, EpochSecs, Event};

/// Hooks a concrete threshold rule provides.
pub trait ThresholdSpec: Send + Sync {
    fn rule_id(&self) -> &'static str;
    fn event_prefix(&self) -> &'static str;
    fn threshold(&self) -> usize;
    fn window_seconds(&self) -> EpochSecs;

    /// Does this event count toward the threshold at all?
    fn is_relevant(&self, event: &Event) -> bool;

    /// Correlation key for a relevant event; `None` skips the event.
    fn key(&self, event: &Event) -> Option<CorrelationKey>;

    /// Build the alert once the threshold is met. `hits` is the pruned
    /// ring, oldest first.
    fn build_alert(&self, key: &CorrelationKey, hits: &[EventRef]) -> AlertDraft;
}

/// Generic stateful rule over a [`ThresholdSpec`].
pub struct ThresholdRule<S: ThresholdSpec> {
    spec: S,
}

impl<S: ThresholdSpec> ThresholdRule<S> {
    pub fn new(spec: S) -> Self {
        Self { spec }
    }
}

impl<S: ThresholdSpec> StatefulRule for ThresholdRule<S> {
    fn rule_id(&self) -> &'static str {
        self.spec.rule_id()
    }

    fn event_prefix(&self) -> &'static str {
        self.spec.event_prefix()
    }

    fn consume(&self, event: &Event, ctx: &CorrelationContext) {
        if !self.spec.is_relevant(event) {
            return;
        }
        let Some(key) = self.spec.key(event) else {
            return;
        };
        ctx.add(
            self.spec.rule_id(),
            key,
            EventRef {
                event_id: None,
                event_type: event.type_tag().to_string(),
                ts: event.timestamp,
            },
            Some(self.spec.window_seconds()),
        );
    }

    fn evaluate(&self, ctx: &CorrelationContext) -> Vec<RuleOutcome> {
        let rule_id = self.spec.rule_id();
        let window = self.spec.window_seconds();
        let mut outcomes = Vec::new();

        for key in ctx.keys(rule_id) {
            let hits = ctx.get(rule_id, &key, Some(window));
            if hits.len() < self.spec.threshold() {
                continue;
            }

            info!(rule = rule_id, key = %key, count = hits.len(), "threshold rule fired");
            outcomes.push(RuleOutcome::new(self.spec.build_alert(&key, &hits)));

            // Clearing the key makes evaluation idempotent and forces a
            // fresh accumulation before the next fire.
            ctx.clear_key(rule_id, &key);
        }

        outcomes
    }
}

#[cfg(test)]
#[path = "threshold_tests.rs"]
mod tests;
