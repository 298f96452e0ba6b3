// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule evaluation entry point.
//!
//! Rules are indexed by their event-type prefix so irrelevant ones are
//! never visited. A panicking rule is isolated: the panic is caught,
//! logged, and the remaining rules still see the event.

use crate::context::CorrelationContext;
use crate::library;
use crate::rule::{RuleOutcome, StatefulRule, StatelessRule};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info};
use vigil_core::{Clock, Event};

pub struct RuleEngine {
    stateless: Vec<Box<dyn StatelessRule>>,
    stateful: Vec<Box<dyn StatefulRule>>,
    ctx: CorrelationContext,
}

impl RuleEngine {
    /// Engine with the stock rule library.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (stateless, stateful) = library::default_rules();
        Self::with_rules(clock, stateless, stateful)
    }

    pub fn with_rules(
        clock: Arc<dyn Clock>,
        stateless: Vec<Box<dyn StatelessRule>>,
        stateful: Vec<Box<dyn StatefulRule>>,
    ) -> Self {
        Self {
            stateless,
            stateful,
            ctx: CorrelationContext::new(clock),
        }
    }

    pub fn context(&self) -> &CorrelationContext {
        &self.ctx
    }

    /// Evaluate one event against every subscribed rule.
    pub fn evaluate(&self, event: &Event) -> Vec<RuleOutcome> {
        let tag = event.type_tag();
        let mut outcomes = Vec::new();

        for rule in &self.stateless {
            if !prefix_matches(rule.event_prefix(), tag) {
                continue;
            }
            let result = catch_unwind(AssertUnwindSafe(|| {
                rule.matches(event).then(|| RuleOutcome {
                    alert: rule.build_alert(event),
                    evidence: rule.build_evidence(event),
                })
            }));
            match result {
                Ok(Some(outcome)) => {
                    info!(rule = rule.rule_id(), event = tag, "rule fired");
                    outcomes.push(outcome);
                }
                Ok(None) => {}
                Err(_) => error!(rule = rule.rule_id(), "rule panicked, skipping"),
            }
        }

        for rule in &self.stateful {
            if !prefix_matches(rule.event_prefix(), tag) {
                continue;
            }
            let result = catch_unwind(AssertUnwindSafe(|| {
                rule.consume(event, &self.ctx);
                rule.evaluate(&self.ctx)
            }));
            match result {
                Ok(fired) => {
                    for outcome in &fired {
                        info!(
                            rule = rule.rule_id(),
                            alert = %outcome.alert.alert_type,
                            "stateful rule fired"
                        );
                    }
                    outcomes.extend(fired);
                }
                Err(_) => error!(rule = rule.rule_id(), "rule panicked, skipping"),
            }
        }

        outcomes
    }
}

fn prefix_matches(prefix: &str, tag: &str) -> bool {
    prefix.is_empty() || tag.starts_with(prefix)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
