// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event dispatcher: the single funnel between producers, the rule
//! engine and the writer queue.
//!
//! Routing only; no storage access and no business logic beyond the
//! ordering guarantee that an event is enqueued before any alert it
//! triggers.

use crate::writer::{WritePayload, WriterHandle};
use std::sync::Arc;
use tracing::debug;
use vigil_core::{Clock, Event};
use vigil_rules::RuleEngine;

pub struct EventDispatcher {
    writer: WriterHandle,
    engine: Arc<RuleEngine>,
    clock: Arc<dyn Clock>,
}

impl EventDispatcher {
    pub fn new(writer: WriterHandle, engine: Arc<RuleEngine>, clock: Arc<dyn Clock>) -> Self {
        Self {
            writer,
            engine,
            clock,
        }
    }

    /// Route one event: stamp, persist, evaluate, persist the alerts.
    pub async fn dispatch(&self, mut event: Event) {
        if event.timestamp == 0 {
            event.timestamp = self.clock.now();
        }
        debug!(event = %event.log_summary(), "dispatching event");

        self.writer.enqueue(WritePayload::Event(event.clone())).await;

        for outcome in self.engine.evaluate(&event) {
            self.writer
                .enqueue(WritePayload::Alert {
                    alert: outcome.alert,
                    evidence: outcome.evidence,
                })
                .await;
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
