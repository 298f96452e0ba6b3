// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic host metric snapshots.

use crate::{Collector, CollectorError};
use std::sync::Arc;
use vigil_core::{Clock, Event, EventPayload};
use vigil_probes::MetricsProbe;

/// Wraps a metrics probe into the collector interface; one snapshot
/// event per tick, no state to checkpoint.
pub struct MetricsCollector {
    probe: Box<dyn MetricsProbe>,
    clock: Arc<dyn Clock>,
}

impl MetricsCollector {
    pub fn new(probe: Box<dyn MetricsProbe>, clock: Arc<dyn Clock>) -> Self {
        Self { probe, clock }
    }
}

impl Collector for MetricsCollector {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn collect(&mut self) -> Result<Vec<Event>, CollectorError> {
        let snapshot = self.probe.sample()?;
        Ok(vec![Event::new(
            self.clock.now(),
            EventPayload::Metric(snapshot),
        )])
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
