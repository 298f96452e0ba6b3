//! S4: three high-usage metric snapshots within the window produce
//! exactly one RES_001 alert; re-firing needs a fresh accumulation.

use crate::prelude::*;
use std::sync::Arc;
use vigil_collectors::{Collector, MetricsCollector};
use vigil_probes::FakeMetricsProbe;
use vigil_storage::AlertQuery;

#[tokio::test]
async fn three_breaches_fire_once() {
    let pipeline = Pipeline::start(1_000);

    let probe = FakeMetricsProbe::new();
    let mut collector =
        MetricsCollector::new(Box::new(probe.clone()), Arc::new(pipeline.clock.clone()));

    for cpu in [85.0, 92.0, 77.0] {
        probe.set_usage(cpu, 10.0);
        pipeline.dispatch_all(collector.collect().unwrap()).await;
        pipeline.clock.advance(60);
    }

    let (store, _state) = pipeline.settle().await;
    assert_eq!(store.counts().unwrap().metrics, 3);

    let alerts = store
        .alerts(&AlertQuery {
            expand: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(alerts.len(), 1, "exactly one alert after the third breach");
    assert_eq!(alerts[0].alert.rule_name, "RES_001");
    assert_eq!(alerts[0].alert.severity, "MEDIUM");

    // Evidence resolves to the breaching snapshots
    assert_eq!(alerts[0].evidence.len(), 3);
    assert!(alerts[0]
        .evidence
        .iter()
        .all(|e| e.event_type == "METRIC_SNAPSHOT"));
}

#[tokio::test]
async fn refire_requires_fresh_accumulation() {
    let pipeline = Pipeline::start(1_000);

    let probe = FakeMetricsProbe::new();
    let mut collector =
        MetricsCollector::new(Box::new(probe.clone()), Arc::new(pipeline.clock.clone()));

    for cpu in [85.0, 92.0, 77.0, 88.0] {
        probe.set_usage(cpu, 10.0);
        pipeline.dispatch_all(collector.collect().unwrap()).await;
        pipeline.clock.advance(60);
    }

    // The fourth breach lands on a cleared key: still one alert
    let (store, _state) = pipeline.settle().await;
    assert_eq!(store.counts().unwrap().alerts, 1);
}

#[tokio::test]
async fn quiet_metrics_never_alert() {
    let pipeline = Pipeline::start(1_000);

    let probe = FakeMetricsProbe::new();
    let mut collector =
        MetricsCollector::new(Box::new(probe.clone()), Arc::new(pipeline.clock.clone()));

    for _ in 0..4 {
        probe.set_usage(20.0, 30.0);
        pipeline.dispatch_all(collector.collect().unwrap()).await;
        pipeline.clock.advance(60);
    }

    let (store, _state) = pipeline.settle().await;
    assert_eq!(store.counts().unwrap().alerts, 0);
}
