//! S1: five failed SSH logins inside the window produce one AUTH_001
//! alert with all five log events linked as evidence.

use crate::prelude::*;
use std::sync::Arc;
use vigil_collectors::{Collector, LogFileSource, LogTailCollector, OffsetStore};
use vigil_core::{LogSource, Severity};
use vigil_parsers::timestamp::parse_line_timestamp;
use vigil_storage::AlertQuery;

fn auth_lines() -> String {
    (1..=5)
        .map(|second| {
            format!(
                "Dec  4 12:00:0{second} h sshd[111]: Failed password for admin from 10.0.0.9 port 2200 ssh2\n"
            )
        })
        .collect()
}

#[tokio::test]
async fn five_failures_produce_one_linked_alert() {
    let lines = auth_lines();
    let first_ts = parse_line_timestamp(&lines).unwrap();

    // Clock sits a few seconds after the last injected line
    let pipeline = Pipeline::start(first_ts + 20);
    let log_path = write_file(pipeline.dir.path(), "auth.log", &lines);

    let offsets = OffsetStore::load(pipeline.state_path("log_offsets.json")).unwrap();
    let mut collector = LogTailCollector::new(
        vec![LogFileSource {
            source: LogSource::Auth,
            path: log_path,
        }],
        offsets,
        Arc::new(pipeline.clock.clone()),
    );

    let events = collector.collect().unwrap();
    assert_eq!(events.len(), 5);
    pipeline.dispatch_all(events).await;

    let (store, _state) = pipeline.settle().await;

    // Five log rows persisted
    assert_eq!(store.counts().unwrap().log_events, 5);

    // Exactly one alert, HIGH, naming the attacker and the count
    let alerts = store
        .alerts(&AlertQuery {
            expand: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.alert.rule_name, "AUTH_001");
    assert_eq!(alert.alert.severity, Severity::High.as_str());
    assert!(alert.alert.message.contains("10.0.0.9"));
    assert!(alert.alert.message.contains("5 failed attempts"));

    // Five evidence rows, sequence strictly increasing, linked to the
    // five log events
    assert_eq!(alert.evidence.len(), 5);
    let log_ids: Vec<i64> = store
        .log_events(&Default::default())
        .unwrap()
        .iter()
        .map(|row| row.id)
        .collect();
    for (i, evidence) in alert.evidence.iter().enumerate() {
        assert_eq!(evidence.sequence, Some(i as i64 + 1));
        assert_eq!(evidence.event_type, "LOG_EVENT");
        assert!(log_ids.contains(&evidence.event_id));
    }
}

#[tokio::test]
async fn four_failures_stay_silent() {
    let lines: String = auth_lines().lines().take(4).map(|l| format!("{l}\n")).collect();
    let first_ts = parse_line_timestamp(&lines).unwrap();

    let pipeline = Pipeline::start(first_ts + 20);
    let log_path = write_file(pipeline.dir.path(), "auth.log", &lines);

    let offsets = OffsetStore::load(pipeline.state_path("log_offsets.json")).unwrap();
    let mut collector = LogTailCollector::new(
        vec![LogFileSource {
            source: LogSource::Auth,
            path: log_path,
        }],
        offsets,
        Arc::new(pipeline.clock.clone()),
    );

    let events = collector.collect().unwrap();
    pipeline.dispatch_all(events).await;

    let (store, _state) = pipeline.settle().await;
    assert_eq!(store.counts().unwrap().log_events, 4);
    assert_eq!(store.counts().unwrap().alerts, 0);
}
