//! S6: transient lock contention is absorbed by the writer's bounded
//! retries; the payload lands exactly once.

use crate::prelude::*;
use vigil_core::{Event, EventPayload, LogCategory, LogEvent, LogSource, Severity};

fn log_event(ts: i64) -> Event {
    Event::new(
        ts,
        EventPayload::Log(LogEvent {
            log_source: LogSource::Auth,
            event_type: "FAILED_LOGIN".to_string(),
            category: LogCategory::Auth,
            severity: Severity::Medium,
            message: "Failed password for admin from 10.0.0.9".to_string(),
            user: Some("admin".to_string()),
            ip: Some("10.0.0.9".to_string()),
            process: None,
            extra: None,
        }),
    )
}

#[tokio::test]
async fn locked_database_is_retried_not_duplicated() {
    let pipeline = Pipeline::start(1_000);
    let db_path = pipeline.dir.path().join("hids.db");

    // A second connection takes the write lock before the payload
    // arrives, then releases it while the writer is backing off
    let blocker = rusqlite::Connection::open(&db_path).unwrap();
    blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

    pipeline.dispatcher.dispatch(log_event(1_000)).await;

    tokio::time::sleep(std::time::Duration::from_millis(250)).await;
    blocker.execute_batch("COMMIT").unwrap();
    drop(blocker);

    let (store, _state) = pipeline.settle().await;
    assert_eq!(store.counts().unwrap().log_events, 1, "persisted exactly once");
}

#[tokio::test]
async fn uncontended_alert_and_event_both_commit() {
    let pipeline = Pipeline::start(1_000);

    pipeline.dispatcher.dispatch(log_event(1_000)).await;
    pipeline
        .dispatcher
        .dispatch({
            let mut event = log_event(1_001);
            if let EventPayload::Log(log) = &mut event.payload {
                log.message = "useradd[900]: new user: name=backdoor".to_string();
            }
            event
        })
        .await;

    let (store, _state) = pipeline.settle().await;
    let counts = store.counts().unwrap();
    assert_eq!(counts.log_events, 2);
    // The user-creation line raised UUC_001
    assert_eq!(counts.alerts, 1);
}
