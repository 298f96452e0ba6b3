//! S2: a new nmap process produces one PROCESS_NEW row and one PROC_001
//! alert with one linked evidence row.

use crate::prelude::*;
use std::sync::Arc;
use vigil_collectors::{Collector, ProcessDiffCollector};
use vigil_probes::{FakeProcessProbe, ProcessRecord};
use vigil_storage::{AlertQuery, EventQuery};

fn nmap_record() -> ProcessRecord {
    let mut record = ProcessRecord::stub(4321, "nmap");
    record.cmdline = "nmap -sS 192.168.1.0/24".to_string();
    record.username = Some("ubuntu".to_string());
    record.exe = Some("/usr/bin/nmap".to_string());
    record.create_time = 990;
    record
}

#[tokio::test]
async fn nmap_start_raises_proc_001() {
    let pipeline = Pipeline::start(1_000);

    let probe = FakeProcessProbe::new();
    probe.set_processes(vec![nmap_record()]);
    let mut collector = ProcessDiffCollector::new(
        Box::new(probe),
        pipeline.state_path("process_prev.json"),
        Arc::new(pipeline.clock.clone()),
    );

    let events = collector.collect().unwrap();
    assert_eq!(events.len(), 1);
    pipeline.dispatch_all(events).await;

    let (store, _state) = pipeline.settle().await;

    let process_rows = store.process_events(&EventQuery::default()).unwrap();
    assert_eq!(process_rows.len(), 1);
    assert_eq!(process_rows[0].event_type, "PROCESS_NEW");
    assert_eq!(process_rows[0].pid, Some(4321));

    let alerts = store
        .alerts(&AlertQuery {
            expand: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert.rule_name, "PROC_001");
    assert_eq!(alerts[0].alert.severity, "HIGH");

    assert_eq!(alerts[0].evidence.len(), 1);
    assert_eq!(alerts[0].evidence[0].event_id, process_rows[0].id);
    assert_eq!(alerts[0].evidence[0].event_type, "PROCESS_NEW");
}

#[tokio::test]
async fn second_tick_does_not_realert() {
    let pipeline = Pipeline::start(1_000);

    let probe = FakeProcessProbe::new();
    probe.set_processes(vec![nmap_record()]);
    let mut collector = ProcessDiffCollector::new(
        Box::new(probe),
        pipeline.state_path("process_prev.json"),
        Arc::new(pipeline.clock.clone()),
    );

    pipeline.dispatch_all(collector.collect().unwrap()).await;
    // The process keeps running; the next tick diffs to nothing
    pipeline.dispatch_all(collector.collect().unwrap()).await;

    let (store, _state) = pipeline.settle().await;
    assert_eq!(store.counts().unwrap().process_events, 1);
    assert_eq!(store.counts().unwrap().alerts, 1);
}
