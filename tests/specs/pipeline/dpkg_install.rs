//! S5: installing a known offensive tool via dpkg yields a HIGH
//! PACKAGE_INSTALL log event and no process-rule alert.

use crate::prelude::*;
use std::sync::Arc;
use vigil_collectors::{Collector, LogFileSource, LogTailCollector, OffsetStore};
use vigil_core::LogSource;
use vigil_storage::{AlertQuery, EventQuery};

const DPKG_LINE: &str = "2025-01-01 13:00:00 install nmap:amd64 <none> 7.94+git20230807-1\n";

#[tokio::test]
async fn hacking_tool_install_is_high_severity() {
    let pipeline = Pipeline::start(1_735_736_400);
    let log_path = write_file(pipeline.dir.path(), "dpkg.log", DPKG_LINE);

    let offsets = OffsetStore::load(pipeline.state_path("log_offsets.json")).unwrap();
    let mut collector = LogTailCollector::new(
        vec![LogFileSource {
            source: LogSource::Dpkg,
            path: log_path,
        }],
        offsets,
        Arc::new(pipeline.clock.clone()),
    );

    let events = collector.collect().unwrap();
    assert_eq!(events.len(), 1);
    pipeline.dispatch_all(events).await;

    let (store, _state) = pipeline.settle().await;

    let rows = store.log_events(&EventQuery::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].event_type, "PACKAGE_INSTALL");
    assert_eq!(rows[0].severity, "HIGH");
    assert_eq!(rows[0].log_source, "dpkg");

    // Different rule domain: no PROC_001 here
    let alerts = store.alerts(&AlertQuery::default()).unwrap();
    assert!(alerts.iter().all(|a| a.alert.rule_name != "PROC_001"));
}
