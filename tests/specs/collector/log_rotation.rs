//! S3: truncation below the stored offset resets to 0 and the new
//! content is read exactly once.

use crate::prelude::*;
use std::sync::Arc;
use vigil_collectors::{Collector, LogFileSource, LogTailCollector, OffsetStore};
use vigil_core::{FakeClock, LogSource};

fn auth_line(second: u32) -> String {
    format!(
        "Dec  4 12:00:{second:02} h sshd[111]: Failed password for admin from 10.0.0.9 port 2200 ssh2\n"
    )
}

fn collector(dir: &std::path::Path, log: std::path::PathBuf) -> LogTailCollector {
    let offsets = OffsetStore::load(dir.join("log_offsets.json")).unwrap();
    LogTailCollector::new(
        vec![LogFileSource {
            source: LogSource::Auth,
            path: log,
        }],
        offsets,
        Arc::new(FakeClock::new(1_000)),
    )
}

#[tokio::test]
async fn truncation_resets_offset_once() {
    let dir = tempfile::TempDir::new().unwrap();

    // Tick 1: a larger file, fully consumed
    let big: String = (1..=8).map(auth_line).collect();
    let log = write_file(dir.path(), "auth.log", &big);
    let mut tail = collector(dir.path(), log.clone());
    assert_eq!(tail.collect().unwrap().len(), 8);

    // Tick 2: the file was truncated to something smaller
    let small: String = (1..=2).map(auth_line).collect();
    assert!(small.len() < big.len());
    write_file(dir.path(), "auth.log", &small);

    let events = tail.collect().unwrap();
    assert_eq!(events.len(), 2, "post-truncation lines read exactly once");

    // Tick 3: nothing new, nothing replayed
    assert!(tail.collect().unwrap().is_empty());
}

#[tokio::test]
async fn growth_without_truncation_never_resets() {
    let dir = tempfile::TempDir::new().unwrap();
    let log = write_file(dir.path(), "auth.log", &auth_line(1));
    let mut tail = collector(dir.path(), log.clone());

    assert_eq!(tail.collect().unwrap().len(), 1);

    // Append-only growth: only the new line comes back
    let grown = format!("{}{}", auth_line(1), auth_line(2));
    write_file(dir.path(), "auth.log", &grown);
    assert_eq!(tail.collect().unwrap().len(), 1);
}
