//! Test harness for the pipeline specs.
//!
//! Wires a real store, writer, rule engine and dispatcher over a
//! temporary state directory, with a fake clock so windowed rules are
//! deterministic.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;
use vigil_core::{Clock, Event, FakeClock};
use vigil_engine::{EventDispatcher, WriterService};
use vigil_rules::RuleEngine;
use vigil_storage::Store;

pub struct Pipeline {
    pub dir: TempDir,
    pub clock: FakeClock,
    pub dispatcher: EventDispatcher,
    writer_stop: watch::Sender<bool>,
    writer_task: tokio::task::JoinHandle<()>,
    db_path: PathBuf,
}

impl Pipeline {
    /// Build the pipeline with the fake clock set to `now`.
    pub fn start(now: i64) -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("hids.db");
        let store = Store::open(&db_path).unwrap();

        let clock = FakeClock::new(now);
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());

        let (writer_stop, stop_rx) = watch::channel(false);
        let (writer, writer_task) = WriterService::spawn(store, shared.clone(), 10_000, stop_rx);

        let engine = Arc::new(RuleEngine::new(shared.clone()));
        let dispatcher = EventDispatcher::new(writer, engine, shared);

        Self {
            dir,
            clock,
            dispatcher,
            writer_stop,
            writer_task,
            db_path,
        }
    }

    pub fn state_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub async fn dispatch_all(&self, events: Vec<Event>) {
        for event in events {
            self.dispatcher.dispatch(event).await;
        }
    }

    /// Stop the writer, wait for the drain, and reopen the store
    /// read-only for assertions. The temp directory rides along so the
    /// database outlives the pipeline.
    pub async fn settle(self) -> (Store, TempDir) {
        self.writer_stop.send(true).unwrap();
        self.writer_task.await.unwrap();
        (Store::open_read_only(&self.db_path).unwrap(), self.dir)
    }
}

/// Write (or overwrite) a log file under the pipeline's directory.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
