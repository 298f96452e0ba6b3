// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: single-instance lock, pipeline wiring, shutdown.

use crate::config::Config;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{info, warn};
use vigil_collectors::{
    LogTailCollector, MetricsCollector, NetworkDiffCollector, OffsetStore, ProcessDiffCollector,
};
use vigil_core::{Clock, SystemClock};
use vigil_engine::{EventDispatcher, Heartbeats, Scheduler, WriterService};
use vigil_probes::{ProcfsConnectionProbe, SysinfoMetricsProbe, SysinfoProcessProbe};
use vigil_rules::RuleEngine;
use vigil_storage::{StateFileError, Store, StoreError};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("state file error: {0}")]
    State(#[from] StateFileError),
    #[error("another vigild instance holds the lock at {0}")]
    LockFailed(PathBuf),
}

/// A fully wired, running agent.
pub struct Daemon {
    pub config: Config,
    pub scheduler: Scheduler,
    // NOTE(lifetime): held to maintain the exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    writer_stop: watch::Sender<bool>,
    writer_task: JoinHandle<()>,
}

/// Acquire the exclusive daemon lock, writing our pid into the file.
pub fn acquire_lock(path: &Path) -> Result<File, LifecycleError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    if file.try_lock_exclusive().is_err() {
        return Err(LifecycleError::LockFailed(path.to_path_buf()));
    }
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

/// Wire the whole pipeline and start the workers.
pub fn startup(config: Config) -> Result<Daemon, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;
    let lock_file = acquire_lock(&config.lock_path())?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Store::open(&config.db_path())?;

    // Single writer over a bounded queue; a full queue blocks producers
    let (writer_stop, writer_stop_rx) = watch::channel(false);
    let (writer, writer_task) = WriterService::spawn(
        store,
        clock.clone(),
        config.writer.queue_capacity,
        writer_stop_rx,
    );

    let engine = Arc::new(RuleEngine::new(clock.clone()));
    let dispatcher = Arc::new(EventDispatcher::new(writer, engine, clock.clone()));
    let heartbeats = Arc::new(Heartbeats::new(clock.clone()));
    let mut scheduler = Scheduler::new(dispatcher, heartbeats);

    let intervals = config.scheduler();

    let offsets = OffsetStore::load(config.offsets_path())?;
    scheduler.spawn_collector(
        Box::new(LogTailCollector::new(
            config.log_sources(),
            offsets,
            clock.clone(),
        )),
        intervals.log_interval,
    );

    scheduler.spawn_collector(
        Box::new(ProcessDiffCollector::new(
            Box::new(SysinfoProcessProbe::new(config.process.hash_execs)),
            config.process_prev_path(),
            clock.clone(),
        )),
        intervals.process_interval,
    );

    scheduler.spawn_collector(
        Box::new(NetworkDiffCollector::new(
            Box::new(ProcfsConnectionProbe::new()),
            config.network_state_path(),
            config.ignore_local_endpoints(),
            config.network.watch_remotes.clone(),
            clock.clone(),
        )),
        intervals.network_interval,
    );

    scheduler.spawn_collector(
        Box::new(MetricsCollector::new(
            Box::new(SysinfoMetricsProbe::new()),
            clock,
        )),
        intervals.metrics_interval,
    );

    scheduler.spawn_health(
        intervals.health_interval,
        vec![
            ("log".to_string(), intervals.log_interval),
            ("process".to_string(), intervals.process_interval),
            ("network".to_string(), intervals.network_interval),
            ("metrics".to_string(), intervals.metrics_interval),
        ],
    );

    info!(state_dir = %config.state_dir.display(), "agent pipeline started");

    Ok(Daemon {
        config,
        scheduler,
        lock_file,
        writer_stop,
        writer_task,
    })
}

impl Daemon {
    /// Orderly shutdown: collectors stop first, then the writer drains.
    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;

        let _ = self.writer_stop.send(true);
        if timeout(Duration::from_secs(10), self.writer_task)
            .await
            .is_err()
        {
            warn!("writer did not stop within the deadline");
        }

        info!("agent stopped");
        // lock_file drops here, releasing the exclusive lock
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
