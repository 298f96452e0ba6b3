// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dispatcher::EventDispatcher;
use crate::writer::WriterService;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;
use tokio::sync::watch as watch_channel;
use vigil_collectors::CollectorError;
use vigil_core::{Event, EventPayload, MetricSnapshot, SystemClock};
use vigil_rules::RuleEngine;
use vigil_storage::Store;

struct CountingCollector {
    ticks: Arc<AtomicUsize>,
    fail_every_other: bool,
}

impl Collector for CountingCollector {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn collect(&mut self) -> Result<Vec<Event>, CollectorError> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        if self.fail_every_other && tick % 2 == 1 {
            return Err(CollectorError::Io(std::io::Error::other("boom")));
        }
        Ok(vec![Event::new(
            0,
            EventPayload::Metric(MetricSnapshot::default()),
        )])
    }
}

struct Harness {
    scheduler: Scheduler,
    writer_stop: watch_channel::Sender<bool>,
    writer_task: tokio::task::JoinHandle<()>,
    db_path: std::path::PathBuf,
    _dir: tempfile::TempDir,
}

impl Harness {
    async fn finish(self) -> (Store, tempfile::TempDir) {
        // Collectors stop first so the writer can drain their tail
        self.scheduler.shutdown().await;
        self.writer_stop.send(true).unwrap();
        self.writer_task.await.unwrap();
        (Store::open_read_only(&self.db_path).unwrap(), self._dir)
    }
}

fn harness() -> Harness {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("hids.db");
    let store = Store::open(&db_path).unwrap();
    let clock: Arc<dyn vigil_core::Clock> = Arc::new(SystemClock);

    let (writer_stop, writer_stop_rx) = watch_channel::channel(false);
    let (writer, writer_task) = WriterService::spawn(store, clock.clone(), 100, writer_stop_rx);

    let engine = Arc::new(RuleEngine::new(clock.clone()));
    let dispatcher = Arc::new(EventDispatcher::new(writer, engine, clock.clone()));
    let scheduler = Scheduler::new(dispatcher, Arc::new(Heartbeats::new(clock)));

    Harness {
        scheduler,
        writer_stop,
        writer_task,
        db_path,
        _dir: dir,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn workers_tick_heartbeat_and_persist() {
    let mut h = harness();
    let ticks = Arc::new(AtomicUsize::new(0));

    h.scheduler.spawn_collector(
        Box::new(CountingCollector {
            ticks: Arc::clone(&ticks),
            fail_every_other: false,
        }),
        Duration::from_millis(10),
    );

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(ticks.load(Ordering::SeqCst) >= 2);
    assert!(h.scheduler.heartbeats().last("counting").is_some());

    let (reader, _state) = h.finish().await;
    assert!(reader.counts().unwrap().metrics >= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_ticks_do_not_kill_the_worker() {
    let mut h = harness();
    let ticks = Arc::new(AtomicUsize::new(0));

    h.scheduler.spawn_collector(
        Box::new(CountingCollector {
            ticks: Arc::clone(&ticks),
            fail_every_other: true,
        }),
        Duration::from_millis(10),
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    // Every other tick errors; the worker keeps running regardless
    assert!(ticks.load(Ordering::SeqCst) >= 4);

    h.finish().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_is_prompt_even_with_long_intervals() {
    let mut h = harness();
    let ticks = Arc::new(AtomicUsize::new(0));

    // One-hour interval: the sleeping worker must still notice the stop
    // signal immediately
    h.scheduler.spawn_collector(
        Box::new(CountingCollector {
            ticks,
            fail_every_other: false,
        }),
        Duration::from_secs(3600),
    );
    tokio::time::sleep(Duration::from_millis(20)).await;

    let started = std::time::Instant::now();
    h.finish().await;
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn health_worker_beats_and_survives_stale_peers() {
    let mut h = harness();
    h.scheduler.spawn_health(
        Duration::from_millis(10),
        vec![("counting".to_string(), Duration::from_millis(10))],
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.scheduler.heartbeats().last("health").is_some());

    h.finish().await;
}

#[test]
fn default_intervals_match_contract() {
    let config = SchedulerConfig::default();
    assert_eq!(config.metrics_interval, Duration::from_secs(60));
    assert_eq!(config.process_interval, Duration::from_secs(15));
    assert_eq!(config.network_interval, Duration::from_secs(15));
    assert_eq!(config.log_interval, Duration::from_secs(3));
    assert_eq!(config.health_interval, Duration::from_secs(2));
}

#[test]
fn staleness_is_three_intervals() {
    let clock = vigil_core::FakeClock::new(1_000);
    let heartbeats = Heartbeats::new(Arc::new(clock.clone()));
    heartbeats.beat("w");

    clock.set(1_030);
    assert!(!heartbeats.is_stale("w", Duration::from_secs(10)));

    clock.set(1_031);
    assert!(heartbeats.is_stale("w", Duration::from_secs(10)));

    assert!(!heartbeats.is_stale("never-seen", Duration::from_secs(10)));
}
