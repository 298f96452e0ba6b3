// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler: one worker task per collector with heartbeats and
//! cooperative shutdown.
//!
//! A worker loop is {heartbeat → collect → dispatch → sleep}. A failed
//! tick is logged and the worker keeps running; a panic in one worker
//! never affects its peers. Cancellation is checked at the top of every
//! tick and while sleeping, so stop latency is bounded by one interval
//! plus the in-flight tick.

use crate::dispatcher::EventDispatcher;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};
use tracing::{info, warn};
use vigil_collectors::Collector;
use vigil_core::{Clock, EpochSecs};

/// Per-worker tick intervals.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub metrics_interval: Duration,
    pub process_interval: Duration,
    pub network_interval: Duration,
    pub log_interval: Duration,
    pub health_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            metrics_interval: Duration::from_secs(60),
            process_interval: Duration::from_secs(15),
            network_interval: Duration::from_secs(15),
            log_interval: Duration::from_secs(3),
            health_interval: Duration::from_secs(2),
        }
    }
}

/// Worker liveness map, written at the top of every tick and read
/// without further coordination (stale reads are fine).
pub struct Heartbeats {
    clock: Arc<dyn Clock>,
    beats: Mutex<HashMap<String, EpochSecs>>,
}

impl Heartbeats {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            beats: Mutex::new(HashMap::new()),
        }
    }

    pub fn beat(&self, worker: &str) {
        let now = self.clock.now();
        self.beats.lock().insert(worker.to_string(), now);
    }

    pub fn last(&self, worker: &str) -> Option<EpochSecs> {
        self.beats.lock().get(worker).copied()
    }

    pub fn snapshot(&self) -> HashMap<String, EpochSecs> {
        self.beats.lock().clone()
    }

    /// Seconds since the worker's last heartbeat.
    pub fn age(&self, worker: &str) -> Option<EpochSecs> {
        self.last(worker).map(|beat| self.clock.now() - beat)
    }

    /// A worker is unhealthy once its heartbeat is older than three
    /// intervals.
    pub fn is_stale(&self, worker: &str, interval: Duration) -> bool {
        match self.age(worker) {
            Some(age) => age > 3 * interval.as_secs() as EpochSecs,
            None => false,
        }
    }
}

/// Owns the worker tasks and the shared stop signal.
pub struct Scheduler {
    dispatcher: Arc<EventDispatcher>,
    heartbeats: Arc<Heartbeats>,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Scheduler {
    pub fn new(dispatcher: Arc<EventDispatcher>, heartbeats: Arc<Heartbeats>) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            dispatcher,
            heartbeats,
            stop_tx,
            stop_rx,
            handles: Vec::new(),
        }
    }

    pub fn heartbeats(&self) -> Arc<Heartbeats> {
        Arc::clone(&self.heartbeats)
    }

    /// Launch a worker task ticking the collector at the interval.
    pub fn spawn_collector(&mut self, collector: Box<dyn Collector>, interval: Duration) {
        let name = collector.name();
        let handle = tokio::spawn(collector_worker(
            collector,
            interval,
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.heartbeats),
            self.stop_rx.clone(),
        ));
        self.handles.push((name, handle));
    }

    /// Launch the health worker watching the given `(worker, interval)`
    /// pairs.
    pub fn spawn_health(&mut self, interval: Duration, watched: Vec<(String, Duration)>) {
        let handle = tokio::spawn(health_worker(
            interval,
            watched,
            Arc::clone(&self.heartbeats),
            self.stop_rx.clone(),
        ));
        self.handles.push(("health", handle));
    }

    /// Signal stop and wait for every worker to exit.
    pub async fn shutdown(self) {
        info!("scheduler stopping workers");
        let _ = self.stop_tx.send(true);

        for (name, handle) in self.handles {
            match timeout(Duration::from_secs(10), handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(worker = name, error = %e, "worker task failed"),
                Err(_) => warn!(worker = name, "worker did not stop in time"),
            }
        }
        info!("scheduler stopped");
    }
}

async fn collector_worker(
    mut collector: Box<dyn Collector>,
    interval: Duration,
    dispatcher: Arc<EventDispatcher>,
    heartbeats: Arc<Heartbeats>,
    mut stop: watch::Receiver<bool>,
) {
    let name = collector.name();
    info!(worker = name, interval_secs = interval.as_secs(), "collector worker started");

    loop {
        if *stop.borrow() {
            break;
        }
        heartbeats.beat(name);

        match collector.collect() {
            Ok(events) => {
                for event in events {
                    dispatcher.dispatch(event).await;
                }
            }
            // One bad tick must not terminate the worker
            Err(e) => warn!(worker = name, error = %e, "collector tick failed"),
        }

        tokio::select! {
            _ = sleep(interval) => {}
            _ = stop.changed() => break,
        }
    }

    info!(worker = name, "collector worker stopped");
}

async fn health_worker(
    interval: Duration,
    watched: Vec<(String, Duration)>,
    heartbeats: Arc<Heartbeats>,
    mut stop: watch::Receiver<bool>,
) {
    info!(interval_secs = interval.as_secs(), "health worker started");

    loop {
        if *stop.borrow() {
            break;
        }
        heartbeats.beat("health");

        for (worker, worker_interval) in &watched {
            if heartbeats.is_stale(worker, *worker_interval) {
                warn!(
                    worker = worker.as_str(),
                    age_secs = heartbeats.age(worker).unwrap_or_default(),
                    "worker heartbeat is stale"
                );
            }
        }

        tokio::select! {
            _ = sleep(interval) => {}
            _ = stop.changed() => break,
        }
    }

    info!("health worker stopped");
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
