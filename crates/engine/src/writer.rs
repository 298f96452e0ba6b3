// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-writer persistence service.
//!
//! The only component that writes to storage. Payloads arrive over a
//! bounded queue; a full queue blocks the producing collector, which is
//! the chosen backpressure behavior. Lock contention is retried with a
//! short linear backoff; anything else abandons the payload with a log
//! line rather than poisoning the queue.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration, Instant};
use tracing::{error, info, warn};
use vigil_core::{AlertDraft, Clock, Event, EvidenceRef};
use vigil_storage::{Store, StoreError};

/// Dequeue timeout so the worker notices stop requests while idle.
const DEQUEUE_TIMEOUT: Duration = Duration::from_secs(1);

/// How long shutdown keeps draining queued payloads.
const DRAIN_DEADLINE: Duration = Duration::from_secs(5);

const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Linear backoff step: attempt N sleeps N × this.
const RETRY_BACKOFF_STEP: Duration = Duration::from_millis(100);

/// Unit of work for the writer.
#[derive(Debug, Clone)]
pub enum WritePayload {
    Event(Event),
    Alert {
        alert: AlertDraft,
        evidence: Vec<EvidenceRef>,
    },
}

impl WritePayload {
    /// Routing tag for log lines.
    pub fn kind(&self) -> &str {
        match self {
            WritePayload::Event(event) => event.type_tag(),
            WritePayload::Alert { .. } => "ALERT",
        }
    }
}

/// Producer side of the writer queue.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<WritePayload>,
}

impl WriterHandle {
    /// Enqueue a payload, waiting when the queue is full.
    pub async fn enqueue(&self, payload: WritePayload) {
        if self.tx.send(payload).await.is_err() {
            error!("writer queue closed, payload dropped");
        }
    }
}

/// The consumer task.
pub struct WriterService {
    store: Store,
    rx: mpsc::Receiver<WritePayload>,
    stop: watch::Receiver<bool>,
    clock: Arc<dyn Clock>,
}

impl WriterService {
    /// Spawn the writer task over the given store.
    pub fn spawn(
        store: Store,
        clock: Arc<dyn Clock>,
        capacity: usize,
        stop: watch::Receiver<bool>,
    ) -> (WriterHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let service = Self {
            store,
            rx,
            stop,
            clock,
        };
        let handle = tokio::spawn(service.run());
        (WriterHandle { tx }, handle)
    }

    async fn run(mut self) {
        info!("writer service running");
        loop {
            if *self.stop.borrow() {
                self.drain().await;
                break;
            }
            match timeout(DEQUEUE_TIMEOUT, self.rx.recv()).await {
                Ok(Some(payload)) => self.persist(payload).await,
                Ok(None) => break,
                Err(_) => {}
            }
        }
        info!("writer service stopped");
    }

    /// Process whatever is already queued, up to the drain deadline.
    async fn drain(&mut self) {
        let deadline = Instant::now() + DRAIN_DEADLINE;
        let mut drained = 0usize;
        while Instant::now() < deadline {
            match self.rx.try_recv() {
                Ok(payload) => {
                    self.persist(payload).await;
                    drained += 1;
                }
                Err(_) => break,
            }
        }
        if drained > 0 {
            info!(drained, "writer drained queued payloads on shutdown");
        }
    }

    async fn persist(&mut self, payload: WritePayload) {
        let now = self.clock.now();
        let store = &mut self.store;
        let kind = payload.kind().to_string();
        with_retry(&kind, || match &payload {
            WritePayload::Event(event) => store.insert_event(event).map(|_| ()),
            WritePayload::Alert { alert, evidence } => {
                store.insert_alert(alert, now, evidence).map(|_| ())
            }
        })
        .await;
    }
}

/// Run a storage operation with bounded retries on lock contention.
///
/// Returns whether the operation eventually succeeded; failure is
/// terminal for the payload, never for the service.
pub(crate) async fn with_retry<F>(kind: &str, mut op: F) -> bool
where
    F: FnMut() -> Result<(), StoreError>,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        match op() {
            Ok(()) => return true,
            Err(e) if e.is_locked() && attempt < MAX_WRITE_ATTEMPTS => {
                warn!(kind, attempt, "database locked, retrying");
                sleep(RETRY_BACKOFF_STEP * attempt).await;
            }
            Err(e) => {
                error!(kind, error = %e, "abandoning payload");
                return false;
            }
        }
    }
    false
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
