// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Correlation context: per-rule, per-key bounded rings of event
//! references with sliding-window expiry.
//!
//! Entries are pruned lazily on `add`/`get`; per-key rings are capped by
//! dropping the oldest entry, and the per-rule key population is capped
//! by FIFO eviction of the oldest key (IndexMap preserves insertion
//! order, which is exactly the eviction order we need).

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};
use vigil_core::{Clock, EpochSecs};

/// Small composite correlation key, e.g. `(ip, user)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationKey(Vec<String>);

impl CorrelationKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn single(part: impl Into<String>) -> Self {
        Self(vec![part.into()])
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("|"))
    }
}

/// Minimal reference to an event held in a ring.
///
/// `event_id` is `None` for in-flight events (ids are assigned at
/// persistence time); rules fall back to resolver specs in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRef {
    pub event_id: Option<i64>,
    pub event_type: String,
    pub ts: EpochSecs,
}

type RuleBucket = IndexMap<CorrelationKey, VecDeque<EventRef>>;

/// Shared, mutex-guarded correlation store.
pub struct CorrelationContext {
    clock: Arc<dyn Clock>,
    default_window: EpochSecs,
    max_keys_per_rule: usize,
    max_events_per_key: usize,
    store: Mutex<HashMap<String, RuleBucket>>,
}

impl CorrelationContext {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(clock, 300, 500, 50)
    }

    pub fn with_limits(
        clock: Arc<dyn Clock>,
        default_window: EpochSecs,
        max_keys_per_rule: usize,
        max_events_per_key: usize,
    ) -> Self {
        Self {
            clock,
            default_window,
            max_keys_per_rule,
            max_events_per_key,
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Record an event reference under `(rule_id, key)`.
    pub fn add(
        &self,
        rule_id: &str,
        key: CorrelationKey,
        entry: EventRef,
        window_seconds: Option<EpochSecs>,
    ) {
        let window = window_seconds.unwrap_or(self.default_window);
        let cutoff = self.clock.now() - window;

        let mut store = self.store.lock();
        let bucket = store.entry(rule_id.to_string()).or_default();

        // FIFO-evict the oldest key before admitting a new one
        if !bucket.contains_key(&key) && bucket.len() >= self.max_keys_per_rule {
            if let Some((evicted, _)) = bucket.shift_remove_index(0) {
                warn!(rule = rule_id, key = %evicted, "correlation key cap reached, evicting oldest");
            }
        }

        let ring = bucket.entry(key).or_default();
        Self::prune(ring, cutoff);
        while ring.len() >= self.max_events_per_key {
            ring.pop_front();
        }
        ring.push_back(entry);
    }

    /// Pruned copy of the ring for `(rule_id, key)`.
    pub fn get(
        &self,
        rule_id: &str,
        key: &CorrelationKey,
        window_seconds: Option<EpochSecs>,
    ) -> Vec<EventRef> {
        let window = window_seconds.unwrap_or(self.default_window);
        let cutoff = self.clock.now() - window;

        let mut store = self.store.lock();
        let Some(bucket) = store.get_mut(rule_id) else {
            return Vec::new();
        };
        let Some(ring) = bucket.get_mut(key) else {
            return Vec::new();
        };
        Self::prune(ring, cutoff);
        ring.iter().cloned().collect()
    }

    /// Keys currently tracked for a rule, oldest first.
    pub fn keys(&self, rule_id: &str) -> Vec<CorrelationKey> {
        let store = self.store.lock();
        store
            .get(rule_id)
            .map(|bucket| bucket.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear_key(&self, rule_id: &str, key: &CorrelationKey) {
        let mut store = self.store.lock();
        if let Some(bucket) = store.get_mut(rule_id) {
            if bucket.shift_remove(key).is_some() {
                debug!(rule = rule_id, key = %key, "correlation key cleared");
            }
        }
    }

    pub fn clear_rule(&self, rule_id: &str) {
        let mut store = self.store.lock();
        store.remove(rule_id);
    }

    fn prune(ring: &mut VecDeque<EventRef>, cutoff: EpochSecs) {
        while ring.front().is_some_and(|entry| entry.ts < cutoff) {
            ring.pop_front();
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
