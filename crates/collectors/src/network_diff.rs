// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inet connection diff collector.
//!
//! Diffs successive connection snapshots into connection and listen-port
//! lifecycle events, and publishes per-interface I/O counters as state
//! events. TIME_WAIT entries and the agent's own control endpoints are
//! filtered before diffing so connection teardown noise never surfaces.

use crate::{Collector, CollectorError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use vigil_core::{Clock, Event, EventPayload, NetworkEvent, NetworkEventKind};
use vigil_probes::{ConnRecord, ConnectionProbe};
use vigil_storage::statefile;

/// Prior snapshot as persisted on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NetworkState {
    connections: Vec<ConnRecord>,
}

pub struct NetworkDiffCollector {
    probe: Box<dyn ConnectionProbe>,
    state_path: PathBuf,
    /// Local `(ip, port)` endpoints to ignore (the agent's own sockets).
    ignore_local: Vec<(String, u16)>,
    /// Remote addresses that raise CONNECTION_SUSPICIOUS_REMOTE.
    watch_remotes: HashSet<String>,
    prior: Option<NetworkState>,
    clock: Arc<dyn Clock>,
}

impl NetworkDiffCollector {
    pub fn new(
        probe: Box<dyn ConnectionProbe>,
        state_path: impl Into<PathBuf>,
        ignore_local: Vec<(String, u16)>,
        watch_remotes: Vec<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            probe,
            state_path: state_path.into(),
            ignore_local,
            watch_remotes: watch_remotes.into_iter().collect(),
            prior: None,
            clock,
        }
    }

    fn keep(&self, record: &ConnRecord) -> bool {
        if record.status == "TIME_WAIT" {
            return false;
        }
        !self
            .ignore_local
            .iter()
            .any(|(ip, port)| *ip == record.laddr_ip && *port == record.laddr_port)
    }

    fn lifecycle_event(kind: NetworkEventKind, record: &ConnRecord) -> NetworkEvent {
        let mut ev = NetworkEvent::new(kind, record.protocol);
        ev.pid = record.pid;
        ev.process_name = record.process_name.clone();
        ev.laddr_ip = Some(record.laddr_ip.clone());
        ev.laddr_port = Some(record.laddr_port);
        ev.raddr_ip = record.raddr_ip.clone();
        ev.raddr_port = record.raddr_port;
        ev.status = Some(record.status.clone());
        ev.is_listen = record.is_listen;
        ev
    }

    fn diff(&self, prior: &[ConnRecord], current: &[ConnRecord]) -> Vec<NetworkEvent> {
        type Key = (Option<i32>, String, u16, Option<String>, Option<u16>, vigil_core::Protocol);
        let prior_map: HashMap<Key, &ConnRecord> = prior.iter().map(|c| (c.key(), c)).collect();
        let current_map: HashMap<Key, &ConnRecord> = current.iter().map(|c| (c.key(), c)).collect();

        let mut appeared: Vec<&ConnRecord> = current_map
            .iter()
            .filter(|(key, _)| !prior_map.contains_key(*key))
            .map(|(_, record)| *record)
            .collect();
        appeared.sort_unstable_by_key(|record| (record.laddr_port, record.raddr_port));

        let mut events = Vec::new();
        for record in appeared {
            if record.is_listen {
                events.push(Self::lifecycle_event(NetworkEventKind::NewListenPort, record));
            } else if let Some(remote) = &record.raddr_ip {
                events.push(Self::lifecycle_event(NetworkEventKind::NewConnection, record));
                if self.watch_remotes.contains(remote) {
                    let mut ev =
                        Self::lifecycle_event(NetworkEventKind::SuspiciousRemote, record);
                    ev.reason = Some("watchlisted_remote".to_string());
                    ev.description =
                        Some(format!("connection to watchlisted remote address {remote}"));
                    events.push(ev);
                }
            }
        }

        let mut vanished: Vec<&ConnRecord> = prior_map
            .iter()
            .filter(|(key, _)| !current_map.contains_key(*key))
            .map(|(_, record)| *record)
            .collect();
        vanished.sort_unstable_by_key(|record| (record.laddr_port, record.raddr_port));

        for record in vanished {
            if record.is_listen {
                events.push(Self::lifecycle_event(NetworkEventKind::ClosedListenPort, record));
            } else if record.raddr_ip.is_some() {
                events.push(Self::lifecycle_event(NetworkEventKind::ClosedConnection, record));
            }
        }

        events
    }

    fn interface_events(&mut self) -> Result<Vec<NetworkEvent>, CollectorError> {
        let mut events = Vec::new();
        for (iface, counters) in self.probe.interface_io()? {
            let mut ev = NetworkEvent::new(
                NetworkEventKind::InterfaceStats,
                vigil_core::Protocol::Tcp,
            );
            ev.description = Some(iface.clone());
            ev.snapshot = Some(json!({ "interface": iface, "counters": counters }));
            events.push(ev);
        }
        Ok(events)
    }
}

impl Collector for NetworkDiffCollector {
    fn name(&self) -> &'static str {
        "network"
    }

    fn collect(&mut self) -> Result<Vec<Event>, CollectorError> {
        let current: Vec<ConnRecord> = self
            .probe
            .snapshot()?
            .into_iter()
            .filter(|record| self.keep(record))
            .collect();

        let prior = match self.prior.take() {
            Some(prior) => prior,
            None => statefile::load(&self.state_path)?.unwrap_or_default(),
        };

        let now = self.clock.now();
        let mut produced = self.diff(&prior.connections, &current);
        produced.extend(self.interface_events()?);

        let events: Vec<Event> = produced
            .into_iter()
            .map(|ev| Event::new(now, EventPayload::Network(ev)))
            .collect();

        let next = NetworkState {
            connections: current,
        };
        statefile::save(&self.state_path, &next)?;
        self.prior = Some(next);

        debug!(produced = events.len(), "network diff complete");
        Ok(events)
    }
}

#[cfg(test)]
#[path = "network_diff_tests.rs"]
mod tests;
