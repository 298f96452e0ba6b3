// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process table diff collector.
//!
//! Compares the current inventory with the prior snapshot and emits
//! lifecycle and mutation events. The prior snapshot is persisted (pid
//! keyed as strings) so a restart does not re-announce every process.

use crate::{Collector, CollectorError};
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use vigil_core::{Clock, EpochSecs, Event, EventPayload, ProcessEvent, ProcessEventKind};
use vigil_probes::{ProcessProbe, ProcessRecord};
use vigil_storage::statefile;

type PriorMap = HashMap<String, ProcessRecord>;

pub struct ProcessDiffCollector {
    probe: Box<dyn ProcessProbe>,
    state_path: PathBuf,
    /// Prior snapshot; lazily loaded from disk on the first tick.
    prior: Option<PriorMap>,
    clock: Arc<dyn Clock>,
}

impl ProcessDiffCollector {
    pub fn new(
        probe: Box<dyn ProcessProbe>,
        state_path: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            probe,
            state_path: state_path.into(),
            prior: None,
            clock,
        }
    }

    fn base_event(kind: ProcessEventKind, record: &ProcessRecord) -> ProcessEvent {
        let mut ev = ProcessEvent::new(kind, record.pid);
        ev.ppid = record.ppid;
        ev.name = Some(record.name.clone());
        ev.exe = record.exe.clone();
        ev.cmdline = Some(record.cmdline.clone());
        ev.username = record.username.clone();
        ev.create_time = Some(record.create_time);
        ev.cpu_percent = Some(record.cpu_percent);
        ev.memory_rss = Some(record.memory_rss);
        ev.memory_vms = Some(record.memory_vms);
        ev.exe_deleted = Some(record.exe_deleted);
        ev
    }

    fn with_snapshot(mut ev: ProcessEvent, record: &ProcessRecord) -> ProcessEvent {
        ev.snapshot = serde_json::to_value(record).ok();
        ev
    }

    fn mutation(
        kind: ProcessEventKind,
        record: &ProcessRecord,
        old: Option<String>,
        new: Option<String>,
    ) -> ProcessEvent {
        let mut ev = Self::base_event(kind, record);
        ev.old = old;
        ev.new = new;
        ev
    }

    fn diff(prior: &PriorMap, current: &HashMap<i32, ProcessRecord>, now: EpochSecs) -> Vec<ProcessEvent> {
        let mut events = Vec::new();

        let mut pids: Vec<i32> = current.keys().copied().collect();
        pids.sort_unstable();

        for pid in pids {
            let Some(record) = current.get(&pid) else { continue };
            let Some(old) = prior.get(&pid.to_string()) else {
                let mut ev = Self::with_snapshot(
                    Self::base_event(ProcessEventKind::New, record),
                    record,
                );
                ev.parent_name = record
                    .ppid
                    .and_then(|ppid| current.get(&ppid))
                    .map(|parent| parent.name.clone());
                events.push(ev);
                continue;
            };

            if old.exe != record.exe {
                events.push(Self::mutation(
                    ProcessEventKind::ExecChanged,
                    record,
                    old.exe.clone(),
                    record.exe.clone(),
                ));
            }
            if old.cmdline != record.cmdline {
                events.push(Self::mutation(
                    ProcessEventKind::CmdlineChanged,
                    record,
                    Some(old.cmdline.clone()),
                    Some(record.cmdline.clone()),
                ));
            }
            if old.username != record.username {
                events.push(Self::mutation(
                    ProcessEventKind::PrivEscalation,
                    record,
                    old.username.clone(),
                    record.username.clone(),
                ));
            }
            if old.status != record.status {
                events.push(Self::mutation(
                    ProcessEventKind::StatusChanged,
                    record,
                    Some(old.status.clone()),
                    Some(record.status.clone()),
                ));
                if record.status == "ZOMBIE" {
                    events.push(Self::base_event(ProcessEventKind::ZombieProcess, record));
                }
            }
            if !old.exe_deleted && record.exe_deleted {
                events.push(Self::base_event(ProcessEventKind::ExecDeleted, record));
            }
            if let (Some(old_hash), Some(new_hash)) = (&old.exe_hash, &record.exe_hash) {
                if old_hash != new_hash {
                    events.push(Self::mutation(
                        ProcessEventKind::ExecHashChanged,
                        record,
                        Some(old_hash.clone()),
                        Some(new_hash.clone()),
                    ));
                }
            }
        }

        let mut gone: Vec<&ProcessRecord> = prior
            .values()
            .filter(|old| !current.contains_key(&old.pid))
            .collect();
        gone.sort_unstable_by_key(|old| old.pid);

        for old in gone {
            let mut ev = ProcessEvent::new(ProcessEventKind::Terminated, old.pid);
            ev.ppid = old.ppid;
            ev.name = Some(old.name.clone());
            ev.exe = old.exe.clone();
            ev.username = old.username.clone();
            ev.create_time = Some(old.create_time);
            ev.run_time = Some((now - old.create_time).max(0));
            ev.snapshot = serde_json::to_value(old).ok().map(|prev| json!({ "prior": prev }));
            events.push(ev);
        }

        events
    }
}

impl Collector for ProcessDiffCollector {
    fn name(&self) -> &'static str {
        "process"
    }

    fn collect(&mut self) -> Result<Vec<Event>, CollectorError> {
        let current = self.probe.snapshot()?;
        let prior: PriorMap = match self.prior.take() {
            Some(prior) => prior,
            None => statefile::load(&self.state_path)?.unwrap_or_default(),
        };

        let now = self.clock.now();
        let events: Vec<Event> = Self::diff(&prior, &current, now)
            .into_iter()
            .map(|ev| Event::new(now, EventPayload::Process(ev)))
            .collect();

        let next: PriorMap = current
            .into_iter()
            .map(|(pid, record)| (pid.to_string(), record))
            .collect();
        statefile::save(&self.state_path, &next)?;
        self.prior = Some(next);

        debug!(produced = events.len(), "process diff complete");
        Ok(events)
    }
}

#[cfg(test)]
#[path = "process_diff_tests.rs"]
mod tests;
