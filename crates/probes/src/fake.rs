// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable probes for collector tests.
//!
//! Each fake shares its state behind an `Arc` so the test keeps a handle
//! while the collector owns the boxed probe.

use crate::connections::{ConnRecord, ConnectionProbe};
use crate::metrics::MetricsProbe;
use crate::process::{ProcessProbe, ProcessRecord};
use crate::ProbeError;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use vigil_core::{MetricSnapshot, NetIoCounters};

/// Process probe returning whatever the test last installed.
#[derive(Clone, Default)]
pub struct FakeProcessProbe {
    current: Arc<Mutex<HashMap<i32, ProcessRecord>>>,
}

impl FakeProcessProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_processes(&self, records: Vec<ProcessRecord>) {
        let mut current = self.current.lock();
        *current = records.into_iter().map(|r| (r.pid, r)).collect();
    }

    pub fn remove(&self, pid: i32) {
        self.current.lock().remove(&pid);
    }

    pub fn upsert(&self, record: ProcessRecord) {
        self.current.lock().insert(record.pid, record);
    }
}

impl ProcessProbe for FakeProcessProbe {
    fn snapshot(&mut self) -> Result<HashMap<i32, ProcessRecord>, ProbeError> {
        Ok(self.current.lock().clone())
    }
}

/// Connection probe returning whatever the test last installed.
#[derive(Clone, Default)]
pub struct FakeConnectionProbe {
    connections: Arc<Mutex<Vec<ConnRecord>>>,
    interfaces: Arc<Mutex<BTreeMap<String, NetIoCounters>>>,
}

impl FakeConnectionProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connections(&self, records: Vec<ConnRecord>) {
        *self.connections.lock() = records;
    }

    pub fn set_interfaces(&self, interfaces: BTreeMap<String, NetIoCounters>) {
        *self.interfaces.lock() = interfaces;
    }
}

impl ConnectionProbe for FakeConnectionProbe {
    fn snapshot(&mut self) -> Result<Vec<ConnRecord>, ProbeError> {
        Ok(self.connections.lock().clone())
    }

    fn interface_io(&mut self) -> Result<BTreeMap<String, NetIoCounters>, ProbeError> {
        Ok(self.interfaces.lock().clone())
    }
}

/// Metrics probe returning whatever the test last installed.
#[derive(Clone, Default)]
pub struct FakeMetricsProbe {
    next: Arc<Mutex<MetricSnapshot>>,
}

impl FakeMetricsProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_snapshot(&self, snapshot: MetricSnapshot) {
        *self.next.lock() = snapshot;
    }

    /// Convenience for threshold-rule tests.
    pub fn set_usage(&self, cpu_percent: f32, ram_percent: f32) {
        let mut snapshot = self.next.lock();
        snapshot.cpu.percent = cpu_percent;
        snapshot.memory.ram.percent = ram_percent;
    }
}

impl MetricsProbe for FakeMetricsProbe {
    fn sample(&mut self) -> Result<MetricSnapshot, ProbeError> {
        Ok(self.next.lock().clone())
    }
}
