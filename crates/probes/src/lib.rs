// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Host inventory probes: process table, inet connections, metrics.
//!
//! Collectors talk to traits so tests can swap in the fakes; the real
//! implementations read from sysinfo and procfs.

mod connections;
#[cfg(any(test, feature = "test-support"))]
mod fake;
mod metrics;
mod process;

pub use connections::{ConnRecord, ConnectionProbe, ProcfsConnectionProbe};
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeConnectionProbe, FakeMetricsProbe, FakeProcessProbe};
pub use metrics::{MetricsProbe, SysinfoMetricsProbe};
pub use process::{ProcessProbe, ProcessRecord, SysinfoProcessProbe};

use thiserror::Error;

/// Errors surfaced by probe implementations.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("procfs error: {0}")]
    Procfs(String),
}
