// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Periodic collectors feeding the event pipeline.
//!
//! Every collector keeps its checkpoint state on disk (byte offsets or
//! prior snapshots) so a restart neither replays nor loses events.

mod log_tail;
mod metrics;
mod network_diff;
mod offsets;
mod process_diff;

pub use log_tail::{LogFileSource, LogTailCollector};
pub use metrics::MetricsCollector;
pub use network_diff::NetworkDiffCollector;
pub use offsets::OffsetStore;
pub use process_diff::ProcessDiffCollector;

use thiserror::Error;
use vigil_core::Event;

/// Errors that can occur during a collector tick.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("probe error: {0}")]
    Probe(#[from] vigil_probes::ProbeError),
    #[error("state file error: {0}")]
    State(#[from] vigil_storage::StateFileError),
}

/// One periodic signal source.
///
/// `collect` runs once per scheduler tick and returns the batch of
/// events produced since the previous tick. A failed tick is logged by
/// the worker and retried at the next interval.
pub trait Collector: Send {
    fn name(&self) -> &'static str;

    fn collect(&mut self) -> Result<Vec<Event>, CollectorError>;
}
