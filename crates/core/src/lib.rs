// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vigil-core: canonical event and alert model for the vigil agent

pub mod alert;
pub mod catalog;
pub mod clock;
pub mod event;
pub mod severity;

pub use alert::{
    AlertDraft, EvidenceRef, EvidenceResolve, EvidenceRole, EvidenceSource, SortOrder, TimeRange,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use event::{
    CpuMetrics, DiskMetrics, EpochSecs, Event, EventPayload, LoadAverage, LogCategory, LogEvent,
    LogSource, MemoryMetrics, MemoryUsage, MetricSnapshot, NetIoCounters, NetworkEvent,
    NetworkEventKind, ProcessEvent, ProcessEventKind, Protocol, RawLogLine, SwapUsage, SystemInfo,
};
pub use severity::Severity;
