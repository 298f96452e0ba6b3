// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser selection and raw-line dispatch.
//!
//! The registry picks the parser for a raw line's source tag, runs its
//! cheap `matches` gate, and turns the parse result into a pipeline
//! [`Event`]. Non-matching or unparseable lines are dropped; that is the
//! expected fate of most traffic, not an error.

use crate::auth::AuthParser;
use crate::dpkg::DpkgParser;
use crate::kernel::KernelParser;
use crate::sys::SysParser;
use crate::ufw::UfwParser;
use std::collections::HashMap;
use tracing::trace;
use vigil_core::{EpochSecs, Event, EventPayload, LogEvent, LogSource, RawLogLine};

/// Parse result: the structured event plus the line's own timestamp
/// (falling back to the dispatch time when the line carries none).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub timestamp: Option<EpochSecs>,
    pub event: LogEvent,
}

/// One parser per log source.
pub trait LineParser: Send + Sync {
    fn source(&self) -> LogSource;

    /// Cheap pre-filter; `parse` is only called when this returns true.
    fn matches(&self, line: &str) -> bool;

    /// Full parse. `None` means the line is dropped.
    fn parse(&self, line: &str) -> Option<ParsedLine>;
}

/// Source-tag → parser table.
pub struct ParserRegistry {
    parsers: HashMap<LogSource, Box<dyn LineParser>>,
}

impl ParserRegistry {
    /// Registry with the five stock parsers.
    pub fn new() -> Self {
        let mut parsers: HashMap<LogSource, Box<dyn LineParser>> = HashMap::new();
        for parser in [
            Box::new(AuthParser::new()) as Box<dyn LineParser>,
            Box::new(SysParser::new()),
            Box::new(KernelParser::new()),
            Box::new(DpkgParser::new()),
            Box::new(UfwParser::new()),
        ] {
            parsers.insert(parser.source(), parser);
        }
        Self { parsers }
    }

    /// Parse a raw line into a pipeline event.
    ///
    /// `now` stamps lines whose timestamp cannot be extracted.
    pub fn dispatch(&self, raw: &RawLogLine, now: EpochSecs) -> Option<Event> {
        let parser = self.parsers.get(&raw.source)?;
        if !parser.matches(&raw.text) {
            trace!(source = %raw.source, "line did not match parser");
            return None;
        }

        let parsed = parser.parse(&raw.text)?;
        let mut event = Event::new(
            parsed.timestamp.unwrap_or(now),
            EventPayload::Log(parsed.event),
        );
        event.raw = Some(raw.text.trim_end().to_string());
        Some(event)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
