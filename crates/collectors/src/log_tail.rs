// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental log tailer with rotation handling.
//!
//! Each tick reads every configured file from its stored byte offset to
//! EOF and hands the new lines to the parser registry. A stored offset
//! larger than the current file size means the file was rotated or
//! truncated; reading restarts from 0.
//!
//! The trailing partial line (no terminator yet) is consumed into the
//! offset. Sources are line-append-only, so the worst case is one torn
//! line that no parser matches.

use crate::offsets::OffsetStore;
use crate::{Collector, CollectorError};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use vigil_core::{Clock, Event, LogSource, RawLogLine};
use vigil_parsers::ParserRegistry;

/// One monitored log file.
#[derive(Debug, Clone)]
pub struct LogFileSource {
    pub source: LogSource,
    pub path: PathBuf,
}

/// Tailing collector over a fixed set of log files.
pub struct LogTailCollector {
    sources: Vec<LogFileSource>,
    offsets: OffsetStore,
    registry: ParserRegistry,
    clock: Arc<dyn Clock>,
}

impl LogTailCollector {
    pub fn new(
        sources: Vec<LogFileSource>,
        offsets: OffsetStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sources,
            offsets,
            registry: ParserRegistry::new(),
            clock,
        }
    }

    fn collect_source(
        &self,
        source: &LogFileSource,
        events: &mut Vec<Event>,
    ) -> Result<(), CollectorError> {
        let tag = source.source.as_str();

        // Missing files are skipped, not errors: ufw.log only exists
        // when the firewall logs anything.
        let Ok(meta) = std::fs::metadata(&source.path) else {
            return Ok(());
        };
        let size = meta.len();
        let mut offset = self.offsets.get(tag);

        if offset > size {
            warn!(
                source = tag,
                stored = offset,
                size,
                "file shrank below stored offset; rotation or truncation, restarting from 0"
            );
            offset = 0;
        }
        if offset == size {
            return Ok(());
        }

        let file = File::open(&source.path)?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;

        let now = self.clock.now();
        let mut line = String::new();
        let mut produced = 0usize;
        loop {
            line.clear();
            let read = reader.read_line(&mut line)?;
            if read == 0 {
                break;
            }
            offset += read as u64;

            let text = line.trim_end_matches(['\n', '\r']);
            if text.is_empty() {
                continue;
            }

            let raw = RawLogLine {
                source: source.source,
                text: text.to_string(),
            };
            if let Some(event) = self.registry.dispatch(&raw, now) {
                events.push(event);
                produced += 1;
            }
        }

        self.offsets.set(tag, offset);
        debug!(source = tag, offset, produced, "log source tailed");
        Ok(())
    }
}

impl Collector for LogTailCollector {
    fn name(&self) -> &'static str {
        "log"
    }

    fn collect(&mut self) -> Result<Vec<Event>, CollectorError> {
        let mut events = Vec::new();
        for source in &self.sources {
            // One unreadable file must not starve the other sources
            if let Err(e) = self.collect_source(source, &mut events) {
                warn!(source = source.source.as_str(), error = %e, "log source tick failed");
            }
        }
        self.offsets.save()?;
        Ok(events)
    }
}

#[cfg(test)]
#[path = "log_tail_tests.rs"]
mod tests;
