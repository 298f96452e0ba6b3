// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent per-source byte offsets for the log tailer.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use vigil_storage::{statefile, StateFileError};

/// Mutex-guarded offset map persisted as one JSON document.
///
/// `set` only updates memory; `save` flushes atomically. The tailer
/// batches its per-source updates and saves once per tick.
pub struct OffsetStore {
    path: PathBuf,
    offsets: Mutex<BTreeMap<String, u64>>,
}

impl OffsetStore {
    /// Load the offset file, treating a missing or corrupt file as an
    /// empty mapping.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StateFileError> {
        let path = path.into();
        let offsets = statefile::load(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            offsets: Mutex::new(offsets),
        })
    }

    /// Stored offset for a source; unknown sources start at 0.
    pub fn get(&self, source: &str) -> u64 {
        *self.offsets.lock().get(source).unwrap_or(&0)
    }

    /// Update an offset in memory.
    pub fn set(&self, source: &str, offset: u64) {
        self.offsets.lock().insert(source.to_string(), offset);
    }

    /// Flush the mapping to disk atomically.
    pub fn save(&self) -> Result<(), StateFileError> {
        let offsets = self.offsets.lock();
        statefile::save(&self.path, &*offsets)
    }

    /// Reset one source to 0 and persist.
    pub fn reset(&self, source: &str) -> Result<(), StateFileError> {
        {
            let mut offsets = self.offsets.lock();
            offsets.insert(source.to_string(), 0);
        }
        self.save()
    }

    /// Drop every offset and persist.
    pub fn reset_all(&self) -> Result<(), StateFileError> {
        {
            let mut offsets = self.offsets.lock();
            offsets.clear();
        }
        self.save()
    }
}

#[cfg(test)]
#[path = "offsets_tests.rs"]
mod tests;
