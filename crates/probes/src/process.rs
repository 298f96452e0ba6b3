// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process table probe backed by sysinfo

use crate::ProbeError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use sysinfo::{ProcessStatus, ProcessesToUpdate, System, Users};
use tracing::debug;
use vigil_core::EpochSecs;

/// One row of the process inventory, as diffed tick to tick and persisted
/// in the prior-snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppid: Option<i32>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe: Option<String>,
    #[serde(default)]
    pub cmdline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub create_time: EpochSecs,
    #[serde(default)]
    pub cpu_percent: f32,
    #[serde(default)]
    pub memory_rss: u64,
    #[serde(default)]
    pub memory_vms: u64,
    #[serde(default)]
    pub exe_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe_hash: Option<String>,
}

impl ProcessRecord {
    /// Minimal record for tests and fakes.
    pub fn stub(pid: i32, name: &str) -> Self {
        Self {
            pid,
            ppid: None,
            name: name.to_string(),
            exe: None,
            cmdline: String::new(),
            username: None,
            status: "RUNNING".to_string(),
            create_time: 0,
            cpu_percent: 0.0,
            memory_rss: 0,
            memory_vms: 0,
            exe_deleted: false,
            exe_hash: None,
        }
    }
}

/// Source of full process-table snapshots.
pub trait ProcessProbe: Send {
    fn snapshot(&mut self) -> Result<HashMap<i32, ProcessRecord>, ProbeError>;
}

/// Real process probe reading the live process table.
pub struct SysinfoProcessProbe {
    sys: System,
    users: Users,
    hash_execs: bool,
    /// Hash cache keyed by executable path; binaries are hashed once,
    /// not on every tick.
    hash_cache: HashMap<String, String>,
}

impl SysinfoProcessProbe {
    pub fn new(hash_execs: bool) -> Self {
        Self {
            sys: System::new(),
            users: Users::new_with_refreshed_list(),
            hash_execs,
            hash_cache: HashMap::new(),
        }
    }

    fn status_label(status: ProcessStatus) -> &'static str {
        match status {
            ProcessStatus::Run => "RUNNING",
            ProcessStatus::Sleep => "SLEEPING",
            ProcessStatus::Idle => "IDLE",
            ProcessStatus::Zombie => "ZOMBIE",
            ProcessStatus::Stop => "STOPPED",
            ProcessStatus::Dead => "DEAD",
            ProcessStatus::Tracing => "TRACED",
            ProcessStatus::UninterruptibleDiskSleep => "DISK_SLEEP",
            _ => "UNKNOWN",
        }
    }

    /// The kernel marks the exe link of a process whose binary was
    /// unlinked; fall back to a plain existence check when the link is
    /// unreadable (insufficient privileges).
    fn exe_deleted(pid: i32, exe: Option<&str>) -> bool {
        match std::fs::read_link(format!("/proc/{pid}/exe")) {
            Ok(target) => target.to_string_lossy().ends_with(" (deleted)"),
            Err(_) => exe.is_some_and(|path| !Path::new(path).exists()),
        }
    }

    fn exe_hash(hash_cache: &mut HashMap<String, String>, exe: &str) -> Option<String> {
        if let Some(hash) = hash_cache.get(exe) {
            return Some(hash.clone());
        }
        let bytes = std::fs::read(exe).ok()?;
        let hash = format!("{:x}", Sha256::digest(&bytes));
        hash_cache.insert(exe.to_string(), hash.clone());
        Some(hash)
    }
}

impl ProcessProbe for SysinfoProcessProbe {
    fn snapshot(&mut self) -> Result<HashMap<i32, ProcessRecord>, ProbeError> {
        self.sys.refresh_processes(ProcessesToUpdate::All, true);
        self.users = Users::new_with_refreshed_list();

        let mut records = HashMap::with_capacity(self.sys.processes().len());
        let hash_cache = &mut self.hash_cache;
        let hash_execs = self.hash_execs;
        for (pid, process) in self.sys.processes() {
            let pid = pid.as_u32() as i32;
            let exe = process.exe().map(|p| p.display().to_string());
            let cmdline = process
                .cmd()
                .iter()
                .map(|part| part.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ");
            let username = process
                .user_id()
                .and_then(|uid| self.users.get_user_by_id(uid))
                .map(|user| user.name().to_string());
            let exe_deleted = Self::exe_deleted(pid, exe.as_deref());

            let exe_hash = if hash_execs && !exe_deleted {
                exe.as_deref().and_then(|path| Self::exe_hash(hash_cache, path))
            } else {
                None
            };

            records.insert(
                pid,
                ProcessRecord {
                    pid,
                    ppid: process.parent().map(|p| p.as_u32() as i32),
                    name: process.name().to_string_lossy().to_string(),
                    exe,
                    cmdline,
                    username,
                    status: Self::status_label(process.status()).to_string(),
                    create_time: process.start_time() as EpochSecs,
                    cpu_percent: process.cpu_usage(),
                    memory_rss: process.memory(),
                    memory_vms: process.virtual_memory(),
                    exe_deleted,
                    exe_hash,
                },
            );
        }

        debug!(count = records.len(), "process snapshot collected");
        Ok(records)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
