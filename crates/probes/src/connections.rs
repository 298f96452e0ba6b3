// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inet connection probe backed by procfs.
//!
//! Reads /proc/net/{tcp,tcp6,udp,udp6} and maps socket inodes back to
//! owning processes by scanning /proc/<pid>/fd. Entries owned by
//! unreadable processes keep `pid: None`.

use crate::ProbeError;
use procfs::net::{TcpState, UdpState};
use procfs::process::FDTarget;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};
use vigil_core::{NetIoCounters, Protocol};

/// One row of the connection inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    pub protocol: Protocol,
    pub laddr_ip: String,
    pub laddr_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raddr_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raddr_port: Option<u16>,
    pub status: String,
    pub is_listen: bool,
}

impl ConnRecord {
    /// Diff key: endpoint tuple without the TCP state, so state churn on
    /// an existing connection does not read as close + open.
    pub fn key(&self) -> (Option<i32>, String, u16, Option<String>, Option<u16>, Protocol) {
        (
            self.pid,
            self.laddr_ip.clone(),
            self.laddr_port,
            self.raddr_ip.clone(),
            self.raddr_port,
            self.protocol,
        )
    }
}

/// Source of connection snapshots and interface counters.
pub trait ConnectionProbe: Send {
    fn snapshot(&mut self) -> Result<Vec<ConnRecord>, ProbeError>;

    /// Cumulative per-interface I/O counters.
    fn interface_io(&mut self) -> Result<BTreeMap<String, NetIoCounters>, ProbeError>;
}

/// Real connection probe reading procfs.
#[derive(Debug, Default)]
pub struct ProcfsConnectionProbe;

impl ProcfsConnectionProbe {
    pub fn new() -> Self {
        Self
    }

    fn tcp_status(state: &TcpState) -> &'static str {
        match state {
            TcpState::Established => "ESTABLISHED",
            TcpState::SynSent => "SYN_SENT",
            TcpState::SynRecv | TcpState::NewSynRecv => "SYN_RECV",
            TcpState::FinWait1 => "FIN_WAIT1",
            TcpState::FinWait2 => "FIN_WAIT2",
            TcpState::TimeWait => "TIME_WAIT",
            TcpState::Close => "CLOSE",
            TcpState::CloseWait => "CLOSE_WAIT",
            TcpState::LastAck => "LAST_ACK",
            TcpState::Listen => "LISTEN",
            TcpState::Closing => "CLOSING",
        }
    }

    /// Map socket inodes to owning processes. Processes that disappear
    /// or deny fd access mid-scan are skipped.
    fn socket_owners() -> HashMap<u64, (i32, Option<String>)> {
        let mut owners = HashMap::new();
        let Ok(processes) = procfs::process::all_processes() else {
            warn!("unable to enumerate /proc processes");
            return owners;
        };

        for process in processes.flatten() {
            let Ok(fds) = process.fd() else { continue };
            let name = process.stat().ok().map(|stat| stat.comm);
            for fd in fds.flatten() {
                if let FDTarget::Socket(inode) = fd.target {
                    owners.insert(inode, (process.pid, name.clone()));
                }
            }
        }
        owners
    }

    fn push_tcp(
        records: &mut Vec<ConnRecord>,
        owners: &HashMap<u64, (i32, Option<String>)>,
        entries: Vec<procfs::net::TcpNetEntry>,
    ) {
        for entry in entries {
            let owner = owners.get(&entry.inode);
            let is_listen = entry.state == TcpState::Listen;
            let remote_port = entry.remote_address.port();
            records.push(ConnRecord {
                pid: owner.map(|(pid, _)| *pid),
                process_name: owner.and_then(|(_, name)| name.clone()),
                protocol: Protocol::Tcp,
                laddr_ip: entry.local_address.ip().to_string(),
                laddr_port: entry.local_address.port(),
                raddr_ip: (!is_listen && remote_port != 0)
                    .then(|| entry.remote_address.ip().to_string()),
                raddr_port: (!is_listen && remote_port != 0).then_some(remote_port),
                status: Self::tcp_status(&entry.state).to_string(),
                is_listen,
            });
        }
    }

    fn push_udp(
        records: &mut Vec<ConnRecord>,
        owners: &HashMap<u64, (i32, Option<String>)>,
        entries: Vec<procfs::net::UdpNetEntry>,
    ) {
        for entry in entries {
            let owner = owners.get(&entry.inode);
            let remote_port = entry.remote_address.port();
            // A UDP socket with no remote peer behaves as a listener
            let is_listen = remote_port == 0;
            let status = match entry.state {
                UdpState::Established => "ESTABLISHED",
                _ => "NONE",
            };
            records.push(ConnRecord {
                pid: owner.map(|(pid, _)| *pid),
                process_name: owner.and_then(|(_, name)| name.clone()),
                protocol: Protocol::Udp,
                laddr_ip: entry.local_address.ip().to_string(),
                laddr_port: entry.local_address.port(),
                raddr_ip: (!is_listen).then(|| entry.remote_address.ip().to_string()),
                raddr_port: (!is_listen).then_some(remote_port),
                status: status.to_string(),
                is_listen,
            });
        }
    }
}

impl ConnectionProbe for ProcfsConnectionProbe {
    fn snapshot(&mut self) -> Result<Vec<ConnRecord>, ProbeError> {
        let owners = Self::socket_owners();
        let mut records = Vec::new();

        match procfs::net::tcp() {
            Ok(entries) => Self::push_tcp(&mut records, &owners, entries),
            Err(e) => warn!(error = %e, "reading /proc/net/tcp failed"),
        }
        if let Ok(entries) = procfs::net::tcp6() {
            Self::push_tcp(&mut records, &owners, entries);
        }
        match procfs::net::udp() {
            Ok(entries) => Self::push_udp(&mut records, &owners, entries),
            Err(e) => warn!(error = %e, "reading /proc/net/udp failed"),
        }
        if let Ok(entries) = procfs::net::udp6() {
            Self::push_udp(&mut records, &owners, entries);
        }

        debug!(count = records.len(), "connection snapshot collected");
        Ok(records)
    }

    fn interface_io(&mut self) -> Result<BTreeMap<String, NetIoCounters>, ProbeError> {
        let stats = procfs::net::dev_status().map_err(|e| ProbeError::Procfs(e.to_string()))?;
        Ok(stats
            .into_iter()
            .map(|(iface, status)| {
                (
                    iface,
                    NetIoCounters {
                        bytes_sent: status.sent_bytes,
                        bytes_recv: status.recv_bytes,
                        packets_sent: status.sent_packets,
                        packets_recv: status.recv_packets,
                        errors_in: status.recv_errs,
                        errors_out: status.sent_errs,
                    },
                )
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "connections_tests.rs"]
mod tests;
