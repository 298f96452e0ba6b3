// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types for the vigil agent
//!
//! Every signal the collectors produce is an [`Event`]: a small header
//! (timestamp, optional raw line) plus a tagged payload variant. The
//! writer routes on the payload tag; rules match on [`Event::type_tag`].

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Second-resolution wall-clock epoch timestamp.
pub type EpochSecs = i64;

/// Monitored log source tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Auth,
    Syslog,
    Kernel,
    Dpkg,
    Ufw,
}

impl LogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogSource::Auth => "auth",
            LogSource::Syslog => "syslog",
            LogSource::Kernel => "kernel",
            LogSource::Dpkg => "dpkg",
            LogSource::Ufw => "ufw",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auth" => Some(LogSource::Auth),
            "syslog" => Some(LogSource::Syslog),
            "kernel" => Some(LogSource::Kernel),
            "dpkg" => Some(LogSource::Dpkg),
            "ufw" => Some(LogSource::Ufw),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// High-level category of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogCategory {
    Auth,
    System,
    Kernel,
    Package,
    Firewall,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Auth => "AUTH",
            LogCategory::System => "SYSTEM",
            LogCategory::Kernel => "KERNEL",
            LogCategory::Package => "PACKAGE",
            LogCategory::Firewall => "FIREWALL",
        }
    }
}

/// A raw, unparsed line pulled from a monitored log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogLine {
    pub source: LogSource,
    pub text: String,
}

/// Structured event parsed from a log line.
///
/// `event_type` is the parser-assigned taxonomy value (FAILED_LOGIN,
/// SERVICE_FAILED, PACKAGE_INSTALL, …); source-specific detail that has
/// no column of its own (pid, method, unit, package, ports) rides in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub log_source: LogSource,
    pub event_type: String,
    pub category: LogCategory,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

/// Process lifecycle and mutation event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessEventKind {
    #[serde(rename = "PROCESS_NEW")]
    New,
    #[serde(rename = "PROCESS_TERMINATED")]
    Terminated,
    #[serde(rename = "PROCESS_EXEC_CHANGED")]
    ExecChanged,
    #[serde(rename = "PROCESS_CMDLINE_CHANGED")]
    CmdlineChanged,
    #[serde(rename = "PROCESS_PRIV_ESCALATION")]
    PrivEscalation,
    #[serde(rename = "PROCESS_STATUS_CHANGED")]
    StatusChanged,
    #[serde(rename = "PROCESS_ZOMBIE_PROCESS")]
    ZombieProcess,
    #[serde(rename = "PROCESS_EXEC_DELETED")]
    ExecDeleted,
    #[serde(rename = "PROCESS_EXEC_HASH_CHANGED")]
    ExecHashChanged,
}

impl ProcessEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessEventKind::New => "PROCESS_NEW",
            ProcessEventKind::Terminated => "PROCESS_TERMINATED",
            ProcessEventKind::ExecChanged => "PROCESS_EXEC_CHANGED",
            ProcessEventKind::CmdlineChanged => "PROCESS_CMDLINE_CHANGED",
            ProcessEventKind::PrivEscalation => "PROCESS_PRIV_ESCALATION",
            ProcessEventKind::StatusChanged => "PROCESS_STATUS_CHANGED",
            ProcessEventKind::ZombieProcess => "PROCESS_ZOMBIE_PROCESS",
            ProcessEventKind::ExecDeleted => "PROCESS_EXEC_DELETED",
            ProcessEventKind::ExecHashChanged => "PROCESS_EXEC_HASH_CHANGED",
        }
    }
}

/// Event produced by the process diff collector.
///
/// Mutation kinds carry the changed field in `old`/`new`; the full
/// snapshot record rides in `snapshot` for forensics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEvent {
    pub kind: ProcessEventKind,
    pub pid: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppid: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmdline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<EpochSecs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_rss: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_vms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe_deleted: Option<bool>,
    /// Seconds the process had been alive, set on termination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Value>,
}

impl ProcessEvent {
    pub fn new(kind: ProcessEventKind, pid: i32) -> Self {
        Self {
            kind,
            pid,
            ppid: None,
            name: None,
            parent_name: None,
            exe: None,
            cmdline: None,
            username: None,
            create_time: None,
            cpu_percent: None,
            memory_rss: None,
            memory_vms: None,
            old: None,
            new: None,
            exe_deleted: None,
            run_time: None,
            snapshot: None,
        }
    }
}

/// Transport protocol of a tracked connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection and listen-port lifecycle event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkEventKind {
    #[serde(rename = "NET_NEW_CONNECTION")]
    NewConnection,
    #[serde(rename = "NET_CLOSED_CONNECTION")]
    ClosedConnection,
    #[serde(rename = "NET_NEW_LISTEN_PORT")]
    NewListenPort,
    #[serde(rename = "NET_CLOSED_LISTEN_PORT")]
    ClosedListenPort,
    #[serde(rename = "CONNECTION_SUSPICIOUS_REMOTE")]
    SuspiciousRemote,
    /// Per-interface I/O counters; state observation, not alert-relevant.
    #[serde(rename = "NET_INTERFACE_STATS")]
    InterfaceStats,
}

impl NetworkEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkEventKind::NewConnection => "NET_NEW_CONNECTION",
            NetworkEventKind::ClosedConnection => "NET_CLOSED_CONNECTION",
            NetworkEventKind::NewListenPort => "NET_NEW_LISTEN_PORT",
            NetworkEventKind::ClosedListenPort => "NET_CLOSED_LISTEN_PORT",
            NetworkEventKind::SuspiciousRemote => "CONNECTION_SUSPICIOUS_REMOTE",
            NetworkEventKind::InterfaceStats => "NET_INTERFACE_STATS",
        }
    }
}

/// Event produced by the network diff collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEvent {
    pub kind: NetworkEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    pub protocol: Protocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laddr_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laddr_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raddr_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raddr_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub is_listen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Value>,
}

impl NetworkEvent {
    pub fn new(kind: NetworkEventKind, protocol: Protocol) -> Self {
        Self {
            kind,
            pid: None,
            process_name: None,
            protocol,
            laddr_ip: None,
            laddr_port: None,
            raddr_ip: None,
            raddr_port: None,
            status: None,
            is_listen: false,
            reason: None,
            description: None,
            snapshot: None,
        }
    }
}

/// One-, five- and fifteen-minute load averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CpuMetrics {
    pub percent: f32,
    pub per_cpu: Vec<f32>,
    pub load_average: LoadAverage,
    pub count_logical: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MemoryUsage {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub free: u64,
    pub percent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SwapUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MemoryMetrics {
    pub ram: MemoryUsage,
    pub swap: SwapUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskMetrics {
    pub mount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fstype: Option<String>,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f32,
}

/// Host-wide I/O counters, also reused per interface by the network probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NetIoCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errors_in: u64,
    pub errors_out: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SystemInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub boot_time: EpochSecs,
    pub uptime_seconds: u64,
}

/// Periodic host metric snapshot, stored whole as a structured blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricSnapshot {
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub disk: Vec<DiskMetrics>,
    pub network: NetIoCounters,
    pub system: SystemInfo,
}

impl MetricSnapshot {
    pub fn cpu_percent(&self) -> f32 {
        self.cpu.percent
    }

    pub fn ram_percent(&self) -> f32 {
        self.memory.ram.percent
    }
}

/// Payload variants of an [`Event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum EventPayload {
    Log(LogEvent),
    Process(ProcessEvent),
    Network(NetworkEvent),
    Metric(MetricSnapshot),
}

/// A single observation flowing through the pipeline.
///
/// The storage id is assigned by the writer at insert time and never
/// appears on the in-flight event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: EpochSecs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    pub fn new(timestamp: EpochSecs, payload: EventPayload) -> Self {
        Self {
            timestamp,
            raw: None,
            payload,
        }
    }

    /// Canonical type tag used for writer routing and rule indexing.
    pub fn type_tag(&self) -> &'static str {
        match &self.payload {
            EventPayload::Log(_) => "LOG_EVENT",
            EventPayload::Process(p) => p.kind.as_str(),
            EventPayload::Network(n) => n.kind.as_str(),
            EventPayload::Metric(_) => "METRIC_SNAPSHOT",
        }
    }

    pub fn as_log(&self) -> Option<&LogEvent> {
        match &self.payload {
            EventPayload::Log(ev) => Some(ev),
            _ => None,
        }
    }

    pub fn as_process(&self) -> Option<&ProcessEvent> {
        match &self.payload {
            EventPayload::Process(ev) => Some(ev),
            _ => None,
        }
    }

    pub fn as_network(&self) -> Option<&NetworkEvent> {
        match &self.payload {
            EventPayload::Network(ev) => Some(ev),
            _ => None,
        }
    }

    pub fn as_metric(&self) -> Option<&MetricSnapshot> {
        match &self.payload {
            EventPayload::Metric(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Short one-line summary for log output.
    pub fn log_summary(&self) -> String {
        let t = self.type_tag();
        match &self.payload {
            EventPayload::Log(ev) => match (&ev.ip, &ev.user) {
                (Some(ip), Some(user)) => {
                    format!("{t} {} user={user} ip={ip}", ev.event_type)
                }
                (Some(ip), None) => format!("{t} {} ip={ip}", ev.event_type),
                (None, Some(user)) => format!("{t} {} user={user}", ev.event_type),
                (None, None) => format!("{t} {}", ev.event_type),
            },
            EventPayload::Process(ev) => match &ev.name {
                Some(name) => format!("{t} pid={} name={name}", ev.pid),
                None => format!("{t} pid={}", ev.pid),
            },
            EventPayload::Network(ev) => {
                let local = match (&ev.laddr_ip, ev.laddr_port) {
                    (Some(ip), Some(port)) => format!("{ip}:{port}"),
                    _ => "-".to_string(),
                };
                let remote = match (&ev.raddr_ip, ev.raddr_port) {
                    (Some(ip), Some(port)) => format!("{ip}:{port}"),
                    _ => "-".to_string(),
                };
                format!("{t} {} {local} -> {remote}", ev.protocol)
            }
            EventPayload::Metric(snapshot) => format!(
                "{t} cpu={:.1}% ram={:.1}%",
                snapshot.cpu_percent(),
                snapshot.ram_percent()
            ),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
