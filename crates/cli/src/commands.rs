// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query subcommands and their output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use vigil_core::{EpochSecs, LogCategory, LogSource, Protocol, Severity};
use vigil_storage::{AlertQuery, EventQuery, Store};

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Filter by severity (LOW, MEDIUM, HIGH, CRITICAL)
    #[arg(long)]
    pub severity: Option<Severity>,
    /// Filter by log source (auth, syslog, kernel, dpkg, ufw)
    #[arg(long)]
    pub source: Option<String>,
    /// Filter by category (AUTH, SYSTEM, KERNEL, PACKAGE, FIREWALL)
    #[arg(long)]
    pub category: Option<String>,
    /// Filter by event type (e.g. FAILED_LOGIN)
    #[arg(long = "type")]
    pub event_type: Option<String>,
    /// Substring search on the message
    #[arg(long)]
    pub search: Option<String>,
    /// Filter by source IP address
    #[arg(long)]
    pub ip: Option<String>,
    #[arg(long, default_value_t = 50)]
    pub limit: u32,
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Debug, Args)]
pub struct ProcessesArgs {
    /// Filter by event type (e.g. PROCESS_NEW)
    #[arg(long = "type")]
    pub event_type: Option<String>,
    /// Filter by pid
    #[arg(long)]
    pub pid: Option<i64>,
    /// Substring search on the command line
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, default_value_t = 50)]
    pub limit: u32,
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Debug, Args)]
pub struct NetworkArgs {
    /// Filter by event type (e.g. NET_NEW_CONNECTION)
    #[arg(long = "type")]
    pub event_type: Option<String>,
    /// Filter by pid
    #[arg(long)]
    pub pid: Option<i64>,
    /// Filter by protocol (tcp, udp)
    #[arg(long)]
    pub protocol: Option<String>,
    /// Filter by local or remote IP address
    #[arg(long)]
    pub ip: Option<String>,
    #[arg(long, default_value_t = 50)]
    pub limit: u32,
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Debug, Args)]
pub struct AlertsArgs {
    /// Filter by rule name (e.g. AUTH_001)
    #[arg(long)]
    pub rule: Option<String>,
    /// Filter by severity
    #[arg(long)]
    pub severity: Option<Severity>,
    /// Include the linked evidence rows
    #[arg(long)]
    pub expand: bool,
    #[arg(long, default_value_t = 50)]
    pub limit: u32,
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

/// Render an epoch timestamp for terminal output.
fn format_ts(ts: EpochSecs) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn parse_source(value: &Option<String>) -> Option<LogSource> {
    value.as_deref().and_then(LogSource::parse)
}

fn parse_category(value: &Option<String>) -> Option<LogCategory> {
    match value.as_deref().map(str::to_ascii_uppercase).as_deref() {
        Some("AUTH") => Some(LogCategory::Auth),
        Some("SYSTEM") => Some(LogCategory::System),
        Some("KERNEL") => Some(LogCategory::Kernel),
        Some("PACKAGE") => Some(LogCategory::Package),
        Some("FIREWALL") => Some(LogCategory::Firewall),
        _ => None,
    }
}

fn parse_protocol(value: &Option<String>) -> Option<Protocol> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("tcp") => Some(Protocol::Tcp),
        Some("udp") => Some(Protocol::Udp),
        _ => None,
    }
}

pub fn events(store: &Store, args: &EventsArgs, json: bool) -> Result<()> {
    let query = EventQuery {
        severity: args.severity,
        source: parse_source(&args.source),
        category: parse_category(&args.category),
        event_type: args.event_type.clone(),
        search: args.search.clone(),
        ip: args.ip.clone(),
        limit: Some(args.limit),
        offset: Some(args.offset),
        ..Default::default()
    };
    let rows = store.log_events(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in rows {
        println!(
            "{} [{:8}] {:20} {:16} {}",
            format_ts(row.timestamp),
            row.severity,
            row.event_type,
            row.ip_address.as_deref().unwrap_or("-"),
            row.message
        );
    }
    Ok(())
}

pub fn processes(store: &Store, args: &ProcessesArgs, json: bool) -> Result<()> {
    let query = EventQuery {
        event_type: args.event_type.clone(),
        pid: args.pid,
        search: args.search.clone(),
        limit: Some(args.limit),
        offset: Some(args.offset),
        ..Default::default()
    };
    let rows = store.process_events(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in rows {
        println!(
            "{} {:26} pid={:<7} {:12} {}",
            format_ts(row.timestamp),
            row.event_type,
            row.pid.unwrap_or(-1),
            row.username.as_deref().unwrap_or("-"),
            row.cmdline
                .as_deref()
                .filter(|cmdline| !cmdline.is_empty())
                .or(row.process_name.as_deref())
                .unwrap_or("-")
        );
    }
    Ok(())
}

pub fn network(store: &Store, args: &NetworkArgs, json: bool) -> Result<()> {
    let query = EventQuery {
        event_type: args.event_type.clone(),
        pid: args.pid,
        protocol: parse_protocol(&args.protocol),
        ip: args.ip.clone(),
        limit: Some(args.limit),
        offset: Some(args.offset),
        ..Default::default()
    };
    let rows = store.network_events(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in rows {
        let local = match (&row.laddr_ip, row.laddr_port) {
            (Some(ip), Some(port)) => format!("{ip}:{port}"),
            _ => "-".to_string(),
        };
        let remote = match (&row.raddr_ip, row.raddr_port) {
            (Some(ip), Some(port)) => format!("{ip}:{port}"),
            _ => "-".to_string(),
        };
        println!(
            "{} {:28} {:4} {:22} -> {:22} {}",
            format_ts(row.timestamp),
            row.event_type,
            row.protocol.as_deref().unwrap_or("-"),
            local,
            remote,
            row.process_name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn alerts(store: &Store, args: &AlertsArgs, json: bool) -> Result<()> {
    let query = AlertQuery {
        rule_name: args.rule.clone(),
        severity: args.severity,
        limit: Some(args.limit),
        offset: Some(args.offset),
        expand: args.expand,
    };
    let rows = store.alerts(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in rows {
        println!(
            "{} [{:8}] {:10} {}",
            format_ts(row.alert.timestamp),
            row.alert.severity,
            row.alert.rule_name,
            row.alert.message
        );
        for evidence in row.evidence {
            println!(
                "    #{} {:8} {} event_id={}",
                evidence.sequence.unwrap_or_default(),
                evidence.role,
                evidence.event_type,
                evidence.event_id
            );
        }
    }
    Ok(())
}

pub fn status(store: &Store, json: bool) -> Result<()> {
    let counts = store.counts()?;
    let latest = store.latest_event_timestamp()?;

    if json {
        let value = serde_json::json!({
            "counts": counts,
            "latest_event_timestamp": latest,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("log_events:     {}", counts.log_events);
    println!("process_events: {}", counts.process_events);
    println!("network_events: {}", counts.network_events);
    println!("metrics:        {}", counts.metrics);
    println!("alerts:         {}", counts.alerts);
    match latest {
        Some(ts) => println!("latest event:   {}", format_ts(ts)),
        None => println!("latest event:   none"),
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
