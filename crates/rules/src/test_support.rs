// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event builders shared by the rule tests.

#![allow(clippy::panic)]

use vigil_core::{
    EpochSecs, Event, EventPayload, LogCategory, LogEvent, LogSource, MetricSnapshot,
    ProcessEvent, ProcessEventKind, Severity,
};

pub fn auth_log(ts: EpochSecs, event_type: &str, ip: &str, user: &str) -> Event {
    Event::new(
        ts,
        EventPayload::Log(LogEvent {
            log_source: LogSource::Auth,
            event_type: event_type.to_string(),
            category: LogCategory::Auth,
            severity: Severity::Medium,
            message: format!("{event_type} for {user} from {ip} port 2200 ssh2"),
            user: Some(user.to_string()),
            ip: Some(ip.to_string()),
            process: Some("sshd".to_string()),
            extra: None,
        }),
    )
}

pub fn syslog(ts: EpochSecs, message: &str) -> Event {
    Event::new(
        ts,
        EventPayload::Log(LogEvent {
            log_source: LogSource::Syslog,
            event_type: "SYS_EVENT".to_string(),
            category: LogCategory::System,
            severity: Severity::Low,
            message: message.to_string(),
            user: None,
            ip: None,
            process: None,
            extra: None,
        }),
    )
}

pub fn process_new(ts: EpochSecs, pid: i32, name: &str) -> Event {
    let mut ev = ProcessEvent::new(ProcessEventKind::New, pid);
    ev.name = Some(name.to_string());
    ev.username = Some("ubuntu".to_string());
    Event::new(ts, EventPayload::Process(ev))
}

pub fn process_payload(event: &mut Event) -> &mut ProcessEvent {
    match &mut event.payload {
        EventPayload::Process(ev) => ev,
        _ => panic!("not a process event"),
    }
}

pub fn metric(ts: EpochSecs, cpu_percent: f32, ram_percent: f32) -> Event {
    let mut snapshot = MetricSnapshot::default();
    snapshot.cpu.percent = cpu_percent;
    snapshot.memory.ram.percent = ram_percent;
    Event::new(ts, EventPayload::Metric(snapshot))
}
