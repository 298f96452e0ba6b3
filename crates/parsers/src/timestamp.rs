// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp extraction from log lines.
//!
//! Two families are tolerated: ISO-8601 (journald, dpkg) and classic
//! syslog `Mon DD HH:MM:SS` where the year is assumed current. Naive
//! timestamps are interpreted in the local timezone, matching what the
//! syslog daemons on the monitored host write.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use vigil_core::EpochSecs;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Extract the leading timestamp of a log line, if any.
pub fn parse_line_timestamp(line: &str) -> Option<EpochSecs> {
    let line = line.trim_start();
    let first_char = line.chars().next()?;

    if first_char.is_ascii_digit() {
        return parse_iso(line);
    }
    parse_syslog(line)
}

/// True when the line opens with a recognized timestamp (either family).
pub fn has_leading_timestamp(line: &str) -> bool {
    parse_line_timestamp(line).is_some()
}

fn parse_iso(line: &str) -> Option<EpochSecs> {
    let mut parts = line.split_whitespace();
    let first = parts.next()?;

    if first.contains('T') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(first) {
            return Some(dt.timestamp());
        }
        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(first, format) {
                return local_epoch(naive);
            }
        }
        return None;
    }

    let second = parts.next()?;
    let combined = format!("{first} {second}");
    let naive = NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M:%S").ok()?;
    local_epoch(naive)
}

fn parse_syslog(line: &str) -> Option<EpochSecs> {
    let month_str = line.get(..3)?;
    let month = MONTHS.iter().position(|m| *m == month_str)? as u32 + 1;

    let day: u32 = line.get(4..6)?.trim().parse().ok()?;
    let time = NaiveTime::parse_from_str(line.get(7..15)?, "%H:%M:%S").ok()?;

    let year = Local::now().year();
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_time(time);
    local_epoch(naive)
}

fn local_epoch(naive: NaiveDateTime) -> Option<EpochSecs> {
    // DST gaps have no single mapping; take the earliest valid instant.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

#[cfg(test)]
#[path = "timestamp_tests.rs"]
mod tests;
