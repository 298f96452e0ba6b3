// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::LineParser;
use yare::parameterized;

fn parser() -> AuthParser {
    AuthParser::new()
}

#[parameterized(
    failed_password = { "Dec  4 12:00:01 h sshd[111]: Failed password for admin from 10.0.0.9 port 2200 ssh2", "FAILED_LOGIN" },
    failed_invalid = { "Dec  4 12:00:01 h sshd[111]: Failed password for invalid user oracle from 10.0.0.9 port 2200 ssh2", "FAILED_LOGIN" },
    accepted_password = { "Dec  4 12:00:05 h sshd[222]: Accepted password for ubuntu from 192.168.1.7 port 50000 ssh2", "SUCCESS_LOGIN" },
    accepted_publickey = { "Dec  4 12:00:05 h sshd[222]: Accepted publickey for root from 192.168.1.7 port 50000 ssh2", "SUCCESS_LOGIN" },
    pam_failure = { "Dec  4 12:01:00 h sshd[333]: pam_unix(sshd:auth): authentication failure; logname= uid=0 euid=0 tty=ssh ruser= rhost=10.0.0.9 user=root", "FAILED_AUTH" },
    sudo_failure = { "Dec  4 12:01:00 h sudo: pam_unix(sudo:auth): authentication failure; logname=ubuntu uid=1000 euid=0 tty=/dev/pts/0 ruser=ubuntu rhost= user=ubuntu", "SUDO_FAILED" },
    sudo_open = { "Dec  4 12:02:00 h sudo: pam_unix(sudo:session): session opened for user root(uid=0) by ubuntu(uid=1000)", "SUDO_SESSION_OPEN" },
    sudo_close = { "Dec  4 12:02:05 h sudo: pam_unix(sudo:session): session closed for user root", "SUDO_SESSION_CLOSE" },
    session_open = { "Dec  4 12:03:00 h sshd[444]: pam_unix(sshd:session): session opened for user ubuntu(uid=1000) by (uid=0)", "SESSION_OPEN" },
    session_close = { "Dec  4 12:03:30 h sshd[444]: pam_unix(sshd:session): session closed for user ubuntu", "SESSION_CLOSE" },
    generic = { "Dec  4 12:04:00 h sshd[555]: Connection closed by authenticating user git 10.1.1.1 port 4000", "AUTH_EVENT" },
)]
fn detects_event_types(line: &str, expected: &str) {
    let parsed = parser().parse(line).unwrap();
    assert_eq!(parsed.event.event_type, expected);
}

#[test]
fn extracts_user_ip_pid_method() {
    let line = "Dec  4 12:00:01 h sshd[111]: Failed password for admin from 10.0.0.9 port 2200 ssh2";
    let parsed = parser().parse(line).unwrap();

    assert_eq!(parsed.event.user.as_deref(), Some("admin"));
    assert_eq!(parsed.event.ip.as_deref(), Some("10.0.0.9"));
    assert_eq!(parsed.event.process.as_deref(), Some("sshd"));

    let extra = parsed.event.extra.unwrap();
    assert_eq!(extra["pid"], 111);
    assert_eq!(extra["method"], "password");
}

#[test]
fn invalid_user_placeholder_extracts_real_name() {
    let line =
        "Dec  4 12:00:01 h sshd[111]: Failed password for invalid user oracle from 10.0.0.9 port 2200 ssh2";
    let parsed = parser().parse(line).unwrap();
    assert_eq!(parsed.event.user.as_deref(), Some("oracle"));
}

#[test]
fn session_user_strips_uid_suffix() {
    let line =
        "Dec  4 12:02:00 h sudo: pam_unix(sudo:session): session opened for user root(uid=0) by ubuntu(uid=1000)";
    let parsed = parser().parse(line).unwrap();
    assert_eq!(parsed.event.user.as_deref(), Some("root"));
}

#[parameterized(
    failed_login = { "Dec  4 12:00:01 h sshd[1]: Failed password for admin from 10.0.0.9 port 22 ssh2", Severity::Medium },
    root_login = { "Dec  4 12:00:01 h sshd[1]: Accepted password for root from 10.0.0.9 port 22 ssh2", Severity::High },
    normal_login = { "Dec  4 12:00:01 h sshd[1]: Accepted password for ubuntu from 10.0.0.9 port 22 ssh2", Severity::Low },
    sudo_open = { "Dec  4 12:00:01 h sudo: pam_unix(sudo:session): session opened for user root(uid=0) by x(uid=1000)", Severity::High },
    session_close = { "Dec  4 12:00:01 h sshd[1]: pam_unix(sshd:session): session closed for user ubuntu", Severity::Low },
)]
fn severity_map(line: &str, expected: Severity) {
    let parsed = parser().parse(line).unwrap();
    assert_eq!(parsed.event.severity, expected);
}

#[test]
fn match_requires_auth_keywords() {
    let p = parser();
    assert!(p.matches("Dec  4 12:00:01 h sshd[1]: anything"));
    assert!(p.matches("Dec  4 12:00:01 h sudo: anything"));
    assert!(!p.matches("Dec  4 12:00:01 h cron[1]: job started"));
    assert!(!p.matches(""));
}

#[test]
fn category_and_source_are_fixed() {
    let parsed = parser()
        .parse("Dec  4 12:00:01 h sshd[1]: Failed password for a from 10.0.0.9 port 22 ssh2")
        .unwrap();
    assert_eq!(parsed.event.category, LogCategory::Auth);
    assert_eq!(parsed.event.log_source, LogSource::Auth);
    assert!(parsed.timestamp.is_some());
}
