// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference lists shared by parsers and rules

/// Offensive tooling flagged on package install and process start.
pub const HACKING_TOOLS: &[&str] = &[
    "nmap",
    "masscan",
    "zmap",
    "nikto",
    "hydra",
    "medusa",
    "john",
    "hashcat",
    "sqlmap",
    "metasploit",
    "msfconsole",
    "msfvenom",
    "nc",
    "ncat",
    "netcat",
    "socat",
    "aircrack-ng",
    "wpscan",
    "gobuster",
    "dirb",
    "responder",
    "mimikatz",
];

/// Paths whose appearance in a command line is worth an alert.
///
/// Globs are matched by substring after stripping the `*`. The agent's
/// own config and state locations are included so tampering with the
/// monitor itself raises an alert.
pub const SENSITIVE_FILES: &[&str] = &[
    "/etc/shadow",
    "/etc/sudoers",
    "/etc/passwd",
    "/root/.ssh/authorized_keys",
    "/home/*/.ssh/authorized_keys",
    "/etc/ssh/sshd_config",
    "/etc/vigil",
    "/var/lib/vigil",
    "/etc/crontab",
];

/// Processes allowed to touch sensitive files without raising an alert.
pub const SENSITIVE_ACCESS_WHITELIST: &[&str] = &["sshd", "login", "passwd", "chfn", "chsh"];

/// Interactive shells watched for suspicious parentage.
pub const SHELL_PROCESSES: &[&str] = &["sh", "bash", "zsh", "dash", "rbash"];

/// Parents that should not be spawning interactive shells.
pub const SUSPICIOUS_SHELL_PARENTS: &[&str] = &[
    "python", "php", "node", "perl", "nc", "netcat", "socat", "lua",
];

/// Tools used to clear logs or shell history.
pub const LOG_CLEARING_TOOLS: &[&str] = &["rm", "truncate", "shred"];

/// Log and history paths whose removal suggests track covering.
pub const LOG_CLEARING_TARGETS: &[&str] = &[
    "/var/log/auth",
    "/var/log/syslog",
    "/var/log/messages",
    "/var/log/kern",
    "/var/log/vigil",
    ".bash_history",
    ".zsh_history",
];

/// Cron locations watched for persistence attempts.
pub const CRON_TARGETS: &[&str] = &["/etc/cron", "/var/spool/cron", "crontab"];

/// Case-insensitive membership test used by rules on normalized names.
pub fn contains(list: &[&str], candidate: &str) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(candidate))
}
