// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn ordering_is_low_to_critical() {
    assert!(Severity::Low < Severity::Medium);
    assert!(Severity::Medium < Severity::High);
    assert!(Severity::High < Severity::Critical);
}

#[parameterized(
    low = { "LOW", Severity::Low },
    medium = { "MEDIUM", Severity::Medium },
    high = { "HIGH", Severity::High },
    critical = { "CRITICAL", Severity::Critical },
    lowercase = { "high", Severity::High },
)]
fn parses_from_str(input: &str, expected: Severity) {
    assert_eq!(input.parse::<Severity>().unwrap(), expected);
}

#[test]
fn rejects_unknown() {
    assert!("URGENT".parse::<Severity>().is_err());
}

#[test]
fn serde_uses_screaming_snake_case() {
    let json = serde_json::to_string(&Severity::Critical).unwrap();
    assert_eq!(json, "\"CRITICAL\"");
    let back: Severity = serde_json::from_str("\"MEDIUM\"").unwrap();
    assert_eq!(back, Severity::Medium);
}

#[test]
fn display_round_trips() {
    for sev in [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ] {
        assert_eq!(sev.to_string().parse::<Severity>().unwrap(), sev);
    }
}
