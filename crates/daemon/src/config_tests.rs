// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::io::Write;
use tempfile::tempdir;

#[test]
#[serial]
fn defaults_cover_the_stock_sources() {
    std::env::remove_var("VIGIL_STATE_DIR");
    let config = Config::load(None).unwrap();

    let sources = config.log_sources();
    assert_eq!(sources.len(), 5);
    assert!(sources
        .iter()
        .any(|s| s.source == LogSource::Auth && s.path == Path::new("/var/log/auth.log")));

    assert_eq!(config.intervals.metrics, 60);
    assert_eq!(config.intervals.log, 3);
    assert_eq!(config.writer.queue_capacity, 10_000);
    assert!(!config.process.hash_execs);
}

#[test]
#[serial]
fn file_overrides_defaults() {
    std::env::remove_var("VIGIL_STATE_DIR");
    let dir = tempdir().unwrap();
    let path = dir.path().join("vigil.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"
state_dir = "/tmp/vigil-test"

[intervals]
log = 1
metrics = 30

[process]
hash_execs = true

[network]
ignore_local = ["127.0.0.1:8080"]
watch_remotes = ["198.51.100.66"]

[writer]
queue_capacity = 512

[[log_files]]
source = "auth"
path = "/custom/auth.log"
"#
    )
    .unwrap();
    drop(f);

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.state_dir, Path::new("/tmp/vigil-test"));
    assert_eq!(config.intervals.log, 1);
    assert_eq!(config.intervals.metrics, 30);
    // Unspecified intervals keep their defaults
    assert_eq!(config.intervals.process, 15);
    assert!(config.process.hash_execs);
    assert_eq!(config.writer.queue_capacity, 512);
    assert_eq!(config.ignore_local_endpoints(), [("127.0.0.1".to_string(), 8080)]);

    let sources = config.log_sources();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].path, Path::new("/custom/auth.log"));
}

#[test]
#[serial]
fn env_var_overrides_state_dir() {
    std::env::set_var("VIGIL_STATE_DIR", "/tmp/vigil-env");
    let config = Config::load(None).unwrap();
    std::env::remove_var("VIGIL_STATE_DIR");

    assert_eq!(config.state_dir, Path::new("/tmp/vigil-env"));
    assert_eq!(config.db_path(), Path::new("/tmp/vigil-env/hids.db"));
    assert_eq!(config.offsets_path(), Path::new("/tmp/vigil-env/log_offsets.json"));
    assert_eq!(config.lock_path(), Path::new("/tmp/vigil-env/vigild.pid"));
}

#[test]
#[serial]
fn unknown_source_tags_are_skipped() {
    std::env::remove_var("VIGIL_STATE_DIR");
    let dir = tempdir().unwrap();
    let path = dir.path().join("vigil.toml");
    std::fs::write(
        &path,
        r#"
[[log_files]]
source = "auth"
path = "/var/log/auth.log"

[[log_files]]
source = "journal"
path = "/var/log/journal"
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.log_sources().len(), 1);
}

#[test]
#[serial]
fn malformed_ignore_endpoints_are_skipped() {
    std::env::remove_var("VIGIL_STATE_DIR");
    let dir = tempdir().unwrap();
    let path = dir.path().join("vigil.toml");
    std::fs::write(
        &path,
        r#"
[network]
ignore_local = ["127.0.0.1:8080", "no-port", "1.2.3.4:notaport"]
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.ignore_local_endpoints(), [("127.0.0.1".to_string(), 8080)]);
}

#[test]
#[serial]
fn unknown_toml_keys_are_rejected() {
    std::env::remove_var("VIGIL_STATE_DIR");
    let dir = tempdir().unwrap();
    let path = dir.path().join("vigil.toml");
    std::fs::write(&path, "no_such_key = true\n").unwrap();

    assert!(Config::load(Some(&path)).is_err());
}

#[test]
fn scheduler_config_converts_to_durations() {
    let config = Config::default();
    let scheduler = config.scheduler();
    assert_eq!(scheduler.log_interval, Duration::from_secs(3));
    assert_eq!(scheduler.metrics_interval, Duration::from_secs(60));
}
