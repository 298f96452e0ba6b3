// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn unknown_source_defaults_to_zero() {
    let dir = tempdir().unwrap();
    let store = OffsetStore::load(dir.path().join("log_offsets.json")).unwrap();
    assert_eq!(store.get("auth"), 0);
}

#[test]
fn set_save_reload_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log_offsets.json");

    let store = OffsetStore::load(&path).unwrap();
    store.set("auth", 4096);
    store.set("syslog", 100);
    store.save().unwrap();

    let reloaded = OffsetStore::load(&path).unwrap();
    assert_eq!(reloaded.get("auth"), 4096);
    assert_eq!(reloaded.get("syslog"), 100);
}

#[test]
fn set_without_save_is_not_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log_offsets.json");

    let store = OffsetStore::load(&path).unwrap();
    store.set("auth", 4096);
    drop(store);

    let reloaded = OffsetStore::load(&path).unwrap();
    assert_eq!(reloaded.get("auth"), 0);
}

#[test]
fn reset_zeroes_one_source_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log_offsets.json");

    let store = OffsetStore::load(&path).unwrap();
    store.set("auth", 4096);
    store.set("syslog", 100);
    store.reset("auth").unwrap();

    let reloaded = OffsetStore::load(&path).unwrap();
    assert_eq!(reloaded.get("auth"), 0);
    assert_eq!(reloaded.get("syslog"), 100);
}

#[test]
fn reset_all_clears_everything() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log_offsets.json");

    let store = OffsetStore::load(&path).unwrap();
    store.set("auth", 4096);
    store.reset_all().unwrap();

    let reloaded = OffsetStore::load(&path).unwrap();
    assert_eq!(reloaded.get("auth"), 0);
}

#[test]
fn corrupt_offset_file_becomes_empty_mapping() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log_offsets.json");

    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(b"{not json").unwrap();
    drop(f);

    let store = OffsetStore::load(&path).unwrap();
    assert_eq!(store.get("auth"), 0);
    assert!(path.with_extension("bak").exists());
}
