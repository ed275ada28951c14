// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for the `kiosk init` command.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kiosk() -> Command {
    cargo_bin_cmd!("kiosk")
}

#[test]
fn init_creates_kiosk_dir() {
    let temp = TempDir::new().unwrap();
    kiosk()
        .args(["init", "--server", "https://api.example.com"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized kiosk at"))
        .stdout(predicate::str::contains("Store: jsonl"));

    let config = std::fs::read_to_string(temp.path().join(".kiosk/config.toml")).unwrap();
    assert!(config.contains("base_url = \"https://api.example.com\""));
    assert!(temp.path().join(".kiosk/queue.jsonl").exists());
}

#[test]
fn init_with_sqlite_store() {
    let temp = TempDir::new().unwrap();
    kiosk()
        .args(["init", "--server", "https://api.example.com", "--store", "sqlite"])
        .current_dir(temp.path())
        .assert()
        .success();

    assert!(temp.path().join(".kiosk/queue.db").exists());
}

#[test]
fn init_twice_fails() {
    let temp = TempDir::new().unwrap();
    kiosk()
        .args(["init", "--server", "https://api.example.com"])
        .current_dir(temp.path())
        .assert()
        .success();

    kiosk()
        .args(["init", "--server", "https://api.example.com"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_rejects_url_without_scheme() {
    let temp = TempDir::new().unwrap();
    kiosk()
        .args(["init", "--server", "api.example.com"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with http:// or https://"));
}

#[test]
fn commands_require_init() {
    let temp = TempDir::new().unwrap();
    kiosk()
        .arg("pending")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("run 'kiosk init' first"));
}
