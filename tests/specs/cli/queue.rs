// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for queueing check-ins: `submit`, `pending`, `list`, `clear`.

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

/// A server URL nothing listens on.
fn dead_server() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn init_temp(store: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    kiosk()
        .args(["init", "--server", &dead_server(), "--store", store])
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

fn submit_offline(temp: &TempDir, code: &str) {
    kiosk()
        .args(["submit", code, "--zone", "zone1", "--day", "2024-05-01", "--offline"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("queued #"))
        .stdout(predicate::str::contains("(offline)"));
}

fn pending(temp: &TempDir) -> String {
    let output = kiosk().arg("pending").current_dir(temp.path()).output().unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn empty_queue_has_zero_pending() {
    let temp = init_temp("jsonl");
    assert_eq!(pending(&temp), "0");
    kiosk()
        .arg("list")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending check-ins"));
}

#[test]
fn offline_submits_are_all_counted() {
    for store in ["jsonl", "sqlite"] {
        let temp = init_temp(store);
        for i in 0..5 {
            submit_offline(&temp, &format!("ATT-{}", i));
        }
        assert_eq!(pending(&temp), "5", "store {}", store);
    }
}

#[test]
fn online_submit_to_unreachable_server_is_queued() {
    let temp = init_temp("jsonl");
    std::fs::write(
        temp.path().join(".kiosk/config.toml"),
        format!(
            "[server]\nbase_url = \"{}\"\n\n[connectivity]\nkind = \"always_online\"\n",
            dead_server()
        ),
    )
    .unwrap();

    kiosk()
        .args(["submit", "ATT-1", "--zone", "zone1", "--day", "2024-05-01"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("queued #1 (saved offline: server unreachable"));
    assert_eq!(pending(&temp), "1");
}

#[test]
fn tcp_probe_sees_dead_server_as_offline() {
    let temp = init_temp("jsonl");
    kiosk()
        .args(["submit", "ATT-1", "--zone", "zone1", "--day", "2024-05-01"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("queued #1 (offline)"));
}

#[test]
fn invalid_day_is_rejected_before_queueing() {
    let temp = init_temp("jsonl");
    kiosk()
        .args(["submit", "ATT-1", "--zone", "zone1", "--day", "2024-02-30", "--offline"])
        .current_dir(temp.path())
        .assert()
        .failure();
    assert_eq!(pending(&temp), "0");
}

#[test]
fn list_shows_queued_items() {
    let temp = init_temp("jsonl");
    submit_offline(&temp, "ATT-A");
    submit_offline(&temp, "ATT-B");

    kiosk()
        .arg("list")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("#1  ATT-A  zone1  2024-05-01"))
        .stdout(predicate::str::contains("#2  ATT-B  zone1  2024-05-01"));
}

#[test]
fn list_json() {
    let temp = init_temp("sqlite");
    submit_offline(&temp, "ATT-A");

    let output = kiosk().args(["list", "-o", "json"]).current_dir(temp.path()).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["count"], 1);
    assert_eq!(value["pending"][0]["attendee_code"], "ATT-A");
    assert_eq!(value["pending"][0]["event_day"], "2024-05-01");
}

#[test]
fn clear_needs_yes() {
    let temp = init_temp("jsonl");
    submit_offline(&temp, "ATT-A");
    submit_offline(&temp, "ATT-B");

    kiosk()
        .arg("clear")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    assert_eq!(pending(&temp), "2");

    kiosk()
        .args(["clear", "--yes"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 pending check-in(s)"));
    assert_eq!(pending(&temp), "0");
}

#[test]
fn ids_are_not_reused_after_clear() {
    let temp = init_temp("jsonl");
    submit_offline(&temp, "ATT-A");
    kiosk().args(["clear", "--yes"]).current_dir(temp.path()).assert().success();

    kiosk()
        .args(["submit", "ATT-B", "--zone", "zone1", "--day", "2024-05-01", "--offline"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("queued #2"));
}

#[test]
fn works_from_subdirectory() {
    let temp = init_temp("jsonl");
    let nested = temp.path().join("a/b");
    std::fs::create_dir_all(&nested).unwrap();

    kiosk()
        .args(["submit", "ATT-A", "--zone", "zone1", "--day", "2024-05-01", "--offline"])
        .current_dir(&nested)
        .assert()
        .success();
    assert_eq!(pending(&temp), "1");
}
