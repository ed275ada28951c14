// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for `kiosk sync`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kiosk() -> Command {
    cargo_bin_cmd!("kiosk")
}

fn init_temp(server: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    kiosk().args(["init", "--server", server]).current_dir(temp.path()).assert().success();
    temp
}

fn submit_offline(temp: &TempDir, code: &str) {
    kiosk()
        .args(["submit", code, "--zone", "zone1", "--day", "2024-05-01", "--offline"])
        .current_dir(temp.path())
        .assert()
        .success();
}

/// Serves `count` check-in requests, answering success for every attendee
/// except `reject`.
fn serve(count: usize, reject: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming().take(count) {
            let mut stream = stream.unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();
            let body = String::from_utf8(body).unwrap();

            let answer = if body.contains(reject) {
                r#"{"success":false,"error":"attendee not found"}"#
            } else {
                r#"{"success":true,"message":"ok"}"#
            };
            write!(
                stream,
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                answer.len(),
                answer
            )
            .unwrap();
        }
    });
    format!("http://{}", addr)
}

fn pending(temp: &TempDir) -> String {
    let output = kiosk().arg("pending").current_dir(temp.path()).output().unwrap();
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn sync_with_empty_queue() {
    let temp = init_temp("http://127.0.0.1:9");
    kiosk()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to sync"));
}

#[test]
fn sync_against_unreachable_server_keeps_items() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let server = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let temp = init_temp(&server);
    submit_offline(&temp, "ATT-A");
    submit_offline(&temp, "ATT-B");

    kiosk()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("sync failed: check-in 1: server unreachable"));
    assert_eq!(pending(&temp), "2");

    kiosk()
        .arg("list")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("attempts 1"));
}

#[test]
fn sync_delivers_queue() {
    let server = serve(2, "never-rejected");
    let temp = init_temp(&server);
    submit_offline(&temp, "ATT-A");
    submit_offline(&temp, "ATT-B");

    kiosk()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("synced 2 check-in(s)"));
    assert_eq!(pending(&temp), "0");
}

#[test]
fn partial_sync_keeps_rejected_item() {
    let server = serve(3, "ATT-B");
    let temp = init_temp(&server);
    submit_offline(&temp, "ATT-A");
    submit_offline(&temp, "ATT-B");
    submit_offline(&temp, "ATT-C");

    kiosk()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("partially synced: 2 succeeded, 1 failed"))
        .stdout(predicate::str::contains("check-in 2: rejected: attendee not found"));
    assert_eq!(pending(&temp), "1");

    kiosk()
        .arg("list")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("#2  ATT-B"))
        .stdout(predicate::str::contains("rejected: attendee not found"));
}
