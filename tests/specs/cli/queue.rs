// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for queue maintenance: offline sync no-op and compaction.

mod common;

use common::*;

#[test]
fn sync_while_offline_is_a_noop() {
    let state = state_with_queued("monday");

    sendq_offline(&state)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("offline"));

    // The record is still pending
    sendq_offline(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 saved locally"));
}

#[test]
fn sync_offline_with_empty_queue_still_skips() {
    let state = TempDir::new().unwrap();

    // The offline guard comes before the empty-batch check
    sendq_offline(&state)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("offline"));
}

#[test]
fn compact_keeps_pending_records() {
    let state = state_with_queued("monday");

    sendq_offline(&state)
        .arg("compact")
        .assert()
        .success()
        .stdout(predicate::str::contains("dropped 0 synced record(s), 1 pending kept"));

    sendq_offline(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 saved locally"));
}

#[test]
fn broadcast_sync_without_coordinator_fails_with_hint() {
    let state = TempDir::new().unwrap();

    sendq_offline(&state)
        .arg("sync")
        .arg("--broadcast")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sendq daemon start"));
}
