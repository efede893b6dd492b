// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `sendq status`: badge and coordinator visibility.

mod common;

use common::*;

#[test]
fn offline_badge_without_pending_records() {
    let state = TempDir::new().unwrap();

    sendq_offline(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("offline"))
        .stdout(predicate::str::contains("saved locally").not());
}

#[test]
fn badge_counts_pending_records() {
    let state = state_with_queued("monday");

    sendq_offline(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 saved locally"));
}

#[test]
fn status_reports_missing_coordinator() {
    let state = TempDir::new().unwrap();

    sendq_offline(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("coordinator: not running"));
}
