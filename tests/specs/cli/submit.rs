// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `sendq submit` in its offline-intercept role.

mod common;

use common::*;

#[test]
fn offline_submit_is_saved_locally() {
    let state = TempDir::new().unwrap();

    sendq_offline(&state)
        .arg("submit")
        .arg("monday")
        .arg("status=present")
        .assert()
        .success()
        .stdout(predicate::str::contains("saved offline"))
        .stdout(predicate::str::contains("1 saved locally"));
}

#[test]
fn offline_submissions_accumulate() {
    let state = state_with_queued("monday");

    sendq_offline(&state)
        .arg("submit")
        .arg("tuesday")
        .arg("status=late")
        .arg("note=bus delay")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 saved locally"));
}

#[test]
fn malformed_field_is_rejected_with_hint() {
    let state = TempDir::new().unwrap();

    sendq_offline(&state)
        .arg("submit")
        .arg("monday")
        .arg("present")
        .assert()
        .failure()
        .stderr(predicate::str::contains("name=value"));
}

#[test]
fn submit_without_fields_is_a_usage_error() {
    let state = TempDir::new().unwrap();

    sendq_offline(&state)
        .arg("submit")
        .arg("monday")
        .assert()
        .failure();
}

#[test]
fn queue_survives_across_invocations() {
    let state = state_with_queued("monday");

    // A separate process sees the same record
    sendq_offline(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 saved locally"));
}
