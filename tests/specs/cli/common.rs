// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test files,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn sendq() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("sendq").unwrap()
}

/// A sendq command pinned to the given state dir, with connectivity forced
/// offline so specs never touch the network.
pub fn sendq_offline(state: &TempDir) -> Command {
    let mut cmd = sendq();
    cmd.arg("--state-dir")
        .arg(state.path())
        .arg("--assume-offline")
        .env_remove("SENDQ_STATE_DIR");
    cmd
}

/// Queue one offline submission for `target` and return the state dir.
pub fn state_with_queued(target: &str) -> TempDir {
    let state = TempDir::new().unwrap();
    sendq_offline(&state)
        .arg("submit")
        .arg(target)
        .arg("status=present")
        .assert()
        .success();
    state
}
