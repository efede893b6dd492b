// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable access for the coordinator.

use std::path::PathBuf;

/// Environment variable name constants, generated at build time so the docs
/// and the strings cannot drift apart.
pub mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

/// State directory override from `SENDQ_STATE_DIR`, if set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(names::SENDQ_STATE_DIR).ok().map(PathBuf::from)
}

/// XDG state home from `XDG_STATE_HOME`, if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(names::XDG_STATE_HOME).ok().map(PathBuf::from)
}

/// Server base URL override from `SENDQ_SERVER_URL`, if set.
pub fn server_url() -> Option<String> {
    std::env::var(names::SENDQ_SERVER_URL).ok()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
