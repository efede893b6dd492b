// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn parse_state_dir_honors_flag() {
    let args: Vec<String> = ["sendqd", "--state-dir", "/tmp/sendq-test"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(parse_state_dir(&args), PathBuf::from("/tmp/sendq-test"));
}

#[test]
fn parse_server_url_honors_flag() {
    let args: Vec<String> = ["sendqd", "--server-url", "http://example.test:9000"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(parse_server_url(&args), "http://example.test:9000");
}

#[test]
fn probe_addr_keeps_explicit_port() {
    assert_eq!(probe_addr("http://localhost:8000"), "localhost:8000");
    assert_eq!(probe_addr("http://localhost:8000/app"), "localhost:8000");
}

#[test]
fn probe_addr_defaults_scheme_port() {
    assert_eq!(probe_addr("http://example.test"), "example.test:80");
    assert_eq!(probe_addr("https://example.test"), "example.test:443");
    assert_eq!(probe_addr("https://example.test/base/path"), "example.test:443");
}
