// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use clap::CommandFactory;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn submit_requires_at_least_one_field() {
    let result = Cli::try_parse_from(["sendq", "submit", "monday"]);
    assert!(result.is_err());
}

#[test]
fn submit_parses_target_and_fields() {
    let cli = Cli::try_parse_from(["sendq", "submit", "monday", "status=present", "note=x"])
        .unwrap();
    match cli.command {
        Command::Submit { target, fields } => {
            assert_eq!(target, "monday");
            assert_eq!(fields, vec!["status=present", "note=x"]);
        }
        _ => panic!("expected submit"),
    }
}

#[test]
fn global_flags_apply_after_subcommand() {
    let cli = Cli::try_parse_from([
        "sendq",
        "status",
        "--state-dir",
        "/tmp/sq",
        "--assume-offline",
    ])
    .unwrap();
    assert_eq!(cli.state_dir.as_deref(), Some("/tmp/sq"));
    assert!(cli.assume_offline);
}

#[test]
fn empty_target_is_rejected() {
    let result = Cli::try_parse_from(["sendq", "submit", "  ", "status=present"]);
    assert!(result.is_err());
}
