// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sqrs - An offline-first submission client library.
//!
//! This crate provides the functionality for the `sendq` CLI tool: the
//! submission intercept, the sync engine that drains the offline queue, and
//! the integration with the `sendqd` background coordinator.
//!
//! # Main Components
//!
//! - [`sync::SyncEngine`] - single-flight drains of the submission queue
//! - [`sync::Transport`] - injectable delivery layer (HTTP in production)
//! - [`Config`] - client configuration (server URL, targets, cadences)
//! - [`daemon`] - coordinator client and process lifecycle
//! - [`Error`] - error types for all operations

mod cli;
mod commands;
mod daemon;
pub mod notify;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, DaemonCommand};
pub use config::{state_dir, Config};
pub use error::{Error, Result};

use clap::CommandFactory;
use clap_complete::generate;

/// Execute a parsed CLI invocation. This is the main entry point for library
/// users and provides a testable way to run commands without process
/// execution.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = commands::Ctx::resolve(cli.state_dir, cli.assume_offline)?;

    match cli.command {
        Command::Init { server_url } => commands::init(ctx, server_url),
        Command::Submit { target, fields } => commands::submit(ctx, target, fields),
        Command::Status => commands::status(ctx),
        Command::Sync { broadcast } => commands::sync(ctx, broadcast),
        Command::Compact => commands::compact(ctx),
        Command::Watch { interval } => commands::watch(ctx, interval),
        Command::Daemon(DaemonCommand::Start) => commands::daemon_start(ctx),
        Command::Daemon(DaemonCommand::Stop) => commands::daemon_stop(ctx),
        Command::Daemon(DaemonCommand::Status) => commands::daemon_status(ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}
