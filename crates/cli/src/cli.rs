// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line interface definition.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::notify;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser)]
#[command(name = "sendq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "An offline-first submission client with background sync")]
#[command(
    long_about = "An offline-first submission client.\n\n\
    Submissions made while the server is unreachable are queued locally and \
    replayed when the connection is restored, by a foreground watch loop or \
    on a wake from the sendqd coordinator."
)]
#[command(styles = notify::styles())]
pub struct Cli {
    /// Use <path> as the state directory (queue, config, coordinator files)
    #[arg(long = "state-dir", global = true, value_name = "path")]
    pub state_dir: Option<String>,

    /// Treat connectivity as offline regardless of server reachability
    #[arg(long = "assume-offline", global = true)]
    pub assume_offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a fresh config.toml into the state directory
    Init {
        /// Server base URL to record in the config
        #[arg(long, value_parser = non_empty_string)]
        server_url: Option<String>,
    },

    /// Submit form fields to a target plan, queueing offline
    #[command(after_help = notify::examples("\
Examples:
  sendq submit monday status=present          Deliver now, or queue if offline
  sendq submit monday status=late note=bus    Multiple fields, in order
  sendq submit someday status=present         Unknown targets use the default route"))]
    Submit {
        /// Target plan (e.g. monday); unknown targets fall back to the default route
        #[arg(value_parser = non_empty_string)]
        target: String,

        /// Form fields as name=value pairs, in submission order
        #[arg(required = true, value_name = "name=value")]
        fields: Vec<String>,
    },

    /// Show the connectivity badge, pending count, and coordinator state
    Status,

    /// Drain the queue now
    #[command(after_help = notify::examples("\
Examples:
  sendq sync               Drain the local queue against the server
  sendq sync --broadcast   Ask the coordinator to wake every watcher instead"))]
    Sync {
        /// Ask the coordinator to broadcast a sync request to all watchers
        /// instead of draining locally
        #[arg(long)]
        broadcast: bool,
    },

    /// Drop synced records from the queue
    Compact,

    /// Run the foreground sync loop: periodic drains, connectivity
    /// transitions, coordinator wakes
    Watch {
        /// Periodic drain cadence in seconds (default from config)
        #[arg(long, value_name = "secs")]
        interval: Option<u64>,
    },

    /// Manage the sendqd coordinator
    #[command(subcommand)]
    Daemon(DaemonCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the coordinator for this state directory
    Start,
    /// Stop the coordinator
    Stop,
    /// Show coordinator status
    Status,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
