// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the sqrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid field argument: '{0}'\n  hint: fields are given as name=value, e.g. status=present")]
    InvalidFieldArg(String),

    #[error("no fields given\n  hint: pass at least one name=value pair")]
    NoFields,

    #[error("coordinator error: {0}")]
    Coordinator(String),

    #[error("coordinator is not running\n  hint: start it with 'sendq daemon start'")]
    CoordinatorNotRunning,

    #[error("config error: {0}")]
    Config(String),

    #[error("core error: {0}")]
    Core(#[from] sq_core::Error),

    #[error("sync error: {0}")]
    Sync(#[from] crate::sync::SyncError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for sqrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
