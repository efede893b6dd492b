// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for sq-core operations.

use thiserror::Error;

/// All possible errors that can occur in sq-core operations.
///
/// Storage errors are fatal to the single attempt that hit them: there is no
/// retry layer below the queue store, so callers must surface them
/// immediately instead of swallowing them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage slot unavailable: {0}\n  hint: check that the state directory exists and is writable")]
    StorageUnavailable(String),

    #[error("storage write failed: {0}")]
    StorageWrite(String),

    #[error("corrupted queue data: {0}")]
    CorruptedData(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid field: '{0}'\n  hint: fields are given as name=value")]
    InvalidField(String),
}

/// A specialized Result type for sq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
