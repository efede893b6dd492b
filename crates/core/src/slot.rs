// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Storage slots: atomic whole-value persistence.
//!
//! The queue keeps its entire collection in one named slot of durable
//! key-value storage. Every write replaces the whole value in a single
//! transaction, so readers never observe a half-written collection. The
//! [`StorageSlot`] trait abstracts the medium, allowing an in-memory slot
//! for tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};

/// SQL schema for the slot store.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS slots (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// One named slot of durable key-value storage.
///
/// Reads return the last fully-written value; writes replace the whole value
/// atomically.
pub trait StorageSlot: Send {
    /// Read the current value, or `None` if the slot has never been written.
    fn read(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the slot value atomically.
    fn write(&self, value: &[u8]) -> Result<()>;
}

/// A slot backed by a single row in a SQLite database.
///
/// SQLite's transactional UPSERT provides the whole-value atomicity the
/// queue relies on, and `busy_timeout` absorbs short cross-process
/// contention on the shared state directory.
pub struct SqliteSlot {
    conn: Connection,
    key: String,
}

impl SqliteSlot {
    /// Open a slot in the database at the given path, creating both if needed.
    pub fn open(path: &Path, key: &str) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
            }
        }

        let conn = Connection::open(path).map_err(|e| Error::StorageUnavailable(e.to_string()))?;

        // WAL mode for cross-process concurrency
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;

        Ok(SqliteSlot { conn, key: key.to_string() })
    }

    /// Open a slot in an in-memory database (for testing).
    pub fn open_in_memory(key: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteSlot { conn, key: key.to_string() })
    }
}

impl StorageSlot for SqliteSlot {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1", params![self.key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&self, value: &[u8]) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO slots (key, value, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![self.key, value],
            )
            .map_err(|e| Error::StorageWrite(e.to_string()))?;
        Ok(())
    }
}

/// An in-memory slot, shared between clones.
///
/// Used in tests and wherever durable storage is not required.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemorySlot {
    /// Creates an empty in-memory slot.
    pub fn new() -> Self {
        MemorySlot::default()
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        let guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn write(&self, value: &[u8]) -> Result<()> {
        let mut guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
