// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, TimeZone, Utc};

use sq_core::{Field, MemorySlot, SubmissionStore};

/// Deterministic capture timestamp.
pub fn captured_at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap()
}

/// Store over a fresh in-memory slot with `n` pending records targeting
/// `monday`, returning the store and the record ids.
pub fn store_with_pending(n: usize) -> (SubmissionStore<MemorySlot>, Vec<String>) {
    let mut store = SubmissionStore::new(MemorySlot::new());
    let ids = (0..n)
        .map(|i| {
            store
                .enqueue(
                    "monday",
                    vec![Field::new("status", "present"), Field::new("slot", format!("{}", i))],
                    captured_at(1_000 + i as i64),
                )
                .unwrap()
        })
        .collect();
    (store, ids)
}
