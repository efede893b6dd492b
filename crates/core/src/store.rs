// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent queue of submission records.
//!
//! The store serializes the whole collection into one storage slot on every
//! mutation. Insertion order is preserved and defines sync attempt order.
//! Completion marking is idempotent, which is what makes concurrent drains
//! from separate contexts safe under the at-least-once delivery contract.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::record::{generate_unique_id, Field, SubmissionRecord};
use crate::slot::StorageSlot;

/// Name of the slot holding the submission queue.
pub const QUEUE_SLOT: &str = "submission_queue";

/// Filename of the queue database within the state directory.
pub const QUEUE_DB_NAME: &str = "queue.db";

/// The persistent submission queue.
///
/// The store is the single source of truth for pending vs. completed
/// records: synced records remain visible (for counts and notifications)
/// until an explicit [`compact`](SubmissionStore::compact).
pub struct SubmissionStore<S: StorageSlot> {
    slot: S,
}

impl<S: StorageSlot> SubmissionStore<S> {
    /// Creates a store over the given slot.
    pub fn new(slot: S) -> Self {
        SubmissionStore { slot }
    }

    /// Append a new pending record, returning its id.
    ///
    /// A storage failure here means the submission is lost: there is no
    /// further retry layer below the store, so the error propagates to the
    /// caller for immediate surfacing.
    pub fn enqueue(
        &mut self,
        target_ref: &str,
        fields: Vec<Field>,
        captured_at: DateTime<Utc>,
    ) -> Result<String> {
        let mut records = self.load()?;
        let id = generate_unique_id(target_ref, &captured_at, |candidate| {
            records.iter().any(|r| r.id == candidate)
        });
        records.push(SubmissionRecord::new(
            id.clone(),
            target_ref.to_string(),
            fields,
            captured_at,
        ));
        self.save(&records)?;
        Ok(id)
    }

    /// Full snapshot of the queue, in insertion order.
    pub fn list_all(&self) -> Result<Vec<SubmissionRecord>> {
        self.load()
    }

    /// Snapshot of records not yet synced, in insertion order.
    pub fn list_pending(&self) -> Result<Vec<SubmissionRecord>> {
        Ok(self.load()?.into_iter().filter(|r| !r.synced).collect())
    }

    /// Number of records awaiting sync.
    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.load()?.iter().filter(|r| !r.synced).count())
    }

    /// Mark a record as synced.
    ///
    /// Idempotent: marking an already-synced record, or an id that no longer
    /// exists (a concurrent compaction may have removed it), is a no-op.
    pub fn mark_synced(&mut self, id: &str) -> Result<()> {
        let mut records = self.load()?;
        let mut changed = false;
        for record in records.iter_mut() {
            if record.id == id && !record.synced {
                record.synced = true;
                changed = true;
            }
        }
        if changed {
            self.save(&records)?;
        }
        Ok(())
    }

    /// Drop all synced records, leaving pending records in their original
    /// relative order.
    ///
    /// Caller-triggered housekeeping; must not run concurrently with a
    /// drain's write-back in the same context.
    pub fn compact(&mut self) -> Result<()> {
        let records = self.load()?;
        let pending: Vec<SubmissionRecord> =
            records.into_iter().filter(|r| !r.synced).collect();
        self.save(&pending)
    }

    fn load(&self) -> Result<Vec<SubmissionRecord>> {
        match self.slot.read()? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, records: &[SubmissionRecord]) -> Result<()> {
        let bytes = serde_json::to_vec(records)?;
        self.slot.write(&bytes)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
