// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Submission records: the unit of offline work.
//!
//! A record is a snapshot of a form submission taken at the moment the
//! network was unavailable. Records are:
//!
//! - Immutable after creation, except for the `synced` flag
//! - Identified by an id that doubles as the idempotency key for completion
//! - Ordered by enqueue time, which defines sync attempt order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single named form field, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name as it appears in the form.
    pub name: String,
    /// Captured value.
    pub value: String,
}

impl Field {
    /// Creates a field from a name/value pair.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Field { name: name.into(), value: value.into() }
    }
}

/// A unit of offline work: one form submission awaiting delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Unique identifier, generated at enqueue time; never reused.
    pub id: String,
    /// Logical destination of the submission (e.g. a day-plan name).
    /// Opaque to the queue; interpreted only when building the outbound
    /// request.
    pub target_ref: String,
    /// Ordered snapshot of the form state at enqueue time.
    pub fields: Vec<Field>,
    /// When the user originally submitted, before any sync happened.
    pub captured_at: DateTime<Utc>,
    /// False at creation; set true exactly once after a confirmed
    /// successful transmission.
    pub synced: bool,
}

impl SubmissionRecord {
    /// Constructs a new pending record.
    pub fn new(
        id: String,
        target_ref: String,
        fields: Vec<Field>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        SubmissionRecord { id, target_ref, fields, captured_at, synced: false }
    }
}

/// Generate a record ID from the target and capture timestamp.
/// Format: sub-{hash} where hash is the first 12 hex chars of
/// SHA256(target + timestamp).
pub fn generate_id(target_ref: &str, captured_at: &DateTime<Utc>) -> String {
    let input = format!("{}{}", target_ref, captured_at.to_rfc3339());
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..6]); // First 12 hex chars (6 bytes)
    format!("sub-{}", short_hash)
}

/// Generate a unique record ID, handling collisions by appending an
/// incrementing suffix.
pub fn generate_unique_id<F>(target_ref: &str, captured_at: &DateTime<Utc>, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_id(target_ref, captured_at);

    if !exists(&base_id) {
        return base_id;
    }

    // Handle collision with incrementing suffix
    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
