// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync engine: single-flight drains of the submission queue.
//!
//! One engine is constructed per execution context with its dependencies
//! injected (store handle, transport, route table). The drain protocol:
//!
//! 1. Guard: a drain already running, or being offline, is a normal no-op.
//! 2. Snapshot the pending records once; the batch is fixed for this run.
//! 3. Transmit sequentially in insertion order; one failure never aborts
//!    the batch.
//! 4. Mark successes in the store; failures stay pending for the next
//!    trigger.
//! 5. Report aggregate success/failure counts to the observer.

use sq_core::{Connectivity, Field, RouteTable, StorageSlot, SubmissionStore};

use chrono::{DateTime, Utc};

use super::transport::{OutboundSubmission, Transport, TransportError};

/// Error type for sync operations.
///
/// Per-record transmission failures are NOT errors; they are counted in the
/// [`DrainReport`]. Only storage failures and direct-submission transport
/// failures surface here.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Transport error on a direct (non-queued) submission.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Queue store error.
    #[error("store error: {0}")]
    Store(#[from] sq_core::Error),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Aggregate outcome of one completed drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Records in the batch snapshot.
    pub attempted: usize,
    /// Records confirmed by the server and marked synced.
    pub succeeded: usize,
    /// Records left pending for a later drain.
    pub failed: usize,
}

/// Why a drain did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Connectivity is offline.
    Offline,
    /// Another drain is already in flight in this context.
    AlreadyRunning,
}

/// Outcome of a drain trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// The guard dropped the trigger; nothing happened.
    Skipped(SkipReason),
    /// The queue had no pending records.
    NothingPending,
    /// A batch ran to completion.
    Completed(DrainReport),
}

/// Observer for drain lifecycle signals, driving progress display and
/// end-of-batch notifications.
pub trait DrainObserver: Send {
    /// A batch of `pending` records is about to be transmitted.
    fn drain_started(&self, _pending: usize) {}
    /// The batch finished with the given counts.
    fn drain_finished(&self, _report: &DrainReport) {}
}

/// The sync engine for one execution context.
pub struct SyncEngine<T: Transport, S: StorageSlot> {
    transport: T,
    store: SubmissionStore<S>,
    routes: RouteTable,
    in_flight: bool,
    observer: Option<Box<dyn DrainObserver>>,
}

impl<T: Transport, S: StorageSlot> SyncEngine<T, S> {
    /// Creates an engine with injected dependencies.
    pub fn new(transport: T, store: SubmissionStore<S>, routes: RouteTable) -> Self {
        SyncEngine { transport, store, routes, in_flight: false, observer: None }
    }

    /// Attach a drain observer.
    pub fn with_observer(mut self, observer: Box<dyn DrainObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Number of records awaiting sync.
    pub fn pending_count(&self) -> SyncResult<usize> {
        Ok(self.store.pending_count()?)
    }

    /// Access to the underlying store (for enqueue/compact from the same
    /// context).
    pub fn store_mut(&mut self) -> &mut SubmissionStore<S> {
        &mut self.store
    }

    /// Transmit a submission directly, bypassing the queue.
    ///
    /// The online path of the submission intercept: no replay markers, no
    /// record created. Returns whether the server accepted it.
    pub async fn submit_direct(
        &mut self,
        target_ref: &str,
        fields: Vec<Field>,
        captured_at: DateTime<Utc>,
    ) -> SyncResult<bool> {
        let submission = OutboundSubmission::direct(target_ref, fields, captured_at, &self.routes);
        Ok(self.transport.deliver(submission).await?)
    }

    /// Run one drain, honoring the single-flight guard.
    ///
    /// Per-record failures are contained: the record stays pending, the
    /// batch continues, and the counts land in the report. A storage failure
    /// while marking a success aborts the batch and surfaces immediately.
    pub async fn drain(&mut self, connectivity: Connectivity) -> SyncResult<DrainOutcome> {
        if self.in_flight {
            return Ok(DrainOutcome::Skipped(SkipReason::AlreadyRunning));
        }
        if !connectivity.is_online() {
            return Ok(DrainOutcome::Skipped(SkipReason::Offline));
        }

        // Snapshot once: records enqueued during the run wait for the next
        // trigger, bounding the run.
        let batch = self.store.list_pending()?;
        if batch.is_empty() {
            return Ok(DrainOutcome::NothingPending);
        }

        self.in_flight = true;
        if let Some(observer) = &self.observer {
            observer.drain_started(batch.len());
        }

        let mut report = DrainReport { attempted: batch.len(), ..DrainReport::default() };

        for record in &batch {
            let submission = OutboundSubmission::replayed(record, &self.routes);
            match self.transport.deliver(submission).await {
                Ok(true) => {
                    if let Err(e) = self.store.mark_synced(&record.id) {
                        self.in_flight = false;
                        return Err(e.into());
                    }
                    report.succeeded += 1;
                }
                Ok(false) => {
                    tracing::debug!("server rejected {}", record.id);
                    report.failed += 1;
                }
                Err(e) => {
                    tracing::debug!("delivery of {} failed: {}", record.id, e);
                    report.failed += 1;
                }
            }
        }

        self.in_flight = false;
        if let Some(observer) = &self.observer {
            observer.drain_finished(&report);
        }

        Ok(DrainOutcome::Completed(report))
    }
}
