// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronization engine for the offline submission queue.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Engine    │────►│  Transport  │────►│   Server    │
//! │ (SyncEngine)│◄────│   (trait)   │◄────│  (HTTP POST)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   Store     │  (persistent submission queue)
//! │ (sq-core)   │
//! └─────────────┘
//! ```
//!
//! # Drain protocol
//!
//! A drain runs over a snapshot of pending records, transmits them
//! sequentially in insertion order, marks each success, and reports
//! aggregate counts. At most one drain runs at a time per context; a second
//! trigger arriving mid-run is dropped, not queued. A drain while offline is
//! a clean no-op.

mod engine;
mod transport;

pub use engine::{DrainObserver, DrainOutcome, DrainReport, SkipReason, SyncEngine, SyncError};
pub use transport::{
    HttpTransport, OutboundSubmission, Transport, TransportError, TransportResult,
    CAPTURED_AT_HEADER, REPLAY_HEADER,
};

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod engine_tests;

#[cfg(test)]
mod transport_tests;
