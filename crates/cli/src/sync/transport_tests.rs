// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the transport module, and the mock transport shared with the
//! engine tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::test_helpers::captured_at;
use super::transport::{OutboundSubmission, Transport, TransportError, TransportResult};
use sq_core::{Field, RouteTable, SubmissionRecord};

/// Mock transport for testing without a real server.
///
/// Outcomes are scripted per delivery in order; once the script is
/// exhausted, deliveries succeed. Concurrency is tracked so tests can assert
/// that deliveries never overlap. Clones share state, so a test can keep a
/// probe handle after moving the transport into an engine.
#[derive(Clone)]
pub struct MockTransport {
    /// Scripted outcomes, consumed front to back.
    outcomes: Arc<Mutex<VecDeque<TransportResult<bool>>>>,
    /// Submissions that were delivered, in order.
    delivered: Arc<Mutex<Vec<OutboundSubmission>>>,
    /// Deliveries currently in flight.
    active: Arc<AtomicUsize>,
    /// High-water mark of concurrent deliveries.
    max_active: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            delivered: Arc::new(Mutex::new(Vec::new())),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script the outcome of the next unscripted delivery.
    pub fn push_outcome(&self, outcome: TransportResult<bool>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// All submissions delivered so far.
    pub fn deliveries(&self) -> Vec<OutboundSubmission> {
        self.delivered.lock().unwrap().clone()
    }

    /// Highest number of deliveries that were ever in flight at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn deliver(
        &mut self,
        submission: OutboundSubmission,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = TransportResult<bool>> + Send + '_>>
    {
        let outcomes = Arc::clone(&self.outcomes);
        let delivered = Arc::clone(&self.delivered);
        let active = Arc::clone(&self.active);
        let max_active = Arc::clone(&self.max_active);
        Box::pin(async move {
            let now_active = active.fetch_add(1, Ordering::SeqCst) + 1;
            max_active.fetch_max(now_active, Ordering::SeqCst);

            // Yield so an overlapping delivery would be observable
            tokio::task::yield_now().await;

            delivered.lock().unwrap().push(submission);
            let outcome = outcomes.lock().unwrap().pop_front().unwrap_or(Ok(true));

            active.fetch_sub(1, Ordering::SeqCst);
            outcome
        })
    }
}

#[tokio::test]
async fn mock_transport_defaults_to_success() {
    let mut transport = MockTransport::new();
    let submission = OutboundSubmission::direct(
        "monday",
        vec![Field::new("status", "present")],
        captured_at(1_000),
        &RouteTable::default(),
    );
    assert!(transport.deliver(submission).await.unwrap());
    assert_eq!(transport.deliveries().len(), 1);
}

#[tokio::test]
async fn mock_transport_scripts_outcomes_in_order() {
    let mut transport = MockTransport::new();
    transport.push_outcome(Ok(false));
    transport.push_outcome(Err(TransportError::RequestFailed("connection reset".into())));

    let routes = RouteTable::default();
    let make = || {
        OutboundSubmission::direct(
            "monday",
            vec![Field::new("status", "present")],
            captured_at(1_000),
            &routes,
        )
    };

    assert!(!transport.deliver(make()).await.unwrap());
    assert!(transport.deliver(make()).await.is_err());
    // Script exhausted: back to success
    assert!(transport.deliver(make()).await.unwrap());
}

#[test]
fn replayed_submission_carries_route_and_marker() {
    let routes = RouteTable::default();
    let record = SubmissionRecord::new(
        "sub-abc".to_string(),
        "monday".to_string(),
        vec![Field::new("status", "present")],
        captured_at(1_000),
    );

    let submission = OutboundSubmission::replayed(&record, &routes);
    assert_eq!(submission.path, "/plan/monday");
    assert!(submission.replay);
    assert_eq!(submission.captured_at, record.captured_at);
}

#[test]
fn unknown_target_replays_to_default_route() {
    let routes = RouteTable::default();
    let record = SubmissionRecord::new(
        "sub-abc".to_string(),
        "someday".to_string(),
        vec![Field::new("status", "present")],
        captured_at(1_000),
    );

    let submission = OutboundSubmission::replayed(&record, &routes);
    assert_eq!(submission.path, "/plan/today");
}

#[test]
fn direct_submission_is_not_a_replay() {
    let submission = OutboundSubmission::direct(
        "tuesday",
        vec![Field::new("status", "absent")],
        captured_at(2_000),
        &RouteTable::default(),
    );
    assert_eq!(submission.path, "/plan/tuesday");
    assert!(!submission.replay);
}
