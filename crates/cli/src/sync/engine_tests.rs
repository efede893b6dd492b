// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the sync engine module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use super::engine::{DrainObserver, DrainOutcome, DrainReport, SkipReason, SyncEngine};
use super::test_helpers::{captured_at, store_with_pending};
use super::transport::TransportError;
use super::transport_tests::MockTransport;
use sq_core::{Connectivity, Field, MemorySlot, RouteTable, SubmissionStore};

fn make_engine(
    pending: usize,
) -> (SyncEngine<MockTransport, MemorySlot>, Vec<String>) {
    let (store, ids) = store_with_pending(pending);
    let engine = SyncEngine::new(MockTransport::new(), store, RouteTable::default());
    (engine, ids)
}

fn completed(outcome: DrainOutcome) -> DrainReport {
    match outcome {
        DrainOutcome::Completed(report) => report,
        other => panic!("expected completed drain, got {:?}", other),
    }
}

#[tokio::test]
async fn drain_while_offline_is_a_noop() {
    let (store, _ids) = store_with_pending(2);
    let transport = MockTransport::new();
    let probe = transport.clone();
    let mut engine = SyncEngine::new(transport, store, RouteTable::default());

    let outcome = engine.drain(Connectivity::Offline).await.unwrap();

    assert_eq!(outcome, DrainOutcome::Skipped(SkipReason::Offline));
    // No transmission attempts, no state changes
    assert!(probe.deliveries().is_empty());
    assert_eq!(engine.pending_count().unwrap(), 2);
}

#[tokio::test]
async fn drain_with_empty_queue_returns_immediately() {
    let (mut engine, _ids) = make_engine(0);
    let outcome = engine.drain(Connectivity::Online).await.unwrap();
    assert_eq!(outcome, DrainOutcome::NothingPending);
}

#[tokio::test]
async fn drain_marks_all_on_full_success() {
    let (mut engine, ids) = make_engine(3);

    let report = completed(engine.drain(Connectivity::Online).await.unwrap());

    assert_eq!(report, DrainReport { attempted: 3, succeeded: 3, failed: 0 });
    assert_eq!(engine.pending_count().unwrap(), 0);

    // Synced records remain until compaction
    let all = engine.store_mut().list_all().unwrap();
    assert_eq!(all.len(), 3);
    for (record, id) in all.iter().zip(&ids) {
        assert_eq!(&record.id, id);
        assert!(record.synced);
    }
}

#[tokio::test]
async fn partial_failure_marks_exactly_the_successes() {
    let (store, ids) = store_with_pending(5);
    let transport = MockTransport::new();
    // Records 2 and 4 fail: one rejected, one transport error
    transport.push_outcome(Ok(true));
    transport.push_outcome(Ok(false));
    transport.push_outcome(Ok(true));
    transport.push_outcome(Err(TransportError::RequestFailed("connection reset".into())));
    transport.push_outcome(Ok(true));

    let mut engine = SyncEngine::new(transport, store, RouteTable::default());
    let report = completed(engine.drain(Connectivity::Online).await.unwrap());

    assert_eq!(report, DrainReport { attempted: 5, succeeded: 3, failed: 2 });

    let all = engine.store_mut().list_all().unwrap();
    let synced: Vec<bool> = all.iter().map(|r| r.synced).collect();
    assert_eq!(synced, vec![true, false, true, false, true]);
    assert_eq!(all[1].id, ids[1]);
    assert_eq!(engine.pending_count().unwrap(), 2);
}

#[tokio::test]
async fn first_fails_second_succeeds_leaves_one_pending() {
    let (store, _ids) = store_with_pending(2);
    let transport = MockTransport::new();
    transport.push_outcome(Err(TransportError::RequestFailed("timeout".into())));
    transport.push_outcome(Ok(true));

    let mut engine = SyncEngine::new(transport, store, RouteTable::default());
    let report = completed(engine.drain(Connectivity::Online).await.unwrap());

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(engine.pending_count().unwrap(), 1);

    let all = engine.store_mut().list_all().unwrap();
    assert!(!all[0].synced);
    assert!(all[1].synced);
}

#[tokio::test]
async fn drain_transmits_in_insertion_order_without_overlap() {
    let (store, _ids) = store_with_pending(4);
    let transport = MockTransport::new();
    let probe = transport.clone();
    let mut engine = SyncEngine::new(transport, store, RouteTable::default());

    completed(engine.drain(Connectivity::Online).await.unwrap());

    let deliveries = probe.deliveries();
    assert_eq!(deliveries.len(), 4);

    // Insertion order: the "slot" field counts up with enqueue order
    for (i, submission) in deliveries.iter().enumerate() {
        assert!(submission.replay);
        assert_eq!(submission.fields[1].value, format!("{}", i));
    }

    // Strictly sequential: no two deliveries were ever in flight at once
    assert_eq!(probe.max_concurrent(), 1);
}

#[tokio::test]
async fn retried_drain_only_resends_pending_records() {
    let (store, ids) = store_with_pending(2);
    let transport = MockTransport::new();
    transport.push_outcome(Ok(false));
    transport.push_outcome(Ok(true));

    let mut engine = SyncEngine::new(transport, store, RouteTable::default());
    let report = completed(engine.drain(Connectivity::Online).await.unwrap());
    assert_eq!(report, DrainReport { attempted: 2, succeeded: 1, failed: 1 });

    // Next drain retries only the failed record, and succeeds
    let report = completed(engine.drain(Connectivity::Online).await.unwrap());
    assert_eq!(report, DrainReport { attempted: 1, succeeded: 1, failed: 0 });

    let all = engine.store_mut().list_all().unwrap();
    assert!(all.iter().all(|r| r.synced));
    assert_eq!(all[0].id, ids[0]);
}

#[tokio::test]
async fn observer_sees_start_and_finish() {
    struct Recording(Arc<Mutex<Vec<String>>>);

    impl DrainObserver for Recording {
        fn drain_started(&self, pending: usize) {
            self.0.lock().unwrap().push(format!("started:{}", pending));
        }
        fn drain_finished(&self, report: &DrainReport) {
            self.0
                .lock()
                .unwrap()
                .push(format!("finished:{}/{}", report.succeeded, report.failed));
        }
    }

    let (store, _ids) = store_with_pending(2);
    let transport = MockTransport::new();
    transport.push_outcome(Ok(true));
    transport.push_outcome(Ok(false));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut engine = SyncEngine::new(transport, store, RouteTable::default())
        .with_observer(Box::new(Recording(Arc::clone(&seen))));

    completed(engine.drain(Connectivity::Online).await.unwrap());

    assert_eq!(*seen.lock().unwrap(), vec!["started:2", "finished:1/1"]);
}

#[tokio::test]
async fn monday_submission_end_to_end() {
    // Enqueue one record for monday with status=present, come back online,
    // and expect one replayed POST to the monday route.
    let mut store = SubmissionStore::new(MemorySlot::new());
    let id = store
        .enqueue("monday", vec![Field::new("status", "present")], captured_at(1_000))
        .unwrap();

    let transport = MockTransport::new();
    let probe = transport.clone();

    let mut engine = SyncEngine::new(transport, store, RouteTable::default());
    let report = completed(engine.drain(Connectivity::Online).await.unwrap());
    assert_eq!(report, DrainReport { attempted: 1, succeeded: 1, failed: 0 });

    // Exactly one POST, to the monday route, with the replay marker and the
    // original field snapshot
    let deliveries = probe.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].path, "/plan/monday");
    assert!(deliveries[0].replay);
    assert_eq!(deliveries[0].fields, vec![Field::new("status", "present")]);
    assert_eq!(deliveries[0].captured_at, captured_at(1_000));

    let all = engine.store_mut().list_all().unwrap();
    assert_eq!(all[0].id, id);
    assert!(all[0].synced);
}

#[tokio::test]
async fn submit_direct_bypasses_the_queue() {
    let (store, _ids) = store_with_pending(0);
    let transport = MockTransport::new();
    let mut engine = SyncEngine::new(transport, store, RouteTable::default());

    let accepted = engine
        .submit_direct("tuesday", vec![Field::new("status", "absent")], captured_at(2_000))
        .await
        .unwrap();

    assert!(accepted);
    assert_eq!(engine.pending_count().unwrap(), 0);
}
