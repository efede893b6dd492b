// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Subscriber hub and wake registry.
//!
//! The coordinator never drains the queue itself: it has no handle to the
//! foreground store. Instead it retains the connections of subscribed
//! foreground contexts and pushes `SyncRequested` frames at them when a wake
//! condition fires. Dead subscribers are pruned on the next broadcast.

use std::os::unix::net::UnixStream;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;

use sq_core::Connectivity;
use sq_ipc::{framing, SyncBroadcast, SyncReason, WakeKind};

/// Wake registrations and live subscriber connections.
struct HubState {
    subscribers: Vec<UnixStream>,
    /// One-shot: fire on the next offline-to-online edge, then clear.
    retry_wake: bool,
    /// Recurring wake on the periodic cadence.
    periodic_wake: bool,
    last_periodic: Instant,
    connectivity: Connectivity,
}

/// Shared hub, locked per operation.
pub struct Hub {
    inner: Mutex<HubState>,
    periodic_interval: Duration,
}

impl Hub {
    /// Creates a hub with the given initial reachability and periodic wake
    /// cadence.
    pub fn new(initial: Connectivity, periodic_interval: Duration) -> Self {
        Hub {
            inner: Mutex::new(HubState {
                subscribers: Vec::new(),
                retry_wake: false,
                periodic_wake: false,
                last_periodic: Instant::now(),
                connectivity: initial,
            }),
            periodic_interval,
        }
    }

    /// Retain a subscriber connection for future broadcasts.
    pub fn adopt(&self, stream: UnixStream) {
        let mut state = self.lock();
        state.subscribers.push(stream);
        tracing::info!("subscriber connected ({} total)", state.subscribers.len());
    }

    /// Number of live subscriber connections.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Record a wake registration from a foreground context.
    pub fn register(&self, kind: WakeKind) {
        let mut state = self.lock();
        match kind {
            WakeKind::Retry => state.retry_wake = true,
            WakeKind::Periodic => state.periodic_wake = true,
        }
        tracing::info!("wake registered: {}", kind);
    }

    /// Push a `SyncRequested` frame to every subscriber.
    ///
    /// Returns the number of subscribers the frame reached; peers whose
    /// connection has gone away are dropped.
    pub fn broadcast(&self, reason: SyncReason) -> usize {
        let mut state = self.lock();
        let frame = SyncBroadcast::SyncRequested { reason, at: Utc::now() };

        state.subscribers.retain_mut(|stream| {
            match framing::write_message(stream, &frame) {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!("dropping subscriber: {}", e);
                    false
                }
            }
        });

        let reached = state.subscribers.len();
        tracing::info!("sync requested ({}) broadcast to {} subscriber(s)", reason, reached);
        reached
    }

    /// Advance the wake state machine with a fresh reachability report.
    ///
    /// Fires the one-shot retry wake on an offline-to-online edge, and the
    /// periodic wake when its cadence is due while online.
    pub fn tick(&self, observed: Connectivity) {
        let (fire_retry, fire_periodic) = {
            let mut state = self.lock();
            let came_online = state.connectivity == Connectivity::Offline
                && observed == Connectivity::Online;
            state.connectivity = observed;

            let fire_retry = came_online && state.retry_wake;
            if fire_retry {
                state.retry_wake = false;
            }

            let fire_periodic = state.periodic_wake
                && observed.is_online()
                && state.last_periodic.elapsed() >= self.periodic_interval;
            if fire_periodic {
                state.last_periodic = Instant::now();
            }

            (fire_retry, fire_periodic)
        };

        if fire_retry {
            self.broadcast(SyncReason::Restored);
        }
        if fire_periodic {
            self.broadcast(SyncReason::Periodic);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
