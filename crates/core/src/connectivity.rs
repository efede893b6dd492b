// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity state machine.
//!
//! Two states, `Online` and `Offline`. Transitions are driven only by
//! re-probing platform reachability, never by the outcome of an individual
//! sync request. Observers receive transition events synchronously.

use std::fmt;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Network reachability as last reported by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// The server is reachable.
    Online,
    /// The server is not reachable.
    Offline,
}

impl Connectivity {
    /// Returns the string representation used in display and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Connectivity::Online => "online",
            Connectivity::Offline => "offline",
        }
    }

    /// True when online.
    pub fn is_online(&self) -> bool {
        matches!(self, Connectivity::Online)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A state transition, dispatched to registered observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    /// Offline → Online.
    CameOnline,
    /// Online → Offline.
    WentOffline,
}

/// Source of platform reachability reports.
///
/// This allows injecting a fixed probe for testing and for forcing offline
/// behavior from the command line.
pub trait ConnectivityProbe: Send {
    /// Check reachability now. Must not block beyond its configured timeout.
    fn check(&self) -> Connectivity;
}

/// Probe that attempts a bounded TCP connection to the server address.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Creates a probe for `host:port` with the given timeout.
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        TcpProbe { addr: addr.into(), timeout }
    }
}

impl ConnectivityProbe for TcpProbe {
    fn check(&self) -> Connectivity {
        let addrs: Vec<SocketAddr> = match self.addr.to_socket_addrs() {
            Ok(iter) => iter.collect(),
            Err(_) => return Connectivity::Offline,
        };
        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return Connectivity::Online;
            }
        }
        Connectivity::Offline
    }
}

/// Probe pinned to a fixed state.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub Connectivity);

impl ConnectivityProbe for FixedProbe {
    fn check(&self) -> Connectivity {
        self.0
    }
}

impl ConnectivityProbe for Box<dyn ConnectivityProbe> {
    fn check(&self) -> Connectivity {
        (**self).check()
    }
}

/// Observer callback for connectivity transitions.
pub type ConnectivityObserver = Box<dyn Fn(ConnectivityEvent) + Send>;

/// Tracks reachability and notifies observers of transitions.
///
/// The initial state is whatever the probe reports at construction time.
/// `refresh()` re-probes and, on a transition, dispatches the event to every
/// observer synchronously before returning.
pub struct ConnectivityMonitor<P: ConnectivityProbe> {
    probe: P,
    state: Connectivity,
    observers: Vec<ConnectivityObserver>,
}

impl<P: ConnectivityProbe> ConnectivityMonitor<P> {
    /// Creates a monitor, taking the initial state from the probe.
    pub fn new(probe: P) -> Self {
        let state = probe.check();
        ConnectivityMonitor { probe, state, observers: Vec::new() }
    }

    /// Current state, as of the last probe.
    pub fn state(&self) -> Connectivity {
        self.state
    }

    /// Register an observer for transition events.
    pub fn subscribe(&mut self, observer: ConnectivityObserver) {
        self.observers.push(observer);
    }

    /// Re-probe reachability; on a transition, dispatch to observers and
    /// return the event.
    pub fn refresh(&mut self) -> Option<ConnectivityEvent> {
        let next = self.probe.check();
        let event = match (self.state, next) {
            (Connectivity::Offline, Connectivity::Online) => ConnectivityEvent::CameOnline,
            (Connectivity::Online, Connectivity::Offline) => ConnectivityEvent::WentOffline,
            _ => return None,
        };
        self.state = next;
        for observer in &self.observers {
            observer(event);
        }
        Some(event)
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
