// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction.
//!
//! The capture timestamp of a submission is part of its identity and is
//! transmitted to the server, so the clock is injected rather than read from
//! ambient globals. Production code uses [`SystemClock`]; tests use
//! [`FixedClock`] for deterministic timestamps.

use chrono::{DateTime, TimeZone, Utc};

/// Trait for getting the current wall clock time.
///
/// This allows injecting a mock clock for testing.
pub trait ClockSource: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation using `chrono::Utc`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: ClockSource> ClockSource for &C {
    fn now(&self) -> DateTime<Utc> {
        (*self).now()
    }
}

/// A clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Creates a fixed clock from milliseconds since the Unix epoch.
    pub fn at_ms(ms: i64) -> Self {
        FixedClock(Utc.timestamp_millis_opt(ms).single().unwrap_or_default())
    }
}

impl ClockSource for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
