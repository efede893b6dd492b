// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared IPC protocol for CLI-coordinator communication.
//!
//! This crate defines the message types and framing protocol used between
//! the `sendq` CLI and the `sendqd` coordinator daemon. Messages are
//! serialized as JSON with length-prefixed framing.
//!
//! Two kinds of traffic share one Unix socket:
//!
//! - Request/response: one [`CoordinatorRequest`] frame answered by one
//!   [`CoordinatorResponse`] frame, then the connection closes.
//! - Broadcast: a connection upgraded with [`CoordinatorRequest::Subscribe`]
//!   stays open and receives [`SyncBroadcast`] frames until either side
//!   drops it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error returned by `FromStr` impls for IPC model types.
#[derive(Debug, Clone)]
pub enum ParseError {
    /// Invalid wake kind string.
    InvalidWakeKind(String),
    /// Invalid sync reason string.
    InvalidSyncReason(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidWakeKind(s) => write!(f, "invalid wake kind: '{}'", s),
            ParseError::InvalidSyncReason(s) => write!(f, "invalid sync reason: '{}'", s),
        }
    }
}

impl std::error::Error for ParseError {}

// ============================================================================
// Model types for IPC serialization
// ============================================================================

/// Kinds of wake registrations a foreground context can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WakeKind {
    /// One-shot wake: fire once when the server is next reachable, then
    /// clear. Registered after a drain left records pending.
    Retry,
    /// Recurring wake on the coordinator's periodic cadence.
    Periodic,
}

impl WakeKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            WakeKind::Retry => "retry",
            WakeKind::Periodic => "periodic",
        }
    }
}

impl fmt::Display for WakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WakeKind {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, ParseError> {
        match s.to_lowercase().as_str() {
            "retry" => Ok(WakeKind::Retry),
            "periodic" => Ok(WakeKind::Periodic),
            _ => Err(ParseError::InvalidWakeKind(s.to_string())),
        }
    }
}

/// Why the coordinator is asking foreground contexts to synchronize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncReason {
    /// The coordinator observed an offline-to-online transition with a
    /// retry wake registered.
    Restored,
    /// The periodic wake cadence came due.
    Periodic,
    /// A foreground context requested an immediate sync.
    Requested,
}

impl SyncReason {
    /// Returns the string representation used in display and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncReason::Restored => "restored",
            SyncReason::Periodic => "periodic",
            SyncReason::Requested => "requested",
        }
    }
}

impl fmt::Display for SyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncReason {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, ParseError> {
        match s.to_lowercase().as_str() {
            "restored" => Ok(SyncReason::Restored),
            "periodic" => Ok(SyncReason::Periodic),
            "requested" => Ok(SyncReason::Requested),
            _ => Err(ParseError::InvalidSyncReason(s.to_string())),
        }
    }
}

// ============================================================================
// Protocol types
// ============================================================================

/// Request sent from a foreground context to the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CoordinatorRequest {
    /// Get coordinator status.
    Status,
    /// Graceful shutdown.
    Shutdown,
    /// Ping to check if the coordinator is alive.
    Ping,
    /// Version handshake request.
    Hello { version: String },
    /// Ask the coordinator to wake every subscribed foreground context now.
    /// Answered with [`CoordinatorResponse::SyncResult`] once the broadcast
    /// has been delivered.
    SyncNow,
    /// Register interest in a future wake.
    RegisterWake { kind: WakeKind },
    /// Upgrade this connection to a broadcast subscription.
    Subscribe,
    /// Fetch a static asset, cache-first. `navigation` marks requests whose
    /// failure should fall back to the offline-confirmation page.
    FetchAsset { path: String, navigation: bool },
}

/// Response sent from the coordinator to a foreground context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CoordinatorResponse {
    /// Status response.
    Status(CoordinatorStatus),
    /// Shutdown acknowledged.
    ShuttingDown,
    /// Pong response.
    Pong,
    /// Error response.
    Error { message: String },
    /// Version handshake response.
    Hello { version: String },
    /// Outcome of a [`CoordinatorRequest::SyncNow`] request.
    SyncResult {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Wake registration acknowledged.
    WakeRegistered { kind: WakeKind },
    /// Subscription acknowledged; broadcast frames follow on this
    /// connection.
    Subscribed,
    /// Asset lookup result. `body` is `None` when the asset is not cached
    /// and not fetchable.
    Asset {
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<Vec<u8>>,
    },
}

/// Broadcast frame pushed to subscribed foreground contexts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SyncBroadcast {
    /// Please run a drain in your context.
    SyncRequested { reason: SyncReason, at: DateTime<Utc> },
}

/// Coordinator status information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoordinatorStatus {
    /// Current coordinator PID.
    pub pid: u32,
    /// Uptime in seconds.
    pub uptime_secs: u64,
    /// Version tag of the active asset cache generation.
    pub cache_generation: String,
    /// Number of assets in the active cache generation.
    pub cached_assets: usize,
    /// Number of connected broadcast subscribers.
    pub subscribers: usize,
}

impl CoordinatorStatus {
    /// Create a new status with the given parameters.
    pub fn new(
        pid: u32,
        uptime_secs: u64,
        cache_generation: String,
        cached_assets: usize,
        subscribers: usize,
    ) -> Self {
        Self { pid, uptime_secs, cache_generation, cached_assets, subscribers }
    }
}

// ============================================================================
// Message framing
// ============================================================================

/// IPC message framing.
///
/// Messages are framed as:
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use std::io::{Read, Write};

    use serde::de::DeserializeOwned;
    use serde::Serialize;

    /// Maximum message size (1MB) to prevent malformed messages from causing hangs.
    const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

    /// Write a serializable message to the given writer.
    pub fn write_message<W: Write, T: Serialize>(
        writer: &mut W,
        message: &T,
    ) -> std::io::Result<()> {
        let json = serde_json::to_vec(message)
            .map_err(|e| std::io::Error::other(format!("serialize error: {}", e)))?;
        let len =
            u32::try_from(json.len()).map_err(|_| std::io::Error::other("message too large"))?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&json)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a deserializable message from the given reader.
    pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> std::io::Result<T> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = u32::from_be_bytes(len_buf) as usize;

        if len > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {} bytes (max {})",
                len, MAX_MESSAGE_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;

        serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::other(format!("deserialize error: {}", e)))
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
