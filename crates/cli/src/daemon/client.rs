// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! IPC client for communicating with the sendqd coordinator.
//!
//! Provides a connection to the coordinator and methods for sending
//! requests. One request/response pair per connection, except
//! [`CoordinatorClient::subscribe`], which upgrades the connection into a
//! long-lived broadcast stream.

use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

use sq_ipc::{
    framing, CoordinatorRequest, CoordinatorResponse, CoordinatorStatus, SyncBroadcast, WakeKind,
};

/// Connection timeout for coordinator communication.
const TIMEOUT_SECS: u64 = 5;

/// A client connection to the coordinator.
pub struct CoordinatorClient {
    stream: UnixStream,
}

impl CoordinatorClient {
    /// Connect to the coordinator at the given socket path.
    pub fn connect(socket_path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(socket_path)
            .map_err(|e| Error::Coordinator(format!("failed to connect to coordinator: {}", e)))?;

        stream
            .set_read_timeout(Some(Duration::from_secs(TIMEOUT_SECS)))
            .map_err(|e| Error::Coordinator(format!("failed to set read timeout: {}", e)))?;
        stream
            .set_write_timeout(Some(Duration::from_secs(TIMEOUT_SECS)))
            .map_err(|e| Error::Coordinator(format!("failed to set write timeout: {}", e)))?;

        Ok(CoordinatorClient { stream })
    }

    /// Send a request and receive a response.
    fn request(&mut self, request: CoordinatorRequest) -> Result<CoordinatorResponse> {
        framing::write_message(&mut self.stream, &request)?;
        Ok(framing::read_message(&mut self.stream)?)
    }

    /// Check the coordinator is alive.
    pub fn ping(&mut self) -> Result<()> {
        match self.request(CoordinatorRequest::Ping)? {
            CoordinatorResponse::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Fetch coordinator status.
    pub fn status(&mut self) -> Result<CoordinatorStatus> {
        match self.request(CoordinatorRequest::Status)? {
            CoordinatorResponse::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    /// Request a graceful shutdown.
    pub fn shutdown(&mut self) -> Result<()> {
        match self.request(CoordinatorRequest::Shutdown)? {
            CoordinatorResponse::ShuttingDown => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Ask the coordinator to wake every subscribed context now.
    ///
    /// Returns the one-shot reply: whether the broadcast reached anyone, and
    /// the error message if it did not.
    pub fn sync_now(&mut self) -> Result<(bool, Option<String>)> {
        match self.request(CoordinatorRequest::SyncNow)? {
            CoordinatorResponse::SyncResult { success, error } => Ok((success, error)),
            other => Err(unexpected(other)),
        }
    }

    /// Register interest in a future wake.
    pub fn register_wake(&mut self, kind: WakeKind) -> Result<()> {
        match self.request(CoordinatorRequest::RegisterWake { kind })? {
            CoordinatorResponse::WakeRegistered { .. } => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Fetch a static asset through the coordinator's cache.
    pub fn fetch_asset(&mut self, path: &str, navigation: bool) -> Result<Option<Vec<u8>>> {
        let request =
            CoordinatorRequest::FetchAsset { path: path.to_string(), navigation };
        match self.request(request)? {
            CoordinatorResponse::Asset { body } => Ok(body),
            other => Err(unexpected(other)),
        }
    }

    /// Upgrade this connection to a broadcast subscription.
    pub fn subscribe(mut self) -> Result<Subscription> {
        match self.request(CoordinatorRequest::Subscribe)? {
            CoordinatorResponse::Subscribed => {
                // Broadcasts arrive whenever a wake fires; no read deadline.
                self.stream
                    .set_read_timeout(None)
                    .map_err(|e| Error::Coordinator(format!("failed to clear timeout: {}", e)))?;
                Ok(Subscription { stream: self.stream })
            }
            other => Err(unexpected(other)),
        }
    }
}

/// A long-lived broadcast stream from the coordinator.
pub struct Subscription {
    stream: UnixStream,
}

impl Subscription {
    /// Block until the next broadcast frame arrives.
    ///
    /// Returns an error when the coordinator goes away.
    pub fn next(&mut self) -> std::io::Result<SyncBroadcast> {
        framing::read_message(&mut self.stream)
    }
}

fn unexpected(response: CoordinatorResponse) -> Error {
    match response {
        CoordinatorResponse::Error { message } => Error::Coordinator(message),
        other => Error::Coordinator(format!("unexpected response: {:?}", other)),
    }
}
