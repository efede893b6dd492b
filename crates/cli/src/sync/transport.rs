// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for submission delivery.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP delivery for production
//! - Mock transports for unit testing
//!
//! A delivery resolves to `Ok(true)` on an HTTP-success-range response,
//! `Ok(false)` on a non-success response, and `Err` on a transport failure.
//! The engine treats the last two identically; the distinction exists for
//! logging. There is no retry within a single delivery; retry happens at
//! the drain level.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Utc};

use sq_core::{Field, RouteTable, SubmissionRecord};

/// Header marking a replayed offline submission.
pub const REPLAY_HEADER: &str = "X-Offline-Sync";

/// Header carrying the original capture timestamp of a replay.
pub const CAPTURED_AT_HEADER: &str = "X-Original-Timestamp";

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request could not be delivered.
    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// One submission on its way to the server.
///
/// Built from a queued record (replay) or directly from an intercepted
/// online submission.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundSubmission {
    /// Endpoint path derived from the record's target.
    pub path: String,
    /// The payload fields, in their original order.
    pub fields: Vec<Field>,
    /// Original submission intent time.
    pub captured_at: DateTime<Utc>,
    /// True when this is a replayed offline submission; adds the replay
    /// markers to the request.
    pub replay: bool,
}

impl OutboundSubmission {
    /// Builds the replay of a queued record.
    pub fn replayed(record: &SubmissionRecord, routes: &RouteTable) -> Self {
        OutboundSubmission {
            path: routes.path_for(&record.target_ref),
            fields: record.fields.clone(),
            captured_at: record.captured_at,
            replay: true,
        }
    }

    /// Builds a direct (online, never queued) submission.
    pub fn direct(
        target_ref: &str,
        fields: Vec<Field>,
        captured_at: DateTime<Utc>,
        routes: &RouteTable,
    ) -> Self {
        OutboundSubmission { path: routes.path_for(target_ref), fields, captured_at, replay: false }
    }
}

/// Transport trait for submission delivery.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send {
    /// Deliver one submission.
    ///
    /// Returns whether the server accepted it.
    fn deliver(
        &mut self,
        submission: OutboundSubmission,
    ) -> Pin<Box<dyn Future<Output = TransportResult<bool>> + Send + '_>>;
}

/// HTTP transport posting multipart forms to the server.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(HttpTransport { client, base_url: base_url.into() })
    }
}

impl Transport for HttpTransport {
    fn deliver(
        &mut self,
        submission: OutboundSubmission,
    ) -> Pin<Box<dyn Future<Output = TransportResult<bool>> + Send + '_>> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), submission.path);
        Box::pin(async move {
            let mut form = reqwest::multipart::Form::new();
            for field in submission.fields {
                form = form.text(field.name, field.value);
            }

            let mut request = self.client.post(&url).multipart(form);
            if submission.replay {
                request = request
                    .header(REPLAY_HEADER, "true")
                    .header(CAPTURED_AT_HEADER, submission.captured_at.to_rfc3339());
            }

            let response = request
                .send()
                .await
                .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

            Ok(response.status().is_success())
        })
    }
}
