// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote check-in client abstraction.
//!
//! Provides a trait-based boundary to the check-in endpoint that enables:
//! - A real HTTP client for production ([`crate::HttpCheckInClient`])
//! - Stub clients for unit testing
//!
//! The server must treat a repeated identical check-in as a no-op success:
//! queued items are delivered at least once, and an acknowledgement lost in
//! transit means the same check-in is sent again on the next drain.

use std::future::Future;
use std::pin::Pin;

use ks_core::{CheckInRequest, CheckInResponse, FailureKind};

/// Boxed future returned by the engine's async traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type for a single remote check-in attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Server could not be reached (DNS, refused connection, reset).
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success HTTP status.
    #[error("server returned HTTP {0}")]
    HttpStatus(u16),

    /// The server refused the check-in itself.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The client could not be constructed from its configuration.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl RemoteError {
    /// Classifies the failure for attempt bookkeeping.
    ///
    /// 4xx answers other than 408 (timeout) and 429 (rate limit) mean the
    /// server looked at the request and said no.
    pub fn kind(&self) -> FailureKind {
        match self {
            RemoteError::Rejected(_) => FailureKind::Rejected,
            RemoteError::HttpStatus(code) if is_client_rejection(*code) => FailureKind::Rejected,
            RemoteError::HttpStatus(_)
            | RemoteError::Unreachable(_)
            | RemoteError::Timeout
            | RemoteError::Decode(_)
            | RemoteError::InvalidConfig(_) => FailureKind::Transport,
        }
    }

    /// Converts a decoded response into the engine's success/failure split.
    pub fn check_response(response: CheckInResponse) -> RemoteResult<CheckInResponse> {
        if response.success {
            Ok(response)
        } else {
            let reason = response
                .error
                .or(response.message)
                .unwrap_or_else(|| "check-in refused by server".to_string());
            Err(RemoteError::Rejected(reason))
        }
    }
}

pub(crate) fn is_client_rejection(code: u16) -> bool {
    (400..500).contains(&code) && code != 408 && code != 429
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// One operation against the server: perform a zone check-in.
pub trait CheckInClient: Send + Sync {
    /// Sends the request once. No retries at this layer.
    fn check_in<'a>(
        &'a self,
        request: &'a CheckInRequest,
    ) -> BoxFuture<'a, RemoteResult<CheckInResponse>>;
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
