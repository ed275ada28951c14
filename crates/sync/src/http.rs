// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/JSON implementation of [`CheckInClient`].
//!
//! [`HttpCheckInClient`] POSTs a JSON-encoded [`CheckInRequest`] to the
//! server's zone check-in endpoint. Each call is a single attempt; retrying
//! is the job of the pending queue.

use std::time::Duration;

use ks_core::{CheckInRequest, CheckInResponse};

use crate::remote::{is_client_rejection, BoxFuture, CheckInClient, RemoteError, RemoteResult};

/// Path of the zone check-in endpoint, relative to the server base URL.
pub const CHECKIN_PATH: &str = "/api/zones/checkin";

/// Default timeout for a single check-in request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Server base URL, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Bearer token sent with every request, if any.
    pub api_token: Option<String>,
    /// Timeout for a single request.
    pub timeout: Duration,
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpClientConfig {
            base_url: base_url.into(),
            api_token: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Check-in client speaking HTTP/JSON.
pub struct HttpCheckInClient {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpCheckInClient {
    /// Create a client with a pre-configured HTTP connection pool.
    pub fn new(config: HttpClientConfig) -> RemoteResult<Self> {
        let base = config.base_url.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(RemoteError::InvalidConfig(format!(
                "base url '{}' must start with http:// or https://",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::InvalidConfig(e.to_string()))?;

        Ok(HttpCheckInClient {
            client,
            endpoint: format!("{}{}", base, CHECKIN_PATH),
            api_token: config.api_token,
        })
    }

    /// Full URL of the check-in endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a single POST request and interpret the answer.
    async fn post(&self, request: &CheckInRequest) -> RemoteResult<CheckInResponse> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(ref token) = self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();

        if !status.is_success() {
            let code = status.as_u16();
            // 4xx bodies may carry the server's reason
            if is_client_rejection(code) {
                if let Ok(body) = response.json::<CheckInResponse>().await {
                    if let Some(reason) = body.error.or(body.message) {
                        return Err(RemoteError::Rejected(reason));
                    }
                }
            }
            return Err(RemoteError::HttpStatus(code));
        }

        let body = response
            .json::<CheckInResponse>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        RemoteError::check_response(body)
    }
}

impl CheckInClient for HttpCheckInClient {
    fn check_in<'a>(
        &'a self,
        request: &'a CheckInRequest,
    ) -> BoxFuture<'a, RemoteResult<CheckInResponse>> {
        Box::pin(self.post(request))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else if e.is_decode() {
        RemoteError::Decode(e.to_string())
    } else {
        RemoteError::Unreachable(e.to_string())
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
