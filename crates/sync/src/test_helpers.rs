// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Stub collaborators shared by the engine's unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use ks_core::{
    CheckInRequest, CheckInResponse, Error, MemoryStore, PendingCheckIn, PendingStore, Result,
};

use crate::remote::{BoxFuture, CheckInClient, RemoteError, RemoteResult};

/// Builds a valid request for the given attendee.
pub fn request(code: &str) -> CheckInRequest {
    CheckInRequest::new(code, "zone1", "2024-05-01").unwrap()
}

/// Scriptable check-in client.
///
/// Succeeds by default. Individual attendee codes can be made to fail with
/// a transport error or to be rejected by the "server".
#[derive(Default)]
pub struct StubClient {
    calls: AtomicUsize,
    offline: AtomicBool,
    failing: Mutex<HashSet<String>>,
    rejecting: Mutex<HashSet<String>>,
    requests: Mutex<Vec<CheckInRequest>>,
    delay: Option<Duration>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        StubClient { delay: Some(delay), ..Self::default() }
    }

    /// Every call fails as unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fail_for(&self, code: &str) {
        self.failing.lock().unwrap().insert(code.to_string());
    }

    pub fn reject_for(&self, code: &str) {
        self.rejecting.lock().unwrap().insert(code.to_string());
    }

    pub fn heal(&self, code: &str) {
        self.failing.lock().unwrap().remove(code);
        self.rejecting.lock().unwrap().remove(code);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Attendee codes in the order they were sent.
    pub fn sent_codes(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|r| r.attendee_code.clone()).collect()
    }

    fn answer(&self, request: &CheckInRequest) -> RemoteResult<CheckInResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let code = &request.attendee_code;
        if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(code) {
            return Err(RemoteError::Unreachable("connection refused".to_string()));
        }
        if self.rejecting.lock().unwrap().contains(code) {
            return Ok(CheckInResponse::rejected("attendee not found"));
        }
        Ok(CheckInResponse { message: Some(format!("welcome {}", code)), ..CheckInResponse::ok() })
    }
}

impl CheckInClient for StubClient {
    fn check_in<'a>(
        &'a self,
        request: &'a CheckInRequest,
    ) -> BoxFuture<'a, RemoteResult<CheckInResponse>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.answer(request)
        })
    }
}

/// In-memory store whose operations can be made to fail.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    pub fail_enqueue: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_remove: AtomicBool,
    /// Enqueued right before the next listing, like a concurrent submit.
    arrives_before_list: Mutex<Option<PendingCheckIn>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arrive_before_next_list(&self, request: &CheckInRequest) {
        *self.arrives_before_list.lock().unwrap() = Some(PendingCheckIn::from_request(request, 0));
    }

    fn check(flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(Error::Io(std::io::Error::other("disk full")))
        } else {
            Ok(())
        }
    }
}

impl PendingStore for FailingStore {
    fn enqueue(&self, item: &PendingCheckIn) -> Result<u64> {
        Self::check(&self.fail_enqueue)?;
        self.inner.enqueue(item)
    }

    fn list_all(&self) -> Result<Vec<PendingCheckIn>> {
        Self::check(&self.fail_list)?;
        if let Some(item) = self.arrives_before_list.lock().unwrap().take() {
            self.inner.enqueue(&item)?;
        }
        self.inner.list_all()
    }

    fn remove(&self, id: u64) -> Result<()> {
        Self::check(&self.fail_remove)?;
        self.inner.remove(id)
    }

    fn count(&self) -> Result<usize> {
        self.inner.count()
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    fn record_attempt(&self, id: u64, at_ms: u64, error: Option<&str>) -> Result<()> {
        self.inner.record_attempt(id, at_ms, error)
    }
}
