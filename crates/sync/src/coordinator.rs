// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline check-in coordination.
//!
//! The [`Coordinator`] is the single entry point for check-ins. It decides
//! between delivering now and queueing for later, and it drains the queue
//! one item at a time. Remote failures never escape this layer: the worst
//! case for a check-in is "queued, will retry". Only local storage failures
//! are returned as errors.

use std::sync::Arc;

use ks_core::{
    CheckInRequest, CheckInResponse, ClockSource, FailureKind, PendingCheckIn, PendingStore,
    SyncOutcome, SystemClock,
};

use crate::remote::{CheckInClient, RemoteError};

/// Prefix of the reason attached to a check-in queued after a failed
/// online attempt.
pub const SAVED_OFFLINE_PREFIX: &str = "saved offline: ";

/// What happened to a submitted check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server accepted the check-in. Nothing was queued.
    Delivered(CheckInResponse),
    /// The check-in was queued for a later sync.
    ///
    /// `reason` is set when an online attempt failed first.
    Queued { id: u64, reason: Option<String> },
}

impl SubmitOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SubmitOutcome::Delivered(_))
    }

    /// Queue id, if the check-in was queued.
    pub fn queued_id(&self) -> Option<u64> {
        match self {
            SubmitOutcome::Delivered(_) => None,
            SubmitOutcome::Queued { id, .. } => Some(*id),
        }
    }
}

/// Failure to sync a single queued item.
#[derive(Debug, thiserror::Error)]
pub enum SyncItemError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Delivered, but the queue entry could not be removed. The item will be
    /// sent again on the next drain.
    #[error("delivered but still queued: {0}")]
    Store(#[source] ks_core::Error),

    #[error("check-in was never queued")]
    Unpersisted,
}

impl SyncItemError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncItemError::Remote(e) => e.kind(),
            SyncItemError::Store(_) | SyncItemError::Unpersisted => FailureKind::Storage,
        }
    }
}

/// Entry point for submitting check-ins and draining the pending queue.
#[derive(Clone)]
pub struct Coordinator {
    store: Arc<dyn PendingStore>,
    client: Arc<dyn CheckInClient>,
    clock: Arc<dyn ClockSource>,
}

impl Coordinator {
    pub fn new(store: Arc<dyn PendingStore>, client: Arc<dyn CheckInClient>) -> Self {
        Self::with_clock(store, client, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn PendingStore>,
        client: Arc<dyn CheckInClient>,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        Coordinator { store, client, clock }
    }

    /// Submits a check-in.
    ///
    /// While `online`, the server is tried once and any failure queues the
    /// check-in instead. While offline the check-in is queued directly.
    /// Only a failure to queue is returned as an error.
    pub async fn submit(
        &self,
        request: CheckInRequest,
        online: bool,
    ) -> ks_core::Result<SubmitOutcome> {
        if !online {
            let id = self.enqueue(&request)?;
            tracing::info!(id, zone_id = %request.zone_id, "offline, check-in queued");
            return Ok(SubmitOutcome::Queued { id, reason: None });
        }

        match self.client.check_in(&request).await.and_then(RemoteError::check_response) {
            Ok(response) => {
                tracing::info!(zone_id = %request.zone_id, "check-in delivered");
                Ok(SubmitOutcome::Delivered(response))
            }
            Err(e) => {
                let id = self.enqueue(&request)?;
                tracing::info!(
                    id,
                    zone_id = %request.zone_id,
                    kind = %e.kind(),
                    error = %e,
                    "check-in failed online, queued"
                );
                Ok(SubmitOutcome::Queued {
                    id,
                    reason: Some(format!("{}{}", SAVED_OFFLINE_PREFIX, e)),
                })
            }
        }
    }

    fn enqueue(&self, request: &CheckInRequest) -> ks_core::Result<u64> {
        let pending = PendingCheckIn::from_request(request, self.clock.now_ms());
        self.store.enqueue(&pending)
    }

    /// Sends one queued item and removes it on success.
    ///
    /// On failure the item is left in the queue untouched.
    pub async fn sync_one(&self, item: &PendingCheckIn) -> Result<CheckInResponse, SyncItemError> {
        let id = item.id.ok_or(SyncItemError::Unpersisted)?;
        let request = item.to_request();

        tracing::debug!(id, zone_id = %item.zone_id, attempt = item.attempt_count + 1, "syncing check-in");
        let response = self.client.check_in(&request).await.and_then(RemoteError::check_response)?;
        self.store.remove(id).map_err(SyncItemError::Store)?;
        Ok(response)
    }

    /// Drains the queue in order. See [`Coordinator::sync_all_with_progress`].
    pub async fn sync_all(&self) -> ks_core::Result<SyncOutcome> {
        self.sync_all_with_progress(|_, _| {}).await
    }

    /// Drains the queue sequentially in listed order. Calls
    /// `on_progress(0, total)` once the queue is listed and
    /// `on_progress(attempted, total)` after each item.
    ///
    /// Item failures are collected into the outcome and never stop the
    /// drain. Only a failure to list the queue is returned as an error.
    pub async fn sync_all_with_progress<F>(&self, mut on_progress: F) -> ks_core::Result<SyncOutcome>
    where
        F: FnMut(usize, usize) + Send,
    {
        let items = self.store.list_all()?;
        let total = items.len();
        let mut outcome = SyncOutcome { total, ..SyncOutcome::default() };
        if total > 0 {
            on_progress(0, total);
        }

        for (index, item) in items.iter().enumerate() {
            match self.sync_one(item).await {
                Ok(_) => outcome.record_success(),
                Err(e) => {
                    let id = item.id.unwrap_or_default();
                    tracing::warn!(id, kind = %e.kind(), error = %e, "check-in sync failed");
                    outcome.record_failure(id, e.kind(), e.to_string());
                }
            }
            on_progress(index + 1, total);
        }

        tracing::info!(
            total,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "queue drained"
        );
        Ok(outcome)
    }

    /// Updates attempt bookkeeping for every failed item of a drain.
    ///
    /// Items removed in the meantime are skipped.
    pub fn record_failures(&self, outcome: &SyncOutcome) -> ks_core::Result<()> {
        let now = self.clock.now_ms();
        for failure in &outcome.failures {
            let error = match failure.kind {
                FailureKind::Rejected if !failure.error.starts_with("rejected: ") => {
                    format!("rejected: {}", failure.error)
                }
                _ => failure.error.clone(),
            };
            self.store.record_attempt(failure.id, now, Some(&error))?;
        }
        Ok(())
    }

    pub fn pending_count(&self) -> ks_core::Result<usize> {
        self.store.count()
    }

    pub fn list_pending(&self) -> ks_core::Result<Vec<PendingCheckIn>> {
        self.store.list_all()
    }

    /// Drops every queued check-in. Administrative use only.
    pub fn clear(&self) -> ks_core::Result<()> {
        self.store.clear()?;
        tracing::warn!("pending queue cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
