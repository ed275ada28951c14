// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background synchronization of the pending queue.
//!
//! # Architecture
//!
//! ```text
//! ConnectivityObserver ──watch<bool>──► auto-sync task ──┐
//!                                                        ├─► run lock ─► Coordinator::sync_all
//! perform_sync() (manual) ───────────────────────────────┘                   │
//!                                                                            ▼
//!                          status() / subscribe() ◄── watch<SyncStatus> ◄── outcome
//! ```
//!
//! Status moves `Idle → Syncing → Success | PartialSuccess | Failed` and
//! falls back to `Idle` after the display window, unless a newer run has
//! started in the meantime. At most one drain runs at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use ks_core::SyncStatus;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::connectivity::ConnectivityObserver;
use crate::coordinator::Coordinator;

/// Timing of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Wait after going online before draining.
    pub debounce: Duration,
    /// How long a terminal status stays visible before reverting to idle.
    pub display_window: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            debounce: Duration::from_millis(2000),
            display_window: Duration::from_millis(5000),
        }
    }
}

/// Result of a [`SyncOrchestrator::perform_sync`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRun {
    /// Another drain is running; nothing was done.
    AlreadySyncing,
    /// The queue was empty; status is back to idle.
    NothingPending,
    /// A drain ran and ended in this terminal status.
    Finished(SyncStatus),
}

/// Drives drains of the pending queue, manually or on connectivity changes.
///
/// Cheap to clone; all clones share one state. Dropping the last clone stops
/// auto-sync.
#[derive(Clone)]
pub struct SyncOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    coordinator: Coordinator,
    observer: Arc<dyn ConnectivityObserver>,
    settings: SyncSettings,
    status: watch::Sender<SyncStatus>,
    run_lock: tokio::sync::Mutex<()>,
    /// Bumped at the start of every run; a pending revert only applies to
    /// the run that scheduled it.
    generation: AtomicU64,
    auto_sync: Mutex<Option<AutoSync>>,
}

/// Handle on the running auto-sync task.
struct AutoSync {
    cancel_token: CancellationToken,
    task: JoinHandle<()>,
}

impl SyncOrchestrator {
    pub fn new(
        coordinator: Coordinator,
        observer: Arc<dyn ConnectivityObserver>,
        settings: SyncSettings,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        SyncOrchestrator {
            inner: Arc::new(Inner {
                coordinator,
                observer,
                settings,
                status,
                run_lock: tokio::sync::Mutex::new(()),
                generation: AtomicU64::new(0),
                auto_sync: Mutex::new(None),
            }),
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.inner.coordinator
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.inner.settings
    }

    /// Current status.
    pub fn status(&self) -> SyncStatus {
        self.inner.status.borrow().clone()
    }

    /// Subscribes to status changes. The receiver starts with the current
    /// status.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.inner.status.subscribe()
    }

    pub fn pending_count(&self) -> ks_core::Result<usize> {
        self.inner.coordinator.pending_count()
    }

    /// Resets the status to idle.
    pub fn clear_status(&self) {
        self.inner.status.send_replace(SyncStatus::Idle);
    }

    /// Drains the queue now unless a drain is already running.
    pub async fn perform_sync(&self) -> SyncRun {
        self.inner.perform_sync().await
    }

    /// Starts draining automatically whenever connectivity comes back.
    ///
    /// Restarts the background task if it was already running. Must be
    /// called inside a tokio runtime.
    pub fn start_auto_sync(&self) {
        let cancel_token = CancellationToken::new();
        let rx = self.inner.observer.subscribe();
        let weak = Arc::downgrade(&self.inner);
        let debounce = self.inner.settings.debounce;
        let task = tokio::spawn(auto_sync_loop(weak, rx, cancel_token.clone(), debounce));

        let auto_sync = AutoSync { cancel_token, task };
        if let Some(previous) = lock(&self.inner.auto_sync).replace(auto_sync) {
            previous.cancel_token.cancel();
        }
        tracing::debug!("auto-sync started");
    }

    /// Stops reacting to connectivity changes. An in-flight drain finishes.
    pub fn stop_auto_sync(&self) {
        if let Some(auto_sync) = lock(&self.inner.auto_sync).take() {
            auto_sync.cancel_token.cancel();
            tracing::debug!("auto-sync stopped");
        }
    }

    /// Stops auto-sync and waits until no drain is running.
    ///
    /// Call before tearing down the runtime, which would otherwise drop an
    /// in-flight drain in the middle of a remote call.
    pub async fn shutdown(&self) {
        let auto_sync = lock(&self.inner.auto_sync).take();
        if let Some(AutoSync { cancel_token, task }) = auto_sync {
            cancel_token.cancel();
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "auto-sync task ended abnormally");
            }
        }
        // Covers a manual drain started from another clone
        drop(self.inner.run_lock.lock().await);
        tracing::debug!("sync shut down");
    }

    pub fn is_auto_sync_running(&self) -> bool {
        lock(&self.inner.auto_sync)
            .as_ref()
            .is_some_and(|a| !a.cancel_token.is_cancelled())
    }
}

impl Inner {
    async fn perform_sync(self: &Arc<Self>) -> SyncRun {
        let Ok(_guard) = self.run_lock.try_lock() else {
            return SyncRun::AlreadySyncing;
        };
        let syncing = self.status.borrow().is_syncing();
        if syncing {
            return SyncRun::AlreadySyncing;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let total = match self.coordinator.pending_count() {
            Ok(0) => {
                self.status.send_replace(SyncStatus::Idle);
                return SyncRun::NothingPending;
            }
            Ok(total) => total,
            Err(e) => return self.finish(generation, SyncStatus::Failed { message: e.to_string() }),
        };

        tracing::info!(pending = total, "sync started");

        // Progress carries the total of the items actually listed
        let status = &self.status;
        let result = self
            .coordinator
            .sync_all_with_progress(|current, total| {
                status.send_replace(SyncStatus::Syncing { current, total });
            })
            .await;

        let terminal = match result {
            Ok(outcome) if outcome.total == 0 => {
                self.status.send_replace(SyncStatus::Idle);
                return SyncRun::NothingPending;
            }
            Ok(outcome) => {
                if let Err(e) = self.coordinator.record_failures(&outcome) {
                    tracing::warn!(error = %e, "failed to record sync attempts");
                }
                SyncStatus::from_outcome(outcome)
            }
            Err(e) => SyncStatus::Failed { message: e.to_string() },
        };
        self.finish(generation, terminal)
    }

    /// Publishes a terminal status and schedules the revert to idle.
    fn finish(self: &Arc<Self>, generation: u64, terminal: SyncStatus) -> SyncRun {
        match &terminal {
            SyncStatus::Failed { message } => tracing::warn!(%message, "sync failed"),
            other => tracing::info!(status = %other, "sync finished"),
        }
        self.status.send_replace(terminal.clone());

        let weak = Arc::downgrade(self);
        let window = self.settings.display_window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(inner) = weak.upgrade() {
                inner.revert_to_idle(generation);
            }
        });

        SyncRun::Finished(terminal)
    }

    fn revert_to_idle(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        self.status.send_if_modified(|status| {
            if status.is_terminal() {
                *status = SyncStatus::Idle;
                true
            } else {
                false
            }
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let auto_sync = match self.auto_sync.get_mut() {
            Ok(auto_sync) => auto_sync.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(auto_sync) = auto_sync {
            auto_sync.cancel_token.cancel();
        }
    }
}

/// Drains after every transition to online, once the debounce has passed
/// and only if still online.
async fn auto_sync_loop(
    inner: Weak<Inner>,
    mut rx: watch::Receiver<bool>,
    cancel_token: CancellationToken,
    debounce: Duration,
) {
    let mut online = *rx.borrow_and_update();
    loop {
        if online && has_pending(&inner) {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => break,
                _ = tokio::time::sleep(debounce) => {}
            }

            let still_online = *rx.borrow_and_update();
            if still_online {
                let Some(strong) = inner.upgrade() else { break };
                strong.perform_sync().await;
            } else {
                tracing::debug!("went offline during debounce, sync skipped");
            }
        }

        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        online = *rx.borrow_and_update();
    }
    tracing::trace!("auto-sync loop exited");
}

fn has_pending(inner: &Weak<Inner>) -> bool {
    let Some(inner) = inner.upgrade() else {
        return false;
    };
    match inner.coordinator.pending_count() {
        Ok(count) => count > 0,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read pending count");
            false
        }
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
