// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Results of draining the pending queue and the sync status derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a single check-in attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network unreachable, timeout, server error. Worth retrying.
    Transport,
    /// The server refused the check-in itself (unknown attendee, invalid zone).
    Rejected,
    /// The remote call succeeded but the local queue could not be updated.
    Storage,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Rejected => "rejected",
            FailureKind::Storage => "storage",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One queued item that failed during a drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAttempt {
    pub id: u64,
    pub kind: FailureKind,
    pub error: String,
}

/// Aggregate result of one drain over the pending queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Human-readable failure lines, in drain order.
    pub errors: Vec<String>,
    /// Per-item failures, in drain order.
    #[serde(default)]
    pub failures: Vec<FailedAttempt>,
}

impl SyncOutcome {
    /// Every attempted item succeeded and there was at least one.
    pub fn is_full_success(&self) -> bool {
        self.failed == 0 && self.total > 0
    }

    /// Some items succeeded and some failed.
    pub fn is_partial_success(&self) -> bool {
        self.succeeded > 0 && self.failed > 0
    }

    /// Nothing to do, or nothing left behind.
    pub fn is_noop_or_complete(&self) -> bool {
        self.total == 0 || self.failed == 0
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, id: u64, kind: FailureKind, error: String) {
        self.failed += 1;
        self.errors.push(format!("check-in {}: {}", id, error));
        self.failures.push(FailedAttempt { id, kind, error });
    }
}

/// Phase of the sync orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing {
        current: usize,
        total: usize,
    },
    Success {
        outcome: SyncOutcome,
    },
    PartialSuccess {
        outcome: SyncOutcome,
    },
    Failed {
        message: String,
    },
}

impl SyncStatus {
    /// Maps a finished drain to its terminal status.
    ///
    /// An empty drain counts as success only when something was attempted;
    /// callers skip the drain entirely when the queue is empty.
    pub fn from_outcome(outcome: SyncOutcome) -> Self {
        if outcome.is_full_success() {
            SyncStatus::Success { outcome }
        } else if outcome.is_partial_success() {
            SyncStatus::PartialSuccess { outcome }
        } else {
            let message =
                outcome.errors.first().cloned().unwrap_or_else(|| "sync failed".to_string());
            SyncStatus::Failed { message }
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SyncStatus::Idle)
    }

    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncStatus::Syncing { .. })
    }

    /// Success, partial success or failure.
    pub fn is_terminal(&self) -> bool {
        match self {
            SyncStatus::Idle | SyncStatus::Syncing { .. } => false,
            SyncStatus::Success { .. }
            | SyncStatus::PartialSuccess { .. }
            | SyncStatus::Failed { .. } => true,
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Idle => write!(f, "idle"),
            SyncStatus::Syncing { current, total } => write!(f, "syncing {}/{}", current, total),
            SyncStatus::Success { outcome } => write!(f, "synced {} check-in(s)", outcome.succeeded),
            SyncStatus::PartialSuccess { outcome } => write!(
                f,
                "partially synced: {} succeeded, {} failed",
                outcome.succeeded, outcome.failed
            ),
            SyncStatus::Failed { message } => write!(f, "sync failed: {}", message),
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
