// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue of check-ins waiting to reach the server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  enqueue   ┌──────────────────┐
//! │   submit    │───────────►│                  │
//! └─────────────┘            │   PendingStore   │──► JsonlStore  (queue.jsonl)
//! ┌─────────────┐  list_all  │     (trait)      │──► SqliteStore (queue.db)
//! │    drain    │◄──────────►│                  │──► MemoryStore
//! └─────────────┘  remove    └──────────────────┘
//! ```
//!
//! Every implementation serializes its operations behind a single lock, so
//! the foreground submit path can interleave with a background drain.
//! Ids are assigned on insert, increase monotonically and are never reused,
//! not even after [`PendingStore::clear`].

mod jsonl;
mod memory;
mod sqlite;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::checkin::PendingCheckIn;
use crate::error::{Error, Result};

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage contract for pending check-ins.
pub trait PendingStore: Send + Sync {
    /// Persists the item and returns its newly assigned id.
    ///
    /// Any id already set on `item` is ignored. The record is durable when
    /// this returns.
    fn enqueue(&self, item: &PendingCheckIn) -> Result<u64>;

    /// All queued items, oldest first.
    fn list_all(&self) -> Result<Vec<PendingCheckIn>>;

    /// Deletes the item. Removing an absent id is not an error.
    fn remove(&self, id: u64) -> Result<()>;

    /// Number of queued items.
    fn count(&self) -> Result<usize>;

    /// Removes every item. Administrative only; the sync flow never calls it.
    fn clear(&self) -> Result<()>;

    /// Bumps the attempt counter and stores the latest failure reason.
    ///
    /// No-op if the id is absent (it may have been synced or cleared since).
    fn record_attempt(&self, id: u64, at_ms: u64, error: Option<&str>) -> Result<()>;

    /// Returns true if nothing is queued.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.count()? == 0)
    }
}

impl<S: PendingStore + ?Sized> PendingStore for Arc<S> {
    fn enqueue(&self, item: &PendingCheckIn) -> Result<u64> {
        (**self).enqueue(item)
    }

    fn list_all(&self) -> Result<Vec<PendingCheckIn>> {
        (**self).list_all()
    }

    fn remove(&self, id: u64) -> Result<()> {
        (**self).remove(id)
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn record_attempt(&self, id: u64, at_ms: u64, error: Option<&str>) -> Result<()> {
        (**self).record_attempt(id, at_ms, error)
    }
}

/// Which storage backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Append-only JSON lines file, fsynced per write.
    #[default]
    Jsonl,
    /// Embedded SQLite database.
    Sqlite,
    /// Volatile, lost on exit.
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Jsonl => "jsonl",
            StoreKind::Sqlite => "sqlite",
            StoreKind::Memory => "memory",
        }
    }

    /// Default file name for this backend inside the state directory.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            StoreKind::Jsonl => "queue.jsonl",
            StoreKind::Sqlite => "queue.db",
            StoreKind::Memory => "",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(StoreKind::Jsonl),
            "sqlite" => Ok(StoreKind::Sqlite),
            "memory" => Ok(StoreKind::Memory),
            _ => Err(Error::InvalidStoreKind(s.to_string())),
        }
    }
}

/// Opens the configured backend. `path` is ignored for [`StoreKind::Memory`].
pub fn open_store(kind: StoreKind, path: &Path) -> Result<Arc<dyn PendingStore>> {
    tracing::debug!(kind = %kind, path = %path.display(), "opening pending store");
    let store: Arc<dyn PendingStore> = match kind {
        StoreKind::Jsonl => Arc::new(JsonlStore::open(path)?),
        StoreKind::Sqlite => Arc::new(SqliteStore::open(path)?),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

/// Takes the store lock, recovering the data if a previous holder panicked.
///
/// Every write leaves the guarded state consistent before it can fail, so a
/// poisoned lock carries no torn data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
