// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Volatile pending queue.
//!
//! Used by tests and by devices that run without writable storage. Items do
//! not survive process restart.

use std::sync::Mutex;

use super::{lock, PendingStore};
use crate::checkin::PendingCheckIn;
use crate::error::Result;

#[derive(Debug)]
struct MemoryState {
    items: Vec<PendingCheckIn>,
    next_id: u64,
}

/// In-memory pending queue.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore { state: Mutex::new(MemoryState { items: Vec::new(), next_id: 1 }) }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingStore for MemoryStore {
    fn enqueue(&self, item: &PendingCheckIn) -> Result<u64> {
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.items.push(item.clone().with_id(id));
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<PendingCheckIn>> {
        Ok(lock(&self.state).items.clone())
    }

    fn remove(&self, id: u64) -> Result<()> {
        lock(&self.state).items.retain(|i| i.id != Some(id));
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(lock(&self.state).items.len())
    }

    fn clear(&self) -> Result<()> {
        lock(&self.state).items.clear();
        Ok(())
    }

    fn record_attempt(&self, id: u64, at_ms: u64, error: Option<&str>) -> Result<()> {
        let mut state = lock(&self.state);
        if let Some(item) = state.items.iter_mut().find(|i| i.id == Some(id)) {
            item.record_attempt(at_ms, error.map(str::to_string));
        }
        Ok(())
    }
}
