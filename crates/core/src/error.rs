// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ks-core operations.

use thiserror::Error;

/// All possible errors that can occur in ks-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid event day: '{0}'\n  hint: event days use the YYYY-MM-DD format")]
    InvalidEventDay(String),

    #[error("invalid store kind: '{0}'\n  hint: valid kinds are: jsonl, sqlite, memory")]
    InvalidStoreKind(String),

    #[error("pending queue is locked by another process: {0}")]
    StoreLocked(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for ks-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
