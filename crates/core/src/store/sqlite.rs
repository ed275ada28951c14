// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed pending queue.

use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;

use super::{lock, PendingStore};
use crate::checkin::PendingCheckIn;
use crate::error::Result;

/// SQL schema for the pending queue.
///
/// AUTOINCREMENT keeps ids from being reused after the newest row is deleted.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS pending_checkins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    attendee_code TEXT NOT NULL,
    zone_id TEXT NOT NULL,
    event_day TEXT NOT NULL,
    queued_at_ms INTEGER NOT NULL,
    attempt_count INTEGER NOT NULL DEFAULT 0,
    last_attempt_at_ms INTEGER,
    last_error TEXT
);
"#;

/// Pending queue stored in an SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the queue database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL mode so a reader in another process doesn't block the drain
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;

        Ok(SqliteStore { conn: Mutex::new(conn) })
    }

    /// Open an in-memory queue database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn: Mutex::new(conn) })
    }
}

fn row_to_pending(row: &Row<'_>) -> rusqlite::Result<PendingCheckIn> {
    let id: i64 = row.get("id")?;
    let queued_at_ms: i64 = row.get("queued_at_ms")?;
    let attempt_count: i64 = row.get("attempt_count")?;
    let last_attempt_at_ms: Option<i64> = row.get("last_attempt_at_ms")?;
    Ok(PendingCheckIn {
        id: Some(id as u64),
        attendee_code: row.get("attendee_code")?,
        zone_id: row.get("zone_id")?,
        event_day: row.get("event_day")?,
        queued_at_ms: queued_at_ms as u64,
        attempt_count: attempt_count as u32,
        last_attempt_at_ms: last_attempt_at_ms.map(|v| v as u64),
        last_error: row.get("last_error")?,
    })
}

impl PendingStore for SqliteStore {
    fn enqueue(&self, item: &PendingCheckIn) -> Result<u64> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO pending_checkins
                (attendee_code, zone_id, event_day, queued_at_ms,
                 attempt_count, last_attempt_at_ms, last_error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                item.attendee_code,
                item.zone_id,
                item.event_day,
                item.queued_at_ms as i64,
                item.attempt_count as i64,
                item.last_attempt_at_ms.map(|v| v as i64),
                item.last_error,
            ],
        )?;
        Ok(conn.last_insert_rowid() as u64)
    }

    fn list_all(&self) -> Result<Vec<PendingCheckIn>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT id, attendee_code, zone_id, event_day, queued_at_ms,
                    attempt_count, last_attempt_at_ms, last_error
             FROM pending_checkins ORDER BY id ASC",
        )?;
        let items = stmt.query_map([], row_to_pending)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn remove(&self, id: u64) -> Result<()> {
        lock(&self.conn).execute("DELETE FROM pending_checkins WHERE id = ?1", params![id as i64])?;
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = lock(&self.conn).query_row(
            "SELECT COUNT(*) FROM pending_checkins",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<()> {
        lock(&self.conn).execute("DELETE FROM pending_checkins", [])?;
        Ok(())
    }

    fn record_attempt(&self, id: u64, at_ms: u64, error: Option<&str>) -> Result<()> {
        lock(&self.conn).execute(
            "UPDATE pending_checkins
             SET attempt_count = attempt_count + 1,
                 last_attempt_at_ms = ?2,
                 last_error = ?3
             WHERE id = ?1",
            params![id as i64, at_ms as i64, error],
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
