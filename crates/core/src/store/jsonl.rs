// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL-backed pending queue.
//!
//! Each check-in is written as a single line and fsynced immediately.
//! Removals and attempt updates rewrite the file through a temp file and an
//! atomic rename, so a crash leaves either the old or the new queue on disk.
//! A crash during an append can leave a torn final line with no newline.
//! Readers skip it and the next write drops it from the file.
//!
//! Next to the queue file live:
//! - `<file>.seq`: the next id to hand out (ids survive removal and clear)
//! - `<file>.lock`: advisory lock shared by every process using the queue

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use fs2::FileExt;

use super::{lock, PendingStore};
use crate::checkin::PendingCheckIn;
use crate::error::{Error, Result};

/// How long to wait for another process to release the queue.
///
/// The wait sleeps the calling thread, so an async caller stalls its worker
/// for at most this long. Holders only keep the lock for one file operation.
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY: Duration = Duration::from_millis(20);

/// Pending queue stored as JSON lines.
pub struct JsonlStore {
    /// Path to the queue file.
    path: PathBuf,
    seq_path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
    /// Serializes access within this process.
    guard: Mutex<()>,
}

/// Queue contents as read from disk.
struct Snapshot {
    items: Vec<PendingCheckIn>,
    /// The file does not end in a newline, so an append would extend the
    /// last line instead of starting a new one.
    unterminated: bool,
}

impl JsonlStore {
    /// Create or open a queue at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Ensure the file exists (create if not)
        OpenOptions::new().create(true).append(true).open(path)?;

        Ok(JsonlStore {
            path: path.to_path_buf(),
            seq_path: sibling(path, "seq"),
            lock_path: sibling(path, "lock"),
            lock_timeout: LOCK_TIMEOUT,
            guard: Mutex::new(()),
        })
    }

    /// Overrides how long operations wait for the cross-process lock.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Path to the queue file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` holding both the in-process and the cross-process lock.
    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = lock(&self.guard);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;

        let started = Instant::now();
        while lock_file.try_lock_exclusive().is_err() {
            if started.elapsed() >= self.lock_timeout {
                return Err(Error::StoreLocked(self.path.display().to_string()));
            }
            std::thread::sleep(LOCK_RETRY);
        }

        let result = f();
        let _ = lock_file.unlock();
        result
    }

    fn read_items(&self) -> Result<Vec<PendingCheckIn>> {
        Ok(self.read_snapshot()?.items)
    }

    fn read_snapshot(&self) -> Result<Snapshot> {
        let mut bytes = Vec::new();
        match File::open(&self.path) {
            Ok(mut file) => {
                file.read_to_end(&mut bytes)?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        // A torn write can split a multi-byte character
        let contents = String::from_utf8_lossy(&bytes);

        let mut items = Vec::new();
        let unterminated = !contents.is_empty() && !contents.ends_with('\n');
        let lines: Vec<&str> = contents.lines().collect();

        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let is_tail = unterminated && index + 1 == lines.len();
            match self.parse_line(line, index + 1) {
                Ok(item) => items.push(item),
                Err(e) if is_tail => {
                    tracing::warn!(path = %self.path.display(), error = %e, "skipping torn record at end of queue");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Snapshot { items, unterminated })
    }

    fn parse_line(&self, line: &str, number: usize) -> Result<PendingCheckIn> {
        let item: PendingCheckIn = serde_json::from_str(line).map_err(|e| {
            Error::CorruptedData(format!("{} line {}: {}", self.path.display(), number, e))
        })?;
        if item.id.is_none() {
            return Err(Error::CorruptedData(format!(
                "{} line {}: missing id",
                self.path.display(),
                number
            )));
        }
        Ok(item)
    }

    /// Replaces the queue file contents atomically.
    fn write_items(&self, items: &[PendingCheckIn]) -> Result<()> {
        let mut contents = String::new();
        for item in items {
            contents.push_str(&serde_json::to_string(item)?);
            contents.push('\n');
        }
        replace_file(&self.path, contents.as_bytes())
    }

    /// Next id to hand out. Falls back to the highest stored id when the
    /// sequence file is missing (queues written before it existed).
    fn next_id(&self, items: &[PendingCheckIn]) -> Result<u64> {
        let from_items = items.iter().filter_map(|i| i.id).max().map_or(1, |max| max + 1);
        let from_seq = match fs::read_to_string(&self.seq_path) {
            // Empty files carry no sequence
            Ok(s) if s.trim().is_empty() => 1,
            Ok(s) => s.trim().parse::<u64>().map_err(|_| {
                Error::CorruptedData(format!("invalid sequence in {}", self.seq_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 1,
            Err(e) => return Err(e.into()),
        };
        Ok(from_seq.max(from_items))
    }

    fn write_seq(&self, next: u64) -> Result<()> {
        replace_file(&self.seq_path, next.to_string().as_bytes())
    }
}

impl PendingStore for JsonlStore {
    fn enqueue(&self, item: &PendingCheckIn) -> Result<u64> {
        self.with_lock(|| {
            let Snapshot { items, unterminated } = self.read_snapshot()?;
            if unterminated {
                self.write_items(&items)?;
            }
            let id = self.next_id(&items)?;
            // Reserve the id before the record lands so a crash in between
            // only leaves a gap.
            self.write_seq(id + 1)?;

            let record = item.clone().with_id(id);
            let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            let json = serde_json::to_string(&record)?;
            writeln!(file, "{}", json)?;
            file.sync_all()?;

            Ok(id)
        })
    }

    fn list_all(&self) -> Result<Vec<PendingCheckIn>> {
        self.with_lock(|| {
            let mut items = self.read_items()?;
            items.sort_by_key(|i| i.id);
            Ok(items)
        })
    }

    fn remove(&self, id: u64) -> Result<()> {
        self.with_lock(|| {
            let items = self.read_items()?;
            if !items.iter().any(|i| i.id == Some(id)) {
                return Ok(());
            }
            let remaining: Vec<_> = items.into_iter().filter(|i| i.id != Some(id)).collect();
            self.write_items(&remaining)
        })
    }

    fn count(&self) -> Result<usize> {
        self.with_lock(|| Ok(self.read_items()?.len()))
    }

    fn clear(&self) -> Result<()> {
        self.with_lock(|| {
            let items = self.read_items()?;
            let next = self.next_id(&items)?;
            self.write_seq(next)?;
            self.write_items(&[])
        })
    }

    fn record_attempt(&self, id: u64, at_ms: u64, error: Option<&str>) -> Result<()> {
        self.with_lock(|| {
            let mut items = self.read_items()?;
            let Some(item) = items.iter_mut().find(|i| i.id == Some(id)) else {
                return Ok(());
            };
            item.record_attempt(at_ms, error.map(str::to_string));
            self.write_items(&items)
        })
    }
}

/// Writes `contents` to a temp sibling, fsyncs it, then renames it over `path`.
fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = sibling(path, "tmp");
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// `queue.jsonl` -> `queue.jsonl.<ext>`
fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".");
    name.push(ext);
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
