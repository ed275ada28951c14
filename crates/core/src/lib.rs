// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ks-core: Shared library for the kiosk check-in engine
//!
//! This crate provides the check-in data model, the error taxonomy and the
//! durable pending queue used by both the sync engine and the kiosk CLI.

pub mod checkin;
pub mod clock;
pub mod error;
pub mod outcome;
pub mod store;

pub use checkin::{AttendeeSnapshot, CheckInRequest, CheckInResponse, PendingCheckIn, ZoneSnapshot};
pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use outcome::{FailedAttempt, FailureKind, SyncOutcome, SyncStatus};
pub use store::{open_store, JsonlStore, MemoryStore, PendingStore, SqliteStore, StoreKind};
