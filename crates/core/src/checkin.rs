// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Check-in types exchanged with the server and kept in the pending queue.
//!
//! A [`CheckInRequest`] is the canonical wire payload. When it cannot be
//! delivered it becomes a [`PendingCheckIn`], which is turned back into a
//! fresh request on every sync attempt.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Format of the `event_day` field.
pub const EVENT_DAY_FORMAT: &str = "%Y-%m-%d";

/// Payload sent to the server for a single zone check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub attendee_code: String,
    pub zone_id: String,
    /// Calendar day in `YYYY-MM-DD` form.
    pub event_day: String,
}

impl CheckInRequest {
    /// Creates a validated request.
    ///
    /// Attendee code and zone are trimmed and must be non-empty; the event
    /// day must be a real calendar date.
    pub fn new(
        attendee_code: impl Into<String>,
        zone_id: impl Into<String>,
        event_day: impl Into<String>,
    ) -> Result<Self> {
        let attendee_code = attendee_code.into().trim().to_string();
        let zone_id = zone_id.into().trim().to_string();
        let event_day = event_day.into().trim().to_string();

        if attendee_code.is_empty() {
            return Err(Error::InvalidInput("attendee code cannot be empty".to_string()));
        }
        if zone_id.is_empty() {
            return Err(Error::InvalidInput("zone id cannot be empty".to_string()));
        }
        validate_event_day(&event_day)?;

        Ok(CheckInRequest { attendee_code, zone_id, event_day })
    }
}

/// Checks that `day` is a `YYYY-MM-DD` calendar date.
pub fn validate_event_day(day: &str) -> Result<()> {
    // chrono accepts unpadded fields, the wire format does not
    if day.len() != 10 {
        return Err(Error::InvalidEventDay(day.to_string()));
    }
    NaiveDate::parse_from_str(day, EVENT_DAY_FORMAT)
        .map(|_| ())
        .map_err(|_| Error::InvalidEventDay(day.to_string()))
}

/// Attendee details echoed back by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeSnapshot {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// Zone details echoed back by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub id: String,
    pub name: String,
    /// registration, general, vip, workshop, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<String>,
}

/// Result of a remote check-in attempt.
///
/// Only `success` and `error` matter to the sync engine. The rest is passed
/// through to whoever displays the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee: Option<AttendeeSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<ZoneSnapshot>,
    /// Server-side check-in time, as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<String>,
    #[serde(default)]
    pub packet_delivered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckInResponse {
    /// A bare successful response.
    pub fn ok() -> Self {
        CheckInResponse {
            success: true,
            error: None,
            attendee: None,
            zone: None,
            checked_in_at: None,
            packet_delivered: false,
            message: None,
        }
    }

    /// A bare rejection carrying the server's reason.
    pub fn rejected(error: impl Into<String>) -> Self {
        CheckInResponse { success: false, error: Some(error.into()), ..Self::ok() }
    }
}

/// A check-in attempt waiting in the local queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCheckIn {
    /// Assigned by the store on insert; `None` until persisted.
    #[serde(default)]
    pub id: Option<u64>,
    pub attendee_code: String,
    pub zone_id: String,
    pub event_day: String,
    /// When the attempt was first made (epoch ms). Never changes.
    pub queued_at_ms: u64,
    #[serde(default)]
    pub attempt_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl PendingCheckIn {
    /// Builds an unpersisted queue entry from a request.
    pub fn from_request(request: &CheckInRequest, queued_at_ms: u64) -> Self {
        PendingCheckIn {
            id: None,
            attendee_code: request.attendee_code.clone(),
            zone_id: request.zone_id.clone(),
            event_day: request.event_day.clone(),
            queued_at_ms,
            attempt_count: 0,
            last_attempt_at_ms: None,
            last_error: None,
        }
    }

    /// Rebuilds the wire request for a sync attempt.
    pub fn to_request(&self) -> CheckInRequest {
        CheckInRequest {
            attendee_code: self.attendee_code.clone(),
            zone_id: self.zone_id.clone(),
            event_day: self.event_day.clone(),
        }
    }

    /// Returns a copy carrying the given store id.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Records the outcome of a failed sync attempt.
    pub fn record_attempt(&mut self, at_ms: u64, error: Option<String>) {
        self.attempt_count = self.attempt_count.saturating_add(1);
        self.last_attempt_at_ms = Some(at_ms);
        self.last_error = error;
    }
}

#[cfg(test)]
#[path = "checkin_tests.rs"]
mod tests;
