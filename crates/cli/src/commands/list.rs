// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::Serialize;

use ks_core::PendingCheckIn;

use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;

/// JSON output structure for the list command.
#[derive(Serialize)]
struct ListOutputJson<'a> {
    count: usize,
    pending: &'a [PendingCheckIn],
}

pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let items = ctx.open_store()?.list_all()?;
    match output {
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No pending check-ins");
            }
            for item in &items {
                println!("{}", format_item_line(item));
            }
        }
        OutputFormat::Json => println!("{}", format_json(&items)?),
    }
    Ok(())
}

pub fn format_json(items: &[PendingCheckIn]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ListOutputJson { count: items.len(), pending: items })?)
}

/// `#3  ATT-001  zone1  2024-05-01  queued 2024-05-01 08:00:00  attempts 2 (last error: ...)`
pub fn format_item_line(item: &PendingCheckIn) -> String {
    let id = item.id.map(|id| format!("#{}", id)).unwrap_or_else(|| "#?".to_string());
    let mut line = format!(
        "{}  {}  {}  {}  queued {}",
        id,
        item.attendee_code,
        item.zone_id,
        item.event_day,
        format_timestamp(item.queued_at_ms)
    );
    if item.attempt_count > 0 {
        line.push_str(&format!("  attempts {}", item.attempt_count));
        if let Some(at) = item.last_attempt_at_ms {
            line.push_str(&format!(", last {}", format_timestamp(at)));
        }
        if let Some(error) = &item.last_error {
            line.push_str(&format!(" ({})", error));
        }
    }
    line
}

fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
