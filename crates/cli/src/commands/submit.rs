// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ks_core::CheckInRequest;
use ks_sync::SubmitOutcome;

use super::{block_on, Context};
use crate::error::Result;

pub fn run(ctx: &Context, attendee_code: &str, zone: &str, day: &str, offline: bool) -> Result<()> {
    let outcome = execute(ctx, CheckInRequest::new(attendee_code, zone, day)?, offline)?;
    println!("{}", format_outcome(&outcome));
    Ok(())
}

/// Submits through the coordinator. Unless `offline`, a fresh connectivity
/// check decides whether the server is tried first.
pub fn execute(ctx: &Context, request: CheckInRequest, offline: bool) -> Result<SubmitOutcome> {
    block_on(submit(ctx, request, offline))?
}

async fn submit(ctx: &Context, request: CheckInRequest, offline: bool) -> Result<SubmitOutcome> {
    let coordinator = ctx.coordinator()?;
    let online = if offline { false } else { ctx.observer()?.check_now().await };
    Ok(coordinator.submit(request, online).await?)
}

pub fn format_outcome(outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Delivered(response) => {
            let mut line = String::from("checked in");
            if let Some(attendee) = &response.attendee {
                let name = [attendee.first_name.as_deref(), attendee.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                if !name.is_empty() {
                    line.push_str(&format!(": {}", name));
                }
            }
            if let Some(zone) = &response.zone {
                line.push_str(&format!(" @ {}", zone.name));
            }
            if response.packet_delivered {
                line.push_str(" (packet delivered)");
            }
            line
        }
        SubmitOutcome::Queued { id, reason: None } => format!("queued #{} (offline)", id),
        SubmitOutcome::Queued { id, reason: Some(reason) } => format!("queued #{} ({})", id, reason),
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
