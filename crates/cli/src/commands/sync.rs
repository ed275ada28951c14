// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ks_core::SyncStatus;
use ks_sync::SyncRun;

use super::{block_on, Context};
use crate::error::{Error, Result};

pub fn run(ctx: &Context) -> Result<()> {
    let run = execute(ctx)?;
    for line in format_run(&run) {
        println!("{}", line);
    }
    match run {
        SyncRun::Finished(SyncStatus::Failed { message }) => Err(Error::SyncFailed(message)),
        _ => Ok(()),
    }
}

/// Runs one manual drain through the orchestrator.
pub fn execute(ctx: &Context) -> Result<SyncRun> {
    block_on(async {
        let orchestrator = ctx.orchestrator()?;
        Ok::<_, Error>(orchestrator.perform_sync().await)
    })?
}

/// Human-readable report of a manual sync. A failed run is reported by
/// the returned error instead.
pub fn format_run(run: &SyncRun) -> Vec<String> {
    match run {
        SyncRun::AlreadySyncing => vec!["sync already running".to_string()],
        SyncRun::NothingPending => vec!["nothing to sync".to_string()],
        SyncRun::Finished(SyncStatus::PartialSuccess { outcome }) => {
            let mut lines = vec![SyncStatus::PartialSuccess { outcome: outcome.clone() }.to_string()];
            lines.extend(outcome.errors.iter().map(|e| format!("  {}", e)));
            lines
        }
        SyncRun::Finished(SyncStatus::Failed { .. }) => Vec::new(),
        SyncRun::Finished(status) => vec![status.to_string()],
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
