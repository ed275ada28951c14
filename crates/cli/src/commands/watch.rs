// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;

use chrono::Local;
use ks_sync::SyncOrchestrator;

use super::{block_on, Context};
use crate::error::{Error, Result};

/// Runs auto-sync until Ctrl-C, printing every status transition.
pub fn run(ctx: &Context) -> Result<()> {
    block_on(watch(ctx))?
}

async fn watch(ctx: &Context) -> Result<()> {
    let orchestrator = ctx.orchestrator()?;
    println!(
        "watching {} ({} pending), Ctrl-C to stop",
        ctx.config.server.base_url,
        orchestrator.pending_count()?
    );

    let ctrl_c = async { tokio::signal::ctrl_c().await.map_err(|e| Error::Runtime(e.to_string())) };
    watch_until(&orchestrator, ctrl_c).await
}

/// Prints status transitions until `stop` resolves, then waits for an
/// in-flight drain to finish.
async fn watch_until<S>(orchestrator: &SyncOrchestrator, stop: S) -> Result<()>
where
    S: Future<Output = Result<()>>,
{
    let mut status_rx = orchestrator.subscribe();
    orchestrator.start_auto_sync();
    tokio::pin!(stop);

    let result = loop {
        tokio::select! {
            stopped = &mut stop => break stopped,
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let status = status_rx.borrow_and_update().clone();
                print_status(&status);
            }
        }
    };

    let draining = orchestrator.status().is_syncing();
    if draining {
        println!("waiting for the current sync to finish");
    }
    orchestrator.shutdown().await;
    if draining {
        print_status(&orchestrator.status());
    }
    tracing::info!("watch stopped");
    result
}

fn print_status(status: &ks_core::SyncStatus) {
    println!("[{}] {}", Local::now().format("%H:%M:%S"), status);
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
