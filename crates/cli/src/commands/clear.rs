// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::error::{Error, Result};

pub fn run(ctx: &Context, yes: bool) -> Result<()> {
    let cleared = execute(ctx, yes)?;
    if cleared == 0 {
        println!("No pending check-ins");
    } else {
        println!("Cleared {} pending check-in(s)", cleared);
    }
    Ok(())
}

/// Clears the queue, returning how many items were dropped. Refuses to
/// drop anything without `yes`.
pub fn execute(ctx: &Context, yes: bool) -> Result<usize> {
    let coordinator = ctx.coordinator()?;
    let count = coordinator.pending_count()?;
    if count == 0 {
        return Ok(0);
    }
    if !yes {
        return Err(Error::ConfirmationRequired(count));
    }
    coordinator.clear()?;
    Ok(count)
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
