// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ksrs - Command line front end for the offline-first check-in engine.
//!
//! This crate provides the `kiosk` CLI: configuration discovery, logging
//! setup and one command per engine operation.
//!
//! # Main Components
//!
//! - [`Config`] - Kiosk configuration (`.kiosk/config.toml`)
//! - [`Cli`] / [`Command`] - Argument parsing
//! - [`Error`] - Error types for all operations
//!
//! ```rust,ignore
//! use ksrs::{find_kiosk_dir, Config};
//!
//! let kiosk_dir = find_kiosk_dir()?;
//! let config = Config::load(&kiosk_dir)?;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, OutputFormat};
pub use commands::Context;
pub use config::{find_kiosk_dir, init_kiosk_dir, Config};
pub use error::{Error, Result};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let Cli { config, verbose, command } = cli;

    match command {
        Command::Init { server, store, token, path } => {
            logging::setup_logging(verbose, None);
            commands::init::run(server, store, token, path)
        }
        command => {
            let ctx = Context::load(config.as_deref())?;
            logging::setup_logging(verbose, ctx.log_file().as_deref());
            dispatch(&ctx, command)
        }
    }
}

fn dispatch(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Init { .. } => Err(Error::AlreadyInitialized(ctx.kiosk_dir.display().to_string())),
        Command::Submit { attendee_code, zone, day, offline } => {
            commands::submit::run(ctx, &attendee_code, &zone, &day, offline)
        }
        Command::Pending => commands::pending::run(ctx),
        Command::List { output } => commands::list::run(ctx, output),
        Command::Sync => commands::sync::run(ctx),
        Command::Clear { yes } => commands::clear::run(ctx, yes),
        Command::Watch => commands::watch::run(ctx),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
