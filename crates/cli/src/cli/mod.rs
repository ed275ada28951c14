// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ks_core::StoreKind;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Parse a `YYYY-MM-DD` event day.
fn event_day(s: &str) -> Result<String, String> {
    ks_core::checkin::validate_event_day(s.trim())
        .map(|_| s.trim().to_string())
        .map_err(|e| e.to_string())
}

fn store_kind(s: &str) -> Result<StoreKind, String> {
    s.parse::<StoreKind>().map_err(|e| e.to_string())
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "kiosk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first zone check-in for event kiosks")]
#[command(
    long_about = "Offline-first zone check-in for event kiosks.\n\n\
    Check-ins that cannot reach the server are queued locally and synced once the \
    connection comes back."
)]
pub struct Cli {
    /// Use this config file instead of searching for .kiosk/config.toml
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log debug output (RUST_LOG overrides)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create .kiosk/config.toml in the current directory
    #[command(after_help = "\
Examples:
  kiosk init --server https://api.example.com
  kiosk init --server https://api.example.com --store sqlite --token s3cret")]
    Init {
        /// Check-in server base URL
        #[arg(long, value_parser = non_empty_string)]
        server: String,

        /// Queue backend (jsonl, sqlite, memory)
        #[arg(long, default_value = "jsonl", value_parser = store_kind)]
        store: StoreKind,

        /// Bearer token for the check-in endpoint
        #[arg(long)]
        token: Option<String>,

        /// Directory to initialize (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Check an attendee into a zone, queueing it when offline
    #[command(after_help = "\
Examples:
  kiosk submit ATT-001 --zone hall-a --day 2024-05-01
  kiosk submit ATT-001 --zone hall-a --day 2024-05-01 --offline")]
    Submit {
        /// Attendee code (badge or QR content)
        #[arg(value_parser = non_empty_string)]
        attendee_code: String,

        /// Zone id
        #[arg(long, short, value_parser = non_empty_string)]
        zone: String,

        /// Event day (YYYY-MM-DD)
        #[arg(long, short, value_parser = event_day)]
        day: String,

        /// Queue without contacting the server
        #[arg(long)]
        offline: bool,
    },

    /// Print the number of queued check-ins
    Pending,

    /// List queued check-ins with their attempt history
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Sync queued check-ins now
    Sync,

    /// Drop every queued check-in
    Clear {
        /// Confirm the clear
        #[arg(long)]
        yes: bool,
    },

    /// Sync automatically whenever the server becomes reachable (Ctrl-C to stop)
    Watch,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
