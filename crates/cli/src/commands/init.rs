// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use ks_core::{open_store, StoreKind};

use crate::config::{init_kiosk_dir, Config};
use crate::error::Result;

pub fn run(
    server: String,
    store: StoreKind,
    token: Option<String>,
    path: Option<PathBuf>,
) -> Result<()> {
    let target_path = match path {
        Some(p) => p,
        None => std::env::current_dir()?,
    };

    let mut config = Config::new(server.trim());
    config.server.api_token = token;
    config.store.kind = store;

    let kiosk_dir = init_kiosk_dir(&target_path, &config)?;

    // Create the queue up front so permission problems surface now
    if store != StoreKind::Memory {
        open_store(store, &config.store_path(&kiosk_dir))?;
    }

    println!("Initialized kiosk at {}", kiosk_dir.display());
    println!("Server: {}", config.server.base_url);
    println!("Store: {}", store);
    if store == StoreKind::Memory {
        println!("warning: the memory store loses queued check-ins when kiosk exits");
    }

    Ok(())
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
