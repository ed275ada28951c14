// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod init;
pub mod list;
pub mod pending;
pub mod submit;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod watch;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ks_core::{open_store, PendingStore};
use ks_sync::{
    CheckInClient, ConnectivityObserver, Coordinator, HttpCheckInClient, ManualConnectivity,
    SyncOrchestrator, TcpProbeConnectivity,
};

use crate::config::{find_kiosk_dir, ConnectivityKind, Config};
use crate::error::{Error, Result};

/// A loaded kiosk configuration and the directory it lives in.
#[derive(Debug, Clone)]
pub struct Context {
    pub kiosk_dir: PathBuf,
    pub config: Config,
}

impl Context {
    /// Loads the config at `config_path`, or finds `.kiosk/` by walking up
    /// from the current directory.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => {
                let config = Config::load_file(path)?;
                let kiosk_dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                Ok(Context { kiosk_dir, config })
            }
            None => {
                let kiosk_dir = find_kiosk_dir()?;
                let config = Config::load(&kiosk_dir)?;
                Ok(Context { kiosk_dir, config })
            }
        }
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.config.log_file(&self.kiosk_dir)
    }

    pub fn open_store(&self) -> Result<Arc<dyn PendingStore>> {
        let path = self.config.store_path(&self.kiosk_dir);
        Ok(open_store(self.config.store.kind, &path)?)
    }

    pub fn client(&self) -> Result<Arc<dyn CheckInClient>> {
        Ok(Arc::new(HttpCheckInClient::new(self.config.http_client_config())?))
    }

    pub fn coordinator(&self) -> Result<Coordinator> {
        Ok(Coordinator::new(self.open_store()?, self.client()?))
    }

    /// Builds the configured connectivity observer. The TCP probe spawns a
    /// task, so this must run inside the runtime.
    pub fn observer(&self) -> Result<Arc<dyn ConnectivityObserver>> {
        let observer: Arc<dyn ConnectivityObserver> = match self.config.connectivity.kind {
            ConnectivityKind::AlwaysOnline => Arc::new(ManualConnectivity::new(true)),
            ConnectivityKind::Tcp => Arc::new(TcpProbeConnectivity::spawn(self.config.probe_config()?)),
        };
        Ok(observer)
    }

    /// Builds an orchestrator over the configured collaborators. Must run
    /// inside the runtime.
    pub fn orchestrator(&self) -> Result<SyncOrchestrator> {
        Ok(SyncOrchestrator::new(self.coordinator()?, self.observer()?, self.config.sync_settings()))
    }
}

/// Runs a future to completion on a fresh multi-threaded runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))?;
    Ok(runtime.block_on(future))
}
