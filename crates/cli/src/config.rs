// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Kiosk configuration management.
//!
//! Configuration is stored in `.kiosk/config.toml`. Every section is
//! optional and falls back to defaults, except `server.base_url`, which
//! `kiosk init` always writes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ks_core::StoreKind;
use ks_sync::{HttpClientConfig, ProbeConfig, SyncSettings};

use crate::error::{Error, Result};

pub const KIOSK_DIR_NAME: &str = ".kiosk";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Kiosk configuration stored in `.kiosk/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Check-in server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL, e.g. `https://api.example.com`.
    #[serde(default)]
    pub base_url: String,
    /// Bearer token for the check-in endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: String::new(),
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Pending queue settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    /// Queue file, relative to `.kiosk/` unless absolute. Defaults to the
    /// kind's usual file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Orchestrator timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_display_window_ms")]
    pub display_window_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            debounce_ms: default_debounce_ms(),
            display_window_ms: default_display_window_ms(),
        }
    }
}

/// How connectivity is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityKind {
    /// Periodic TCP connect to the server.
    #[default]
    Tcp,
    /// Assume the server is always reachable.
    AlwaysOnline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    #[serde(default)]
    pub kind: ConnectivityKind,
    /// `host:port` to probe. Derived from `server.base_url` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_addr: Option<String>,
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        ConnectivityConfig {
            kind: ConnectivityKind::default(),
            probe_addr: None,
            probe_interval_ms: default_probe_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log file, relative to `.kiosk/` unless absolute. Logs go to stderr
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_debounce_ms() -> u64 {
    2_000
}

fn default_display_window_ms() -> u64 {
    5_000
}

fn default_probe_interval_ms() -> u64 {
    5_000
}

fn default_probe_timeout_ms() -> u64 {
    1_500
}

impl Config {
    /// Creates a config pointing at the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Config {
            server: ServerConfig { base_url: base_url.into(), ..ServerConfig::default() },
            ..Config::default()
        }
    }

    /// Loads configuration from the given `.kiosk/` directory.
    pub fn load(kiosk_dir: &Path) -> Result<Self> {
        Self::load_file(&kiosk_dir.join(CONFIG_FILE_NAME))
    }

    /// Loads and validates a configuration file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the given `.kiosk/` directory.
    pub fn save(&self, kiosk_dir: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(kiosk_dir.join(CONFIG_FILE_NAME), content)?;
        Ok(())
    }

    /// Checks values that would otherwise fail later at runtime.
    pub fn validate(&self) -> Result<()> {
        let url = self.server.base_url.trim();
        if url.is_empty() {
            return Err(Error::Config("server.base_url is required".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "server.base_url '{}' must start with http:// or https://",
                url
            )));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(Error::Config("server.request_timeout_secs must be positive".to_string()));
        }
        if self.connectivity.kind == ConnectivityKind::Tcp {
            if self.connectivity.probe_interval_ms == 0 || self.connectivity.probe_timeout_ms == 0 {
                return Err(Error::Config(
                    "connectivity probe interval and timeout must be positive".to_string(),
                ));
            }
            self.probe_addr()?;
        }
        Ok(())
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: self.server.base_url.trim().to_string(),
            api_token: self.server.api_token.clone(),
            timeout: Duration::from_secs(self.server.request_timeout_secs),
        }
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            debounce: Duration::from_millis(self.sync.debounce_ms),
            display_window: Duration::from_millis(self.sync.display_window_ms),
        }
    }

    pub fn probe_config(&self) -> Result<ProbeConfig> {
        Ok(ProbeConfig {
            addr: self.probe_addr()?,
            interval: Duration::from_millis(self.connectivity.probe_interval_ms),
            timeout: Duration::from_millis(self.connectivity.probe_timeout_ms),
        })
    }

    /// The probe address, falling back to the server's host and port.
    pub fn probe_addr(&self) -> Result<String> {
        match &self.connectivity.probe_addr {
            Some(addr) => Ok(addr.clone()),
            None => addr_from_url(&self.server.base_url),
        }
    }

    /// Path of the queue file.
    pub fn store_path(&self, kiosk_dir: &Path) -> PathBuf {
        match &self.store.path {
            Some(path) => resolve(kiosk_dir, path),
            None => kiosk_dir.join(self.store.kind.default_file_name()),
        }
    }

    pub fn log_file(&self, kiosk_dir: &Path) -> Option<PathBuf> {
        self.logging.file.as_deref().map(|file| resolve(kiosk_dir, file))
    }
}

/// `https://host:8443/x` -> `host:8443`, `https://host` -> `host:443`.
fn addr_from_url(url: &str) -> Result<String> {
    let url = url.trim();
    let (rest, default_port) = if let Some(rest) = url.strip_prefix("https://") {
        (rest, 443)
    } else if let Some(rest) = url.strip_prefix("http://") {
        (rest, 80)
    } else {
        return Err(Error::Config(format!("cannot derive probe address from '{}'", url)));
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    if host_port.is_empty() {
        return Err(Error::Config(format!("cannot derive probe address from '{}'", url)));
    }

    // Bracketed IPv6 literals carry colons of their own
    let has_port = match host_port.rfind(']') {
        Some(end) => host_port[end..].contains(':'),
        None => host_port.contains(':'),
    };
    if has_port {
        Ok(host_port.to_string())
    } else {
        Ok(format!("{}:{}", host_port, default_port))
    }
}

/// Resolves a configured path: `~/` is the home directory, relative paths
/// are relative to `.kiosk/`.
fn resolve(kiosk_dir: &Path, path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        kiosk_dir.join(path)
    }
}

/// Find the .kiosk directory by walking up from the current directory
pub fn find_kiosk_dir() -> Result<PathBuf> {
    find_kiosk_dir_from(&std::env::current_dir()?)
}

/// Find the .kiosk directory by walking up from `start`
pub fn find_kiosk_dir_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let kiosk_dir = current.join(KIOSK_DIR_NAME);
        if kiosk_dir.is_dir() {
            return Ok(kiosk_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Initialize a new .kiosk directory at the given path
pub fn init_kiosk_dir(path: &Path, config: &Config) -> Result<PathBuf> {
    let kiosk_dir = path.join(KIOSK_DIR_NAME);

    if kiosk_dir.exists() {
        return Err(Error::AlreadyInitialized(kiosk_dir.display().to_string()));
    }

    config.validate()?;
    fs::create_dir_all(&kiosk_dir)?;
    config.save(&kiosk_dir)?;

    Ok(kiosk_dir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
