// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity observation.
//!
//! A [`ConnectivityObserver`] publishes a boolean "online" signal through a
//! `tokio::sync::watch` channel. Before any measurement the value is `true`:
//! the first real attempt decides, and a failed attempt only costs a queued
//! item.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::remote::BoxFuture;

/// Source of the online/offline signal.
pub trait ConnectivityObserver: Send + Sync {
    /// Subscribes to connectivity changes. The receiver starts with the
    /// current value.
    fn subscribe(&self) -> watch::Receiver<bool>;

    /// Takes a fresh measurement, publishes it and returns it.
    fn check_now(&self) -> BoxFuture<'_, bool>;
}

impl<O: ConnectivityObserver + ?Sized> ConnectivityObserver for Arc<O> {
    fn subscribe(&self) -> watch::Receiver<bool> {
        (**self).subscribe()
    }

    fn check_now(&self) -> BoxFuture<'_, bool> {
        (**self).check_now()
    }
}

/// Connectivity driven by the embedding application.
///
/// Also serves as the "always online" observer when nothing ever calls
/// [`ManualConnectivity::set_online`].
pub struct ManualConnectivity {
    tx: watch::Sender<bool>,
}

impl ManualConnectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        ManualConnectivity { tx }
    }

    /// Publishes a new value. Subscribers are only woken on a change.
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ManualConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityObserver for ManualConnectivity {
    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    fn check_now(&self) -> BoxFuture<'_, bool> {
        let online = self.is_online();
        Box::pin(async move { online })
    }
}

/// Configuration for [`TcpProbeConnectivity`].
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// `host:port` to connect to.
    pub addr: String,
    /// Delay between probes.
    pub interval: Duration,
    /// Connect timeout for a single probe.
    pub timeout: Duration,
}

impl ProbeConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        ProbeConfig {
            addr: addr.into(),
            interval: Duration::from_secs(5),
            timeout: Duration::from_millis(1500),
        }
    }
}

/// Connectivity measured by periodically opening a TCP connection.
///
/// The background probe task runs until [`TcpProbeConnectivity::stop`] is
/// called or the observer is dropped.
pub struct TcpProbeConnectivity {
    config: ProbeConfig,
    tx: Arc<watch::Sender<bool>>,
    cancel_token: CancellationToken,
}

impl TcpProbeConnectivity {
    /// Starts probing in the background. Must be called inside a tokio
    /// runtime.
    pub fn spawn(config: ProbeConfig) -> Self {
        let (tx, _) = watch::channel(true);
        let tx = Arc::new(tx);
        let cancel_token = CancellationToken::new();

        let task_config = config.clone();
        let task_tx = Arc::clone(&tx);
        let task_cancel = cancel_token.clone();
        tokio::spawn(async move {
            probe_loop(task_config, task_tx, task_cancel).await;
        });

        TcpProbeConnectivity { config, tx, cancel_token }
    }

    /// Stops the background probe. The last published value stays.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }
}

impl ConnectivityObserver for TcpProbeConnectivity {
    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    fn check_now(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let online = probe(&self.config).await;
            publish(&self.tx, online);
            online
        })
    }
}

impl Drop for TcpProbeConnectivity {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn probe_loop(
    config: ProbeConfig,
    tx: Arc<watch::Sender<bool>>,
    cancel_token: CancellationToken,
) {
    loop {
        let online = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            online = probe(&config) => online,
        };
        publish(&tx, online);

        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
    tracing::debug!(addr = %config.addr, "connectivity probe stopped");
}

/// One connection attempt bounded by the probe timeout.
async fn probe(config: &ProbeConfig) -> bool {
    match tokio::time::timeout(config.timeout, TcpStream::connect(config.addr.as_str())).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::trace!(addr = %config.addr, error = %e, "probe failed");
            false
        }
        Err(_) => {
            tracing::trace!(addr = %config.addr, "probe timed out");
            false
        }
    }
}

/// Publishes `online`, waking subscribers only on a change.
fn publish(tx: &watch::Sender<bool>, online: bool) {
    let changed = tx.send_if_modified(|current| {
        if *current == online {
            false
        } else {
            *current = online;
            true
        }
    });
    if changed {
        tracing::info!(online, "connectivity changed");
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
