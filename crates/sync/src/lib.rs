// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ks-sync: Offline-first check-in synchronization engine
//!
//! # Main Components
//!
//! - [`Coordinator`] - submits check-ins, queueing them when the server is out of reach
//! - [`SyncOrchestrator`] - drains the queue on reconnect or on demand, one drain at a time
//! - [`ConnectivityObserver`] - online/offline signal ([`ManualConnectivity`], [`TcpProbeConnectivity`])
//! - [`CheckInClient`] - the server boundary ([`HttpCheckInClient`])
//!
//! ```rust,ignore
//! let store = ks_core::open_store(StoreKind::Jsonl, &path)?;
//! let client = Arc::new(HttpCheckInClient::new(HttpClientConfig::new(url))?);
//! let coordinator = Coordinator::new(store, client);
//! let orchestrator = SyncOrchestrator::new(coordinator, observer, SyncSettings::default());
//! orchestrator.start_auto_sync();
//! ```

pub mod connectivity;
pub mod coordinator;
pub mod http;
pub mod orchestrator;
pub mod remote;

#[cfg(test)]
mod test_helpers;

pub use connectivity::{ConnectivityObserver, ManualConnectivity, ProbeConfig, TcpProbeConnectivity};
pub use coordinator::{Coordinator, SubmitOutcome, SyncItemError, SAVED_OFFLINE_PREFIX};
pub use http::{HttpCheckInClient, HttpClientConfig, CHECKIN_PATH, DEFAULT_REQUEST_TIMEOUT};
pub use orchestrator::{SyncOrchestrator, SyncRun, SyncSettings};
pub use remote::{BoxFuture, CheckInClient, RemoteError, RemoteResult};
