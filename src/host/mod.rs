//! Host connectivity signals.
//!
//! # Responsibilities
//! - Report whether the host currently believes it is online
//! - Notify subscribers when the host reports a change
//!
//! # Design Decisions
//! - Host signals are authoritative and override probe-derived state
//! - `HostSignals` broadcasts every report; deduplication is the
//!   classifier's job
//! - The native daemon feeds `HostSignals` from the status API, so OS network
//!   hooks can forward up/down events

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::config::HostConfig;
use crate::health::listeners::{Listeners, Subscription};

/// Capability the monitor uses to follow host connectivity.
pub trait HostConnectivity: Send + Sync {
    /// The host's current view of connectivity.
    fn is_online(&self) -> bool;

    /// Register for connectivity reports (`true` = online).
    fn on_change(&self, callback: Box<dyn Fn(bool) + Send + Sync>) -> Subscription;

    /// Optional link classification (e.g. "wifi", "ethernet").
    fn network_type(&self) -> Option<String> {
        None
    }
}

/// Manually driven host connectivity source.
#[derive(Debug)]
pub struct HostSignals {
    online: AtomicBool,
    network_type: Mutex<Option<String>>,
    listeners: Listeners<bool>,
}

impl HostSignals {
    pub fn new(initially_online: bool) -> Self {
        Self {
            online: AtomicBool::new(initially_online),
            network_type: Mutex::new(None),
            listeners: Listeners::new(),
        }
    }

    /// Seed from configuration. An OS hook is expected to report the real
    /// state once it is known.
    pub fn from_config(config: &HostConfig) -> Self {
        let host = Self::new(config.initially_online);
        host.set_network_type(config.network_type.clone());
        host
    }

    /// Record and broadcast a connectivity report.
    pub fn report(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        tracing::info!(online, "Host connectivity reported");
        self.listeners.notify(online);
    }

    pub fn set_network_type(&self, network_type: Option<String>) {
        *self
            .network_type
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = network_type;
    }
}

impl Default for HostSignals {
    fn default() -> Self {
        Self::new(true)
    }
}

impl HostConnectivity for HostSignals {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn on_change(&self, callback: Box<dyn Fn(bool) + Send + Sync>) -> Subscription {
        self.listeners.subscribe(move |online| callback(online))
    }

    fn network_type(&self) -> Option<String> {
        self.network_type
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
