//! Connection health monitor.
//!
//! # Responsibilities
//! - Own the probe scheduler and its stop handle
//! - Feed probe outcomes and host signals into the classifier
//! - Deliver state transitions to subscribers, in detection order
//! - Answer connection queries from the rest of the application
//!
//! # Design Decisions
//! - One instance per running application, constructed by the composition
//!   root and shared by cloning the handle
//! - The state mutex is held only for read-modify-write, never across a probe
//! - Probe results are applied only if no start/stop happened while the probe
//!   was in flight (epoch guard)
//! - Transitions are queued under the state lock and drained by a single
//!   deliverer outside it, so callbacks may query or drive the monitor
//! - Delivery is synchronous for the caller that triggers it. If a second
//!   thread produces a transition while another is draining, the second
//!   call returns at once and the draining thread delivers its transition
//!   right after the current one. Subscribers always see transitions in
//!   detection order, but that second caller may return before they do.
//! - Scheduled probes are attributed to their tick deadline, so the skip
//!   guard never drops a tick because the task woke late

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::ProbeConfig;
use crate::health::active::ProbeScheduler;
use crate::health::listeners::{Listeners, Subscription};
use crate::health::prober::{HttpProber, Prober};
use crate::health::state::Classifier;
use crate::health::types::{CheckOutcome, ConnectionInfo};
use crate::host::HostConnectivity;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Timing and threshold settings for the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Probe cadence and minimum gap between two probes.
    pub interval: Duration,
    /// Delay before the first scheduled probe.
    pub initial_delay: Duration,
    /// Consecutive failures before going offline.
    pub failure_threshold: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from(&ProbeConfig::default())
    }
}

impl From<&ProbeConfig> for MonitorSettings {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            interval: config.interval(),
            initial_delay: config.initial_delay(),
            failure_threshold: config.failure_threshold,
        }
    }
}

struct MonitorState {
    is_monitoring: bool,
    epoch: u64,
    last_probe: Option<Instant>,
    classifier: Classifier,
    stop: Option<Shutdown>,
    pending: VecDeque<bool>,
    draining: bool,
}

struct Inner<P> {
    prober: P,
    settings: MonitorSettings,
    state: Mutex<MonitorState>,
    listeners: Listeners<bool>,
    host: Option<Arc<dyn HostConnectivity>>,
    host_subscription: Mutex<Option<Subscription>>,
}

/// Handle to the shared connection monitor.
pub struct ConnectionMonitor<P: Prober = HttpProber> {
    inner: Arc<Inner<P>>,
}

impl<P: Prober> Clone for ConnectionMonitor<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P: Prober> std::fmt::Debug for ConnectionMonitor<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("ConnectionMonitor")
            .field("is_monitoring", &state.is_monitoring)
            .field("state", &state.classifier.state())
            .field("consecutive_failures", &state.classifier.consecutive_failures())
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

impl<P: Prober> ConnectionMonitor<P> {
    /// Create a monitor without a host connectivity source.
    pub fn new(prober: P, settings: MonitorSettings, initially_online: bool) -> Self {
        Self::build(prober, settings, initially_online, None)
    }

    /// Create a monitor that starts from, and follows, the host's connectivity.
    pub fn with_host(prober: P, settings: MonitorSettings, host: Arc<dyn HostConnectivity>) -> Self {
        let monitor = Self::build(prober, settings, host.is_online(), Some(host.clone()));

        let weak = Arc::downgrade(&monitor.inner);
        let subscription = host.on_change(Box::new(move |online: bool| {
            if let Some(inner) = weak.upgrade() {
                ConnectionMonitor { inner }.handle_host_event(online);
            }
        }));
        *monitor
            .inner
            .host_subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(subscription);

        monitor
    }

    fn build(
        prober: P,
        settings: MonitorSettings,
        initially_online: bool,
        host: Option<Arc<dyn HostConnectivity>>,
    ) -> Self {
        metrics::record_connection_state(initially_online);
        Self {
            inner: Arc::new(Inner {
                prober,
                settings,
                state: Mutex::new(MonitorState {
                    is_monitoring: false,
                    epoch: 0,
                    last_probe: None,
                    classifier: Classifier::new(initially_online, settings.failure_threshold),
                    stop: None,
                    pending: VecDeque::new(),
                    draining: false,
                }),
                listeners: Listeners::new(),
                host,
                host_subscription: Mutex::new(None),
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, MonitorState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> MonitorSettings {
        self.inner.settings
    }

    pub fn prober(&self) -> &P {
        &self.inner.prober
    }

    /// Start periodic probing. Does nothing if already monitoring.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_monitoring(&self) {
        let stop = {
            let mut state = self.lock_state();
            if state.is_monitoring {
                return;
            }
            state.is_monitoring = true;
            state.epoch += 1;

            let shutdown = Shutdown::new();
            let stop = shutdown.subscribe();
            state.stop = Some(shutdown);
            stop
        };

        let settings = self.inner.settings;
        tracing::info!(
            interval = ?settings.interval,
            initial_delay = ?settings.initial_delay,
            failure_threshold = settings.failure_threshold,
            "Connection monitoring started"
        );

        let scheduler = ProbeScheduler::new(self.clone(), settings.initial_delay, settings.interval);
        tokio::spawn(scheduler.run(stop));
    }

    /// Stop periodic probing. In-flight probes finish, but their results are
    /// discarded.
    pub fn stop_monitoring(&self) {
        let stop = {
            let mut state = self.lock_state();
            if !state.is_monitoring {
                return;
            }
            state.is_monitoring = false;
            state.epoch += 1;
            state.stop.take()
        };

        if let Some(stop) = stop {
            stop.trigger();
        }
        tracing::info!("Connection monitoring stopped");
    }

    pub fn is_monitoring(&self) -> bool {
        self.lock_state().is_monitoring
    }

    /// Run one generic probe, unless the previous one was less than an
    /// interval ago.
    pub async fn check_connection(&self) -> CheckOutcome {
        self.check_connection_at(Instant::now()).await
    }

    /// Run one generic probe attributed to `at`.
    ///
    /// The scheduler passes its tick deadline here, so consecutive scheduled
    /// probes are always a full interval apart regardless of wake-up latency.
    pub(crate) async fn check_connection_at(&self, at: Instant) -> CheckOutcome {
        let epoch = {
            let mut state = self.lock_state();
            if let Some(last) = state.last_probe {
                let elapsed = at.duration_since(last);
                if elapsed < self.inner.settings.interval {
                    tracing::debug!(elapsed = ?elapsed, "Probe skipped: minimum interval not elapsed");
                    return CheckOutcome::Skipped;
                }
            }
            state.last_probe = Some(at);
            state.epoch
        };

        let result = self.inner.prober.probe_generic().await;

        let mut state = self.lock_state();
        if state.epoch != epoch {
            tracing::debug!("Probe result discarded: monitoring stopped or restarted mid-probe");
            return CheckOutcome::Discarded;
        }

        let (notification, outcome) = match result {
            Ok(()) => (state.classifier.record_success(), CheckOutcome::Reachable),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    consecutive_failures = state.classifier.consecutive_failures() + 1,
                    "Connection probe failed"
                );
                (state.classifier.record_failure(), CheckOutcome::Unreachable)
            }
        };
        metrics::record_consecutive_failures(state.classifier.consecutive_failures());

        self.deliver(state, notification);
        outcome
    }

    /// Apply an authoritative host connectivity report.
    pub fn handle_host_event(&self, online: bool) {
        let mut state = self.lock_state();
        let notification = if online {
            state.classifier.host_online()
        } else {
            state.classifier.host_offline()
        };
        metrics::record_consecutive_failures(state.classifier.consecutive_failures());

        self.deliver(state, notification);
    }

    /// Queue a transition and, unless another caller is already delivering,
    /// drain the queue outside the state lock.
    fn deliver(&self, mut state: MutexGuard<'_, MonitorState>, notification: Option<bool>) {
        let Some(online) = notification else {
            return;
        };
        state.pending.push_back(online);
        if state.draining {
            return;
        }
        state.draining = true;
        drop(state);

        loop {
            let next = {
                let mut state = self.lock_state();
                match state.pending.pop_front() {
                    Some(online) => online,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };

            metrics::record_connection_state(next);
            let delivered = self.inner.listeners.notify(next);
            tracing::debug!(online = next, listeners = delivered, "Connection state delivered");
        }
    }

    /// Register for state transitions. The callback receives the new online
    /// state; it is not called for probes that leave the state unchanged.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(callback)
    }

    pub fn connection_info(&self) -> ConnectionInfo {
        let (is_online, consecutive_failures) = {
            let state = self.lock_state();
            (
                state.classifier.is_online(),
                state.classifier.consecutive_failures(),
            )
        };

        ConnectionInfo {
            is_online,
            consecutive_failures,
            network_type: self.inner.host.as_ref().and_then(|h| h.network_type()),
        }
    }

    /// Probe the backend once. Does not affect the online/offline state.
    pub async fn test_backend_connection(&self) -> bool {
        match self.inner.prober.probe_backend().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Backend connection test failed");
                false
            }
        }
    }
}
