//! Status API server setup.
//!
//! # Responsibilities
//! - Build the application state (monitor, recovery coordinator) from config
//! - Create the Axum router with middleware
//! - Swap in a rebuilt application on reload
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;
use arc_swap::ArcSwap;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::MonitorConfig;
use crate::health::listeners::Subscription;
use crate::health::monitor::{ConnectionMonitor, MonitorSettings};
use crate::health::prober::HttpProber;
use crate::health::types::ProbeError;
use crate::host::HostSignals;
use crate::recovery::{RecoveryCoordinator, Reloader};

/// Everything rebuilt on reload.
pub struct AppInner {
    pub config: MonitorConfig,
    pub monitor: ConnectionMonitor<HttpProber>,
    pub recovery: Arc<RecoveryCoordinator>,
    _recovery_subscription: Subscription,
}

impl AppInner {
    /// Wire a monitor and recovery coordinator for `config`. Monitoring is
    /// not started.
    pub fn build(
        config: MonitorConfig,
        host: Arc<HostSignals>,
        reloader: Arc<dyn Reloader>,
    ) -> Result<Self, ProbeError> {
        let prober = HttpProber::new(config.probe.clone(), config.backend.clone())?;
        let monitor = ConnectionMonitor::with_host(prober, MonitorSettings::from(&config.probe), host);

        let recovery = Arc::new(RecoveryCoordinator::new(config.recovery.retry_budget, reloader));
        let recovery_subscription = recovery.follow(&monitor);

        Ok(Self {
            config,
            monitor,
            recovery,
            _recovery_subscription: recovery_subscription,
        })
    }
}

impl std::fmt::Debug for AppInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppInner")
            .field("monitor", &self.monitor)
            .field("recovery", &self.recovery)
            .finish()
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<AppInner>>,
    pub host: Arc<HostSignals>,
    pub reloader: Arc<dyn Reloader>,
}

impl AppState {
    pub fn new(inner: AppInner, host: Arc<HostSignals>, reloader: Arc<dyn Reloader>) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(inner)),
            host,
            reloader,
        }
    }

    /// Build a fresh application for `config` and swap it in. The previous
    /// monitor is stopped; the new one starts monitoring.
    pub fn rebuild(&self, config: MonitorConfig) -> Result<(), ProbeError> {
        let next = AppInner::build(config, self.host.clone(), self.reloader.clone())?;
        next.monitor.start_monitoring();

        let previous = self.inner.swap(Arc::new(next));
        previous.monitor.stop_monitoring();

        tracing::info!("Application rebuilt");
        Ok(())
    }

    /// Current configuration.
    pub fn config(&self) -> MonitorConfig {
        self.inner.load().config.clone()
    }
}

/// HTTP server exposing the monitor and recovery panel.
pub struct StatusServer {
    router: Router,
}

impl StatusServer {
    pub fn new(state: AppState) -> Self {
        let request_timeout = Duration::from_secs(state.config().listener.request_timeout_secs);
        let router = Self::build_router(state, request_timeout);
        Self { router }
    }

    #[allow(deprecated)]
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        setup_admin_router(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Status API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Status API stopped");
        Ok(())
    }
}
