//! eKaty connection health monitor daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                      CONNECTION MONITOR                      │
//!   │                                                              │
//!   │  ┌───────────┐   ┌───────────┐   ┌────────────┐              │
//!   │  │ scheduler │──▶│  prober   │──▶│ classifier │──┐           │
//!   │  │ 5s, 30s   │   │ generic / │   │ 3 failures │  │           │
//!   │  └───────────┘   │ backend   │   └────────────┘  │           │
//!   │                  └───────────┘         ▲         ▼           │
//!   │  host signals ─────────────────────────┘   ┌───────────┐     │
//!   │  (POST /host/*)                            │ listeners │     │
//!   │                                            └─────┬─────┘     │
//!   │                                                  ▼           │
//!   │                               ┌─────────────────────────┐    │
//!   │                               │ recovery coordinator    │    │
//!   │                               │ retry / troubleshoot /  │    │
//!   │                               │ reload escalation       │    │
//!   │                               └─────────────────────────┘    │
//!   │                                                              │
//!   │  config (TOML + env, hot reload)   status API (axum)         │
//!   │  logging (tracing)                 metrics (prometheus)      │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use ekaty_monitor::config::loader::default_config;
use ekaty_monitor::config::watcher::ConfigWatcher;
use ekaty_monitor::config::{load_config, MonitorConfig};
use ekaty_monitor::host::HostSignals;
use ekaty_monitor::http::{AppInner, AppState, StatusServer};
use ekaty_monitor::lifecycle::signals::wait_for_signal;
use ekaty_monitor::lifecycle::Shutdown;
use ekaty_monitor::observability::{logging, metrics};
use ekaty_monitor::recovery::{ChannelReloader, Reloader};

#[derive(Parser)]
#[command(name = "ekaty-monitor")]
#[command(about = "Connection health monitor for eKaty.com", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not watch the configuration file for changes.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    logging::init_logging(&config.observability);
    tracing::info!("ekaty-monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        generic_url = %config.probe.generic_url,
        backend_configured = config.backend.base_url.is_some(),
        interval_secs = config.probe.interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let host = Arc::new(HostSignals::from_config(&config.host));
    let (reloader, mut reload_rx) = ChannelReloader::new();
    let reloader: Arc<dyn Reloader> = Arc::new(reloader);

    let inner = AppInner::build(config.clone(), host.clone(), reloader.clone())?;
    inner.monitor.start_monitoring();
    let state = AppState::new(inner, host, reloader);

    // Keep the watcher handle alive for the lifetime of main.
    let (mut config_updates, _watcher) = match (&args.config, args.no_watch) {
        (Some(path), false) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (Some(rx), Some(handle)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start config watcher");
                    (None, None)
                }
            }
        }
        _ => (None, None),
    };

    let shutdown = Shutdown::new();
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = StatusServer::new(state.clone());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let signal = wait_for_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            _ = &mut signal => break,
            Some(_) = reload_rx.recv() => {
                let config = reload_config(args.config.as_deref(), &state);
                apply(&state, config);
            }
            Some(config) = next_config(&mut config_updates) => {
                apply(&state, config);
            }
        }
    }

    tracing::info!("Shutting down");
    state.inner.load().monitor.stop_monitoring();
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn reload_config(path: Option<&std::path::Path>, state: &AppState) -> MonitorConfig {
    match path.map(load_config) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            tracing::error!(error = %e, "Failed to reload config, reusing current configuration");
            state.config()
        }
        None => state.config(),
    }
}

fn apply(state: &AppState, config: MonitorConfig) {
    if config.listener.bind_address != state.config().listener.bind_address {
        tracing::warn!("listener.bind_address changed; restart required to rebind");
    }
    if let Err(e) = state.rebuild(config) {
        tracing::error!(error = %e, "Failed to rebuild monitor, keeping the running one");
    }
}

async fn next_config(rx: &mut Option<mpsc::UnboundedReceiver<MonitorConfig>>) -> Option<MonitorConfig> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
