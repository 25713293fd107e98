//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ekaty_probe_total` (counter): probes by kind (generic/backend) and outcome
//! - `ekaty_connection_online` (gauge): 1=online, 0=offline
//! - `ekaty_consecutive_failures` (gauge): current probe failure streak
//! - `ekaty_recovery_retries_total` (counter): user-initiated retries by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter is opt-in via config

use std::net::SocketAddr;
use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(kind: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("ekaty_probe_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_connection_state(online: bool) {
    gauge!("ekaty_connection_online").set(if online { 1.0 } else { 0.0 });
}

pub fn record_consecutive_failures(failures: u32) {
    gauge!("ekaty_consecutive_failures").set(f64::from(failures));
}

pub fn record_retry(recovered: bool) {
    let outcome = if recovered { "recovered" } else { "failed" };
    counter!("ekaty_recovery_retries_total", "outcome" => outcome).increment(1);
}
