//! Probe outcomes, errors, and the connection snapshot exposed to callers.

use std::time::Duration;
use serde::Serialize;
use thiserror::Error;

/// Why a probe did not reach its endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// DNS, connect, TLS, or other transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The probe exceeded its local deadline.
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    /// Required configuration (e.g. backend base URL) is missing.
    #[error("not configured: {0}")]
    NotConfigured(&'static str),

    /// The endpoint answered with a status that does not count as reachable.
    #[error("unexpected status {0}")]
    Status(u16),
}

/// Result type for probe operations.
pub type ProbeResult = Result<(), ProbeError>;

/// Result of a single guarded connection check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The minimum interval since the previous probe has not elapsed.
    Skipped,
    /// The probe reached the endpoint.
    Reachable,
    /// The probe failed.
    Unreachable,
    /// Monitoring stopped while the probe was in flight; result dropped.
    Discarded,
}

/// Snapshot of the monitor's view of connectivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub is_online: bool,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
}
