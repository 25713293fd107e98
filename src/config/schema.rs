//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Root configuration for the connection monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Status API listener.
    pub listener: ListenerConfig,

    /// Generic reachability probe and scheduling.
    pub probe: ProbeConfig,

    /// Backend reachability probe.
    pub backend: BackendConfig,

    /// Recovery panel settings.
    pub recovery: RecoveryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Status API access control.
    pub admin: AdminConfig,

    /// Host connectivity seed values.
    pub host: HostConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8090").
    pub bind_address: String,

    /// Per-request timeout for the status API in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8090".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Generic probe and scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    /// Operator-independent endpoint answering a trace-style GET.
    pub generic_url: String,

    /// Deadline for the generic probe in seconds.
    pub generic_timeout_secs: u64,

    /// Cadence of the generic probe, also the minimum gap between probes.
    pub interval_secs: u64,

    /// Delay before the first probe after monitoring starts.
    pub initial_delay_secs: u64,

    /// Consecutive failures before the connection is classified offline.
    pub failure_threshold: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            generic_url: "https://1.1.1.1/cdn-cgi/trace".to_string(),
            generic_timeout_secs: 10,
            interval_secs: 30,
            initial_delay_secs: 5,
            failure_threshold: 3,
        }
    }
}

impl ProbeConfig {
    pub fn generic_timeout(&self) -> Duration {
        Duration::from_secs(self.generic_timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

/// Backend probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the hosted backend. Unset means every backend probe fails
    /// without touching the network.
    pub base_url: Option<String>,

    /// API key sent with backend probes.
    pub api_key: Option<String>,

    /// Path appended to `base_url` for the reachability check.
    pub health_path: String,

    /// Deadline for the backend probe in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            health_path: "/rest/v1/".to_string(),
            timeout_secs: 15,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full probe URL, or `None` when no base URL is configured.
    pub fn health_url(&self) -> Option<String> {
        let base = self.base_url.as_deref()?.trim_end_matches('/');
        if base.is_empty() {
            return None;
        }
        let path = self.health_path.trim_start_matches('/');
        Some(format!("{}/{}", base, path))
    }
}

/// Recovery panel configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Retries shown to the user before suggesting a reload. Informational.
    pub retry_budget: u32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self { retry_budget: 5 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Prometheus exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "ekaty_monitor=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Status API access control.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required on state-changing routes. Unset disables auth.
    pub api_key: Option<String>,
}

/// Host connectivity at startup.
///
/// The daemon cannot observe the OS network stack itself. These values seed
/// the host state until an OS hook reports through `/host/online` or
/// `/host/offline`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    pub initially_online: bool,
    pub network_type: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            initially_online: true,
            network_type: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.probe.generic_timeout(), Duration::from_secs(10));
        assert_eq!(config.probe.interval(), Duration::from_secs(30));
        assert_eq!(config.probe.initial_delay(), Duration::from_secs(5));
        assert_eq!(config.probe.failure_threshold, 3);
        assert_eq!(config.backend.timeout(), Duration::from_secs(15));
        assert_eq!(config.recovery.retry_budget, 5);
    }

    #[test]
    fn test_health_url_joins_slashes() {
        let mut backend = BackendConfig {
            base_url: Some("https://db.example.co/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            backend.health_url().as_deref(),
            Some("https://db.example.co/rest/v1/")
        );

        backend.base_url = Some(String::new());
        assert_eq!(backend.health_url(), None);

        backend.base_url = None;
        assert_eq!(backend.health_url(), None);
    }

    #[test]
    fn test_minimal_toml() {
        let config: MonitorConfig = toml::from_str(
            r#"
            [backend]
            base_url = "https://db.example.co"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url.as_deref(), Some("https://db.example.co"));
        assert_eq!(config.backend.health_path, "/rest/v1/");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.probe, ProbeConfig::default());
        assert_eq!(config.host, HostConfig::default());
    }

    #[test]
    fn test_host_seed() {
        let config: MonitorConfig = toml::from_str(
            r#"
            [host]
            initially_online = false
            network_type = "wifi"
            "#,
        )
        .unwrap();

        assert!(!config.host.initially_online);
        assert_eq!(config.host.network_type.as_deref(), Some("wifi"));
    }
}
