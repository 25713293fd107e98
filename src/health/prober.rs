//! Reachability probes.
//!
//! # Responsibilities
//! - Probe a generic external endpoint (is the network usable at all?)
//! - Probe the hosted backend (is our data source reachable?)
//! - Enforce a local deadline on every probe
//!
//! # Design Decisions
//! - Generic probe: any HTTP response is success; only transport failure or
//!   timeout counts as failure
//! - Backend probe: HEAD request, 2xx is success
//! - Missing backend URL fails without touching the network

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL, PRAGMA};
use reqwest::Client;

use crate::config::{BackendConfig, ProbeConfig};
use crate::health::types::{ProbeError, ProbeResult};
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;

/// Header carrying the backend API key.
pub const API_KEY_HEADER: &str = "apikey";

/// Source of probe outcomes for the monitor.
pub trait Prober: Send + Sync + 'static {
    /// Check the generic external endpoint.
    fn probe_generic(&self) -> impl Future<Output = ProbeResult> + Send;

    /// Check the backend endpoint.
    fn probe_backend(&self) -> impl Future<Output = ProbeResult> + Send;
}

/// HTTP prober backed by `reqwest`.
#[derive(Debug)]
pub struct HttpProber {
    client: Client,
    probe: ProbeConfig,
    backend: BackendConfig,
    requests: AtomicU64,
}

impl HttpProber {
    pub fn new(probe: ProbeConfig, backend: BackendConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(concat!("ekaty-monitor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, probe, backend))
    }

    pub fn with_client(client: Client, probe: ProbeConfig, backend: BackendConfig) -> Self {
        Self {
            client,
            probe,
            backend,
            requests: AtomicU64::new(0),
        }
    }

    /// Number of network requests this prober has attempted.
    pub fn requests_issued(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn backend_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(key) = self.backend.api_key.as_deref() {
            match (
                HeaderValue::from_str(key),
                HeaderValue::from_str(&format!("Bearer {}", key)),
            ) {
                (Ok(key), Ok(bearer)) => {
                    headers.insert(API_KEY_HEADER, key);
                    headers.insert(AUTHORIZATION, bearer);
                }
                _ => tracing::warn!("Backend API key is not a valid header value, sending probe without it"),
            }
        }
        headers
    }
}

impl Prober for HttpProber {
    async fn probe_generic(&self) -> ProbeResult {
        let url = &self.probe.generic_url;
        let timeout = self.probe.generic_timeout();

        self.requests.fetch_add(1, Ordering::Relaxed);
        let request = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send();

        let result = match with_deadline(timeout, request).await {
            Ok(Ok(response)) => {
                tracing::debug!(url = %url, status = %response.status(), "Generic probe answered");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::warn!(url = %url, error = %e, "Generic probe failed: connection error");
                Err(ProbeError::Transport(e.to_string()))
            }
            Err(e) => {
                tracing::warn!(url = %url, timeout = ?timeout, "Generic probe failed: timeout");
                Err(e)
            }
        };

        metrics::record_probe("generic", result.is_ok());
        result
    }

    async fn probe_backend(&self) -> ProbeResult {
        let Some(url) = self.backend.health_url() else {
            tracing::warn!("Backend probe skipped: backend base URL not configured");
            metrics::record_probe("backend", false);
            return Err(ProbeError::NotConfigured("backend.base_url"));
        };
        let timeout = self.backend.timeout();

        self.requests.fetch_add(1, Ordering::Relaxed);
        let request = self.client.head(&url).headers(self.backend_headers()).send();

        let result = match with_deadline(timeout, request).await {
            Ok(Ok(response)) if response.status().is_success() => Ok(()),
            Ok(Ok(response)) => {
                tracing::warn!(url = %url, status = %response.status(), "Backend probe failed: non-success status");
                Err(ProbeError::Status(response.status().as_u16()))
            }
            Ok(Err(e)) => {
                tracing::warn!(url = %url, error = %e, "Backend probe failed: connection error");
                Err(ProbeError::Transport(e.to_string()))
            }
            Err(e) => {
                tracing::warn!(url = %url, timeout = ?timeout, "Backend probe failed: timeout");
                Err(e)
            }
        };

        metrics::record_probe("backend", result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_backend_issues_no_request() {
        let prober = HttpProber::new(ProbeConfig::default(), BackendConfig::default()).unwrap();

        let result = prober.probe_backend().await;

        assert_eq!(result, Err(ProbeError::NotConfigured("backend.base_url")));
        assert_eq!(prober.requests_issued(), 0);
    }

    #[test]
    fn test_backend_headers_carry_key() {
        let backend = BackendConfig {
            api_key: Some("anon-key".to_string()),
            ..Default::default()
        };
        let prober = HttpProber::with_client(Client::new(), ProbeConfig::default(), backend);

        let headers = prober.backend_headers();
        assert_eq!(headers.get(API_KEY_HEADER).unwrap(), "anon-key");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer anon-key");
    }

    #[test]
    fn test_invalid_key_is_dropped() {
        let backend = BackendConfig {
            api_key: Some("bad\nkey".to_string()),
            ..Default::default()
        };
        let prober = HttpProber::with_client(Client::new(), ProbeConfig::default(), backend);

        assert!(prober.backend_headers().is_empty());
    }
}
