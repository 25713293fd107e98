//! Probe behaviour against real sockets.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use ekaty_monitor::config::{BackendConfig, ProbeConfig};
use ekaty_monitor::health::{
    CheckOutcome, ConnectionMonitor, HttpProber, MonitorSettings, ProbeError, Prober,
};

mod common;

fn probe_config(url: String) -> ProbeConfig {
    ProbeConfig {
        generic_url: url,
        generic_timeout_secs: 1,
        ..Default::default()
    }
}

fn backend_config(base_url: Option<String>) -> BackendConfig {
    BackendConfig {
        base_url,
        api_key: Some("anon-key".to_string()),
        timeout_secs: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_generic_probe_accepts_any_status() {
    let backend = common::start_mock_backend(503).await;
    let prober = HttpProber::new(probe_config(backend.url()), BackendConfig::default()).unwrap();

    assert_eq!(prober.probe_generic().await, Ok(()));
    assert_eq!(backend.request_count(), 1);
    assert!(backend.last_request().starts_with("GET / "));
    assert!(backend.last_request().to_ascii_lowercase().contains("cache-control: no-cache"));
}

#[tokio::test]
async fn test_generic_probe_connection_refused() {
    let addr = common::closed_port().await;
    let prober = HttpProber::new(probe_config(format!("http://{}", addr)), BackendConfig::default()).unwrap();

    assert!(matches!(prober.probe_generic().await, Err(ProbeError::Transport(_))));
}

#[tokio::test]
async fn test_generic_probe_times_out() {
    let addr = common::start_silent_backend().await;
    let prober = HttpProber::new(probe_config(format!("http://{}", addr)), BackendConfig::default()).unwrap();

    assert_eq!(
        prober.probe_generic().await,
        Err(ProbeError::Timeout(Duration::from_secs(1)))
    );
}

#[tokio::test]
async fn test_backend_probe_sends_head_with_key() {
    let backend = common::start_mock_backend(200).await;
    let prober = HttpProber::new(ProbeConfig::default(), backend_config(Some(backend.url()))).unwrap();

    assert_eq!(prober.probe_backend().await, Ok(()));

    let request = backend.last_request();
    assert!(request.starts_with("HEAD /rest/v1/ "), "unexpected request: {}", request);
    assert!(request.to_ascii_lowercase().contains("apikey: anon-key"));
}

#[tokio::test]
async fn test_backend_probe_rejects_non_success() {
    let backend = common::start_mock_backend(401).await;
    let prober = HttpProber::new(ProbeConfig::default(), backend_config(Some(backend.url()))).unwrap();

    assert_eq!(prober.probe_backend().await, Err(ProbeError::Status(401)));
}

#[tokio::test]
async fn test_unset_backend_makes_no_request() {
    let generic = common::start_mock_backend(200).await;
    let prober = HttpProber::new(probe_config(generic.url()), backend_config(None)).unwrap();
    let monitor = ConnectionMonitor::new(prober, MonitorSettings::default(), true);

    assert!(!monitor.test_backend_connection().await);
    assert_eq!(monitor.prober().requests_issued(), 0);
    assert_eq!(generic.request_count(), 0);
}

#[tokio::test]
async fn test_monitor_goes_offline_after_three_refused_probes() {
    let addr = common::closed_port().await;
    let prober = HttpProber::new(probe_config(format!("http://{}", addr)), BackendConfig::default()).unwrap();
    let settings = MonitorSettings {
        interval: Duration::ZERO,
        initial_delay: Duration::ZERO,
        failure_threshold: 3,
    };
    let monitor = ConnectionMonitor::new(prober, settings, true);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let _sub = monitor.subscribe({
        let seen = seen.clone();
        move |online| seen.lock().unwrap().push(online)
    });

    for _ in 0..3 {
        assert_eq!(monitor.check_connection().await, CheckOutcome::Unreachable);
    }

    assert_eq!(*seen.lock().unwrap(), vec![false]);
    let info = monitor.connection_info();
    assert!(!info.is_online);
    assert_eq!(info.consecutive_failures, 3);
}
