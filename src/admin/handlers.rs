use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::health::types::{CheckOutcome, ConnectionInfo};
use crate::http::server::AppState;
use crate::recovery::{classify_failure, FailureKind, RecoveryPanel, RetryOutcome};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub monitoring: bool,
    pub online: bool,
}

#[derive(Debug, Serialize)]
pub struct BackendStatus {
    pub reachable: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub outcome: CheckOutcome,
    pub connection: ConnectionInfo,
}

#[derive(Debug, Deserialize)]
pub struct FailureReport {
    pub status: Option<u16>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FailureReportResponse {
    pub kind: FailureKind,
    pub panel: Option<RecoveryPanel>,
}

#[derive(Debug, Serialize)]
pub struct TroubleshootingResponse {
    pub visible: bool,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let inner = state.inner.load();
    let online = inner.monitor.connection_info().is_online;

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if online { "operational" } else { "degraded" },
        monitoring: inner.monitor.is_monitoring(),
        online,
    })
}

pub async fn get_connection(State(state): State<AppState>) -> Json<ConnectionInfo> {
    Json(state.inner.load().monitor.connection_info())
}

pub async fn get_backend(State(state): State<AppState>) -> Json<BackendStatus> {
    let inner = state.inner.load_full();
    Json(BackendStatus {
        reachable: inner.monitor.test_backend_connection().await,
    })
}

pub async fn post_check(State(state): State<AppState>) -> Json<CheckResponse> {
    let inner = state.inner.load_full();
    let outcome = inner.monitor.check_connection().await;

    Json(CheckResponse {
        outcome,
        connection: inner.monitor.connection_info(),
    })
}

pub async fn get_recovery(State(state): State<AppState>) -> Result<Json<RecoveryPanel>, StatusCode> {
    state
        .inner
        .load()
        .recovery
        .current()
        .map(|session| Json(session.panel()))
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn post_failure_report(
    State(state): State<AppState>,
    Json(report): Json<FailureReport>,
) -> Json<FailureReportResponse> {
    let kind = classify_failure(report.status, &report.message);
    tracing::info!(status = ?report.status, ?kind, "Failure reported");

    let panel = state
        .inner
        .load()
        .recovery
        .open(kind)
        .map(|session| session.panel());

    Json(FailureReportResponse { kind, panel })
}

pub async fn post_retry(State(state): State<AppState>) -> Result<Json<RetryOutcome>, StatusCode> {
    let inner = state.inner.load_full();
    let session = inner.recovery.current().ok_or(StatusCode::NOT_FOUND)?;

    let monitor = inner.monitor.clone();
    let outcome = session
        .retry(|| async move {
            if monitor.test_backend_connection().await {
                Ok(())
            } else {
                Err("backend still unreachable")
            }
        })
        .await;

    if outcome == RetryOutcome::Recovered {
        inner.recovery.close();
    }
    Ok(Json(outcome))
}

pub async fn post_troubleshooting(
    State(state): State<AppState>,
) -> Result<Json<TroubleshootingResponse>, StatusCode> {
    let session = state
        .inner
        .load()
        .recovery
        .current()
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(TroubleshootingResponse {
        visible: session.toggle_troubleshooting(),
    }))
}

pub async fn post_reload(State(state): State<AppState>) -> StatusCode {
    match state.inner.load().recovery.take() {
        Some(session) => session.force_reload(),
        None => state.reloader.reload(),
    }
    StatusCode::ACCEPTED
}

pub async fn post_host_online(State(state): State<AppState>) -> Json<ConnectionInfo> {
    state.host.report(true);
    Json(state.inner.load().monitor.connection_info())
}

pub async fn post_host_offline(State(state): State<AppState>) -> Json<ConnectionInfo> {
    state.host.report(false);
    Json(state.inner.load().monitor.connection_info())
}
