//! Status API routes.
//!
//! Read-only routes are open; routes that change monitor or recovery state
//! go through `auth::admin_auth_middleware`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/check", post(post_check))
        .route("/recovery/report", post(post_failure_report))
        .route("/recovery/retry", post(post_retry))
        .route("/recovery/troubleshooting", post(post_troubleshooting))
        .route("/recovery/reload", post(post_reload))
        .route("/host/online", post(post_host_online))
        .route("/host/offline", post(post_host_offline))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware));

    Router::new()
        .route("/status", get(get_status))
        .route("/connection", get(get_connection))
        .route("/backend", get(get_backend))
        .route("/recovery", get(get_recovery))
        .merge(protected)
        .with_state(state)
}
