//! HTTP surface: one reconciliation per request, keyed by the TCP peer.

use axum::extract::{ConnectInfo, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use tracing::debug;

use devgroup_pihole::{ReconciliationResult, Reconciler};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Reconciler,
}

/// Build the service router. Serve it with `into_make_service_with_connect_info`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/device-group", get(device_group_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(state)
}

/// Reconcile the calling device. Always answers 200; failures live in the body.
async fn device_group_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Json<ReconciliationResult> {
    let result = state.reconciler.reconcile(&peer.ip().to_string()).await;
    if !result.diagnostics.is_empty() {
        debug!(
            client_address = %result.client_address,
            diagnostics = ?result.diagnostics,
            "reconciliation degraded"
        );
    }
    Json(result)
}

async fn healthz_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
