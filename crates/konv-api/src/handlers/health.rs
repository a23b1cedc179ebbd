//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use konv_service::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Readiness: the store answers a ping and the delivery worker is running
///
/// GET /health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let store_healthy = state.service_context().store().ping().await.is_ok();
    let worker_running = state.worker().is_running();

    let response = ReadinessResponse::ready(store_healthy, worker_running);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
