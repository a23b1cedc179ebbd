//! Route definitions

use axum::{routing::get, routing::post, Router};

use crate::handlers::{health, messages};
use crate::state::AppState;

/// Ingestion routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/message", post(messages::publish_message))
        .route("/message/ping", get(messages::ping))
        .route(
            "/message/:target/:message",
            get(messages::publish_message_from_path),
        )
}

/// Health check routes, mounted outside the rate limiter
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}
