//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Module name ("ops-risk")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Version of the weights snapshot currently in use
    pub weights_version: u64,
    /// Connected event stream clients
    pub event_subscribers: usize,
    /// Events buffered per client before it starts missing them
    pub event_capacity: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: crate::config::MODULE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: ops_common::time::seconds_since(state.startup_time),
        weights_version: state.weights.snapshot().version(),
        event_subscribers: state.event_bus.subscriber_count(),
        event_capacity: state.event_bus.capacity(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
