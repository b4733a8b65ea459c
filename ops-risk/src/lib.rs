//! ops-risk library interface
//!
//! Multi-modal risk fusion for ride-sharing fraud detection: per-modality
//! scores go in, one calibrated risk verdict comes out. The HTTP service in
//! `main.rs` is a thin wrapper over this library.

pub mod api;
pub mod calibration;
pub mod config;
pub mod error;
pub mod events;
pub mod fusion;
pub mod providers;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::calibration::{CalibrationParams, WeightStore};
use crate::config::RiskServiceConfig;
use crate::events::RiskEventBus;
use crate::fusion::{RiskAggregator, ValidationError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Stateless aggregator holding the decision thresholds
    pub aggregator: Arc<RiskAggregator>,
    /// Current weights snapshot
    pub weights: Arc<WeightStore>,
    /// Event bus for SSE broadcasting
    pub event_bus: RiskEventBus,
    /// Calibration params used when a request does not supply its own
    pub calibration: CalibrationParams,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        aggregator: RiskAggregator,
        weights: WeightStore,
        event_bus: RiskEventBus,
        calibration: CalibrationParams,
    ) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            weights: Arc::new(weights),
            event_bus,
            calibration,
            startup_time: Utc::now(),
        }
    }

    /// Wire up aggregator, weight store and event bus from configuration
    pub fn from_config(config: &RiskServiceConfig) -> Result<Self, ValidationError> {
        let event_bus = RiskEventBus::new(config.event_capacity);
        let aggregator = RiskAggregator::new(config.fusion.thresholds.clone())?;
        let weights = WeightStore::new(config.initial_weights()?).with_events(event_bus.clone());

        Ok(Self::new(
            aggregator,
            weights,
            event_bus,
            config.calibration.clone(),
        ))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::risk_routes())
        .route("/risk/events", get(api::risk_event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
