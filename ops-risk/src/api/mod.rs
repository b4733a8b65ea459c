//! HTTP API handlers for ops-risk

pub mod health;
pub mod risk;
pub mod sse;

pub use health::health_routes;
pub use risk::risk_routes;
pub use sse::risk_event_stream;
