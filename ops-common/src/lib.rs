//! # Ops Tower Common Library
//!
//! Shared code for Ops Tower services including:
//! - Error types
//! - TOML bootstrap configuration and config file resolution
//! - Logging initialisation
//! - Generic broadcast event bus
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod time;

pub use error::{Error, Result};
pub use events::EventBus;
