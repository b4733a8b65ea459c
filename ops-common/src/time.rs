//! Timestamp utilities

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Whole seconds elapsed since `since`, never negative
pub fn seconds_since(since: DateTime<Utc>) -> u64 {
    now().signed_duration_since(since).num_seconds().max(0) as u64
}

/// Start of a trailing window of `minutes` ending at `end`
pub fn window_start(end: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    end - Duration::minutes(minutes.max(0))
}
