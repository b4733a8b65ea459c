//! Risk engine events
//!
//! Broadcast on an injected [`RiskEventBus`]; the HTTP layer forwards them
//! to dashboard clients over SSE.

use crate::fusion::{FusedResult, Modality, Verdict};
use chrono::{DateTime, Utc};
use ops_common::EventBus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Event bus carrying [`RiskEvent`]s
pub type RiskEventBus = EventBus<RiskEvent>;

/// What caused a new weights snapshot to be published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightSource {
    /// Recalibrated from labeled history
    Calibration { sample_count: usize },
    /// Replaced by an operator
    Manual,
}

/// Risk engine event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RiskEvent {
    /// A new weights snapshot became current
    WeightsPublished {
        event_id: Uuid,
        version: u64,
        weights: BTreeMap<Modality, f64>,
        source: WeightSource,
        timestamp: DateTime<Utc>,
    },

    /// A subject was assessed as suspicious or fraudulent
    RiskAssessed {
        event_id: Uuid,
        subject_id: Option<String>,
        verdict: Verdict,
        overall_score: f64,
        primary_concerns: Vec<Modality>,
        timestamp: DateTime<Utc>,
    },
}

impl RiskEvent {
    /// Build a `RiskAssessed` event from a fusion result
    pub fn assessed(subject_id: Option<String>, result: &FusedResult) -> Self {
        RiskEvent::RiskAssessed {
            event_id: Uuid::new_v4(),
            subject_id,
            verdict: result.verdict,
            overall_score: result.overall_score,
            primary_concerns: result.primary_concerns.iter().copied().collect(),
            timestamp: result.metadata.timestamp,
        }
    }

    /// Event type name used as the SSE event field
    pub fn event_type(&self) -> &'static str {
        match self {
            RiskEvent::WeightsPublished { .. } => "WeightsPublished",
            RiskEvent::RiskAssessed { .. } => "RiskAssessed",
        }
    }
}
