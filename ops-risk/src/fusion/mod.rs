// Fusion Module - Risk Signal Aggregation
//
// Architecture: Providers (per-modality scores) → Validators (input checks)
//               → Fusers (weighted sum, correlation penalty, convergence bonus)
//               → Validators (verdict, confidence)

pub mod fusers;
pub mod thresholds;
pub mod validators;
pub mod weights;

pub use fusers::{fuse, RiskAggregator};
pub use thresholds::FusionThresholds;
pub use weights::FusionWeights;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Risk score or measurement quality (0.0-1.0)
pub type Probability = f64;

/// Analysis channel a risk score comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Visual,
    Audio,
    Behavioral,
    Network,
    Textual,
}

impl Modality {
    /// Every modality, in canonical order
    pub const ALL: [Modality; 5] = [
        Modality::Visual,
        Modality::Audio,
        Modality::Behavioral,
        Modality::Network,
        Modality::Textual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Visual => "visual",
            Modality::Audio => "audio",
            Modality::Behavioral => "behavioral",
            Modality::Network => "network",
            Modality::Textual => "textual",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Modality::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownModality(s.to_string()))
    }
}

/// A single risk estimate from one analysis channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModalityScore {
    pub modality: Modality,

    /// Risk score (0.0-1.0), higher = more suspicious
    pub score: Probability,

    /// Confidence in this measurement (0.0-1.0), 0 = no data
    pub quality: Probability,
}

impl ModalityScore {
    pub fn new(modality: Modality, score: Probability, quality: Probability) -> Self {
        Self {
            modality,
            score,
            quality,
        }
    }

    /// Whether this score contributes to fusion (quality above zero)
    pub fn is_present(&self) -> bool {
        self.quality > 0.0
    }
}

/// Agreement between the underlying signals of two modalities
///
/// Symmetric: (A, B) and (B, A) are the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub modality_a: Modality,
    pub modality_b: Modality,

    /// 1.0 = fully consistent, 0.0 = fully contradictory
    pub agreement: Probability,
}

impl CorrelationPair {
    pub fn new(modality_a: Modality, modality_b: Modality, agreement: Probability) -> Self {
        Self {
            modality_a,
            modality_b,
            agreement,
        }
    }

    /// Order-independent identity of the pair
    pub fn key(&self) -> (Modality, Modality) {
        if self.modality_a <= self.modality_b {
            (self.modality_a, self.modality_b)
        } else {
            (self.modality_b, self.modality_a)
        }
    }
}

/// Categorical outcome of a fusion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Genuine,
    Suspicious,
    Fraudulent,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Genuine => write!(f, "genuine"),
            Verdict::Suspicious => write!(f, "suspicious"),
            Verdict::Fraudulent => write!(f, "fraudulent"),
        }
    }
}

/// Output of one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    /// Final risk score (0.0-1.0)
    pub overall_score: Probability,

    /// Confidence in `overall_score` (0.0-1.0)
    pub confidence: Probability,

    pub verdict: Verdict,

    /// Modalities whose individual score exceeded the concern threshold
    pub primary_concerns: BTreeSet<Modality>,

    /// Weighted sum before penalty and bonus
    pub base_score: Probability,

    /// Amount added for low cross-modal agreement
    pub correlation_penalty: f64,

    /// Amount added when several channels independently report high risk
    pub convergence_bonus: f64,

    pub metadata: FusionMetadata,
}

/// Provenance of a fusion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionMetadata {
    /// Modalities with quality above zero, in canonical order
    pub modalities_used: Vec<Modality>,

    /// Mean quality of the modalities used (0.0 when none)
    pub data_quality: Probability,

    /// Mean agreement over correlation pairs among used modalities
    pub avg_agreement: Probability,

    /// Weights after renormalization over the modalities used
    pub applied_weights: BTreeMap<Modality, f64>,

    /// Version of the weights snapshot this result was computed from
    pub weights_version: u64,

    pub timestamp: DateTime<Utc>,
}

/// Rejected input
///
/// Always a caller bug: the aggregator never clamps or repairs input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} for {modality} must be a finite value in [0, 1], got {value}")]
    OutOfRange {
        field: &'static str,
        modality: Modality,
        value: f64,
    },

    #[error("agreement between {modality_a} and {modality_b} must be a finite value in [0, 1], got {value}")]
    AgreementOutOfRange {
        modality_a: Modality,
        modality_b: Modality,
        value: f64,
    },

    #[error("unknown modality: {0:?}")]
    UnknownModality(String),

    #[error("duplicate score for modality {0}")]
    DuplicateModality(Modality),

    #[error("expected a {expected} score, got {actual}")]
    ModalityMismatch { expected: Modality, actual: Modality },

    #[error("weight for {modality} must be finite and non-negative, got {value}")]
    InvalidWeight { modality: Modality, value: f64 },

    #[error("weights must not all be zero")]
    ZeroWeights,

    #[error("correlation pair names {0} twice")]
    SelfCorrelation(Modality),

    #[error("duplicate correlation pair {0}/{1}")]
    DuplicateCorrelation(Modality, Modality),

    #[error("invalid {field} threshold: {reason}")]
    InvalidThreshold { field: &'static str, reason: String },
}

impl ValidationError {
    /// Name of the offending input field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::OutOfRange { field, .. } => field,
            ValidationError::AgreementOutOfRange { .. } => "agreement",
            ValidationError::UnknownModality(_)
            | ValidationError::DuplicateModality(_)
            | ValidationError::ModalityMismatch { .. } => "modality",
            ValidationError::InvalidWeight { .. } | ValidationError::ZeroWeights => "weight",
            ValidationError::SelfCorrelation(_) | ValidationError::DuplicateCorrelation(..) => {
                "correlation"
            }
            ValidationError::InvalidThreshold { field, .. } => field,
        }
    }
}
