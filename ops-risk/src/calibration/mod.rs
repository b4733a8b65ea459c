//! Weight calibration from labeled history
//!
//! Recomputes fusion weights from subjects whose true outcome is known.
//! For each modality the quality-weighted mean score over fraudulent
//! subjects minus the same mean over genuine subjects measures how well
//! that channel separates the two. Modalities with enough observations of
//! both outcomes are re-weighted toward their separation (floored); the
//! rest keep their current weight. The new weights blend the current ones
//! with the targets at `learning_rate` and are published as a new snapshot.

pub mod weight_store;

pub use weight_store::WeightStore;

use crate::fusion::validators::validate_scores;
use crate::fusion::{FusionWeights, Modality, ModalityScore, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

/// Final, confirmed outcome for a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Fraudulent,
    Genuine,
}

/// One subject's modality scores and its confirmed outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub subject_id: String,
    pub outcome: Outcome,
    pub scores: Vec<ModalityScore>,
}

/// Calibration tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    /// Share of the target applied per run, in (0, 1]
    pub learning_rate: f64,

    /// Lowest target for an observed modality, so a weak channel is
    /// down-weighted rather than switched off
    pub weight_floor: f64,

    /// Observations of each outcome required before a modality is re-weighted
    pub min_samples: usize,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            weight_floor: 0.01,
            min_samples: 5,
        }
    }
}

impl CalibrationParams {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 || self.learning_rate > 1.0
        {
            return Err(CalibrationError::InvalidParams {
                field: "learning_rate",
                reason: format!("must be in (0, 1], got {}", self.learning_rate),
            });
        }
        if !self.weight_floor.is_finite() || self.weight_floor < 0.0 {
            return Err(CalibrationError::InvalidParams {
                field: "weight_floor",
                reason: format!("must be finite and >= 0, got {}", self.weight_floor),
            });
        }
        if self.min_samples == 0 {
            return Err(CalibrationError::InvalidParams {
                field: "min_samples",
                reason: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Calibration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("calibration dataset is empty")]
    EmptyDataset,

    #[error("calibration dataset needs both fraudulent and genuine outcomes")]
    SingleOutcome,

    #[error("invalid sample {index} ({subject_id}): {source}")]
    InvalidSample {
        index: usize,
        subject_id: String,
        #[source]
        source: ValidationError,
    },

    #[error("invalid calibration parameter {field}: {reason}")]
    InvalidParams { field: &'static str, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Quality-weighted score accumulator for one modality and outcome
#[derive(Debug, Default, Clone, Copy)]
struct OutcomeStats {
    weighted_score: f64,
    total_quality: f64,
    count: usize,
}

impl OutcomeStats {
    fn add(&mut self, score: &ModalityScore) {
        self.weighted_score += score.score * score.quality;
        self.total_quality += score.quality;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.total_quality <= 0.0 {
            0.0
        } else {
            self.weighted_score / self.total_quality
        }
    }
}

/// Recompute weights from labeled samples
///
/// # Arguments
/// * `samples` - Labeled history; must contain both outcomes
/// * `current` - Weights currently in use (blended with the targets)
/// * `params` - Learning rate, floor and minimum sample count
///
/// # Returns
/// * New weights with `current.version() + 1`
pub fn calibrate(
    samples: &[LabeledSample],
    current: &FusionWeights,
    params: &CalibrationParams,
) -> Result<FusionWeights, CalibrationError> {
    params.validate()?;

    if samples.is_empty() {
        return Err(CalibrationError::EmptyDataset);
    }

    for (index, sample) in samples.iter().enumerate() {
        validate_scores(&sample.scores).map_err(|source| CalibrationError::InvalidSample {
            index,
            subject_id: sample.subject_id.clone(),
            source,
        })?;
    }

    let has_fraud = samples.iter().any(|s| s.outcome == Outcome::Fraudulent);
    let has_genuine = samples.iter().any(|s| s.outcome == Outcome::Genuine);
    if !(has_fraud && has_genuine) {
        return Err(CalibrationError::SingleOutcome);
    }

    let mut fraud: BTreeMap<Modality, OutcomeStats> = BTreeMap::new();
    let mut genuine: BTreeMap<Modality, OutcomeStats> = BTreeMap::new();
    for sample in samples {
        let stats = match sample.outcome {
            Outcome::Fraudulent => &mut fraud,
            Outcome::Genuine => &mut genuine,
        };
        for score in sample.scores.iter().filter(|s| s.is_present()) {
            stats.entry(score.modality).or_default().add(score);
        }
    }

    // Separation for modalities with enough evidence on both sides
    let mut separation: BTreeMap<Modality, f64> = BTreeMap::new();
    for modality in Modality::ALL {
        let f = fraud.get(&modality).copied().unwrap_or_default();
        let g = genuine.get(&modality).copied().unwrap_or_default();
        if f.count >= params.min_samples && g.count >= params.min_samples {
            let sep = (f.mean() - g.mean()).max(params.weight_floor);
            debug!(
                "Calibration {}: fraud mean {:.3} (n={}), genuine mean {:.3} (n={}), target {:.3}",
                modality,
                f.mean(),
                f.count,
                g.mean(),
                g.count,
                sep
            );
            separation.insert(modality, sep);
        }
    }

    // Informed modalities share the weight they held before, split by separation
    let informed_share: f64 = separation.keys().map(|&m| current.get(m)).sum();
    let separation_total: f64 = separation.values().sum();

    let mut blended = BTreeMap::new();
    for modality in Modality::ALL {
        let now = current.get(modality);
        let target = match separation.get(&modality) {
            Some(sep) if separation_total > 0.0 => informed_share * sep / separation_total,
            _ => now,
        };
        blended.insert(
            modality,
            (1.0 - params.learning_rate) * now + params.learning_rate * target,
        );
    }

    let weights = FusionWeights::new(blended)?.with_version(current.version() + 1);

    info!(
        "Calibrated weights v{} from {} samples ({} modalities re-weighted)",
        weights.version(),
        samples.len(),
        separation.len()
    );

    Ok(weights)
}
