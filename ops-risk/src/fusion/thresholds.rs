// Fusion Thresholds - Configurable Decision Constants
//
// Defaults are uncalibrated starting values; deployments override them in
// the [fusion.thresholds] section of the service config.

use crate::fusion::{Modality, ValidationError};
use serde::{Deserialize, Serialize};

/// Numeric constants driving penalty, bonus, verdict and concern tagging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionThresholds {
    /// Mean agreement below this is treated as conflicting evidence
    pub conflict_agreement: f64,
    /// Added to the score when agreement is conflicting
    pub conflict_penalty: f64,

    /// Mean agreement below this (but not conflicting) is weak agreement
    pub weak_agreement: f64,
    /// Added to the score when agreement is weak
    pub weak_penalty: f64,

    /// Individual score a modality must exceed to count as convergent
    pub convergence_score: f64,
    /// Number of convergent modalities that triggers the bonus
    pub convergence_min_modalities: usize,
    /// Added to the score for convergent evidence
    pub convergence_bonus: f64,

    /// Overall score above this is fraudulent
    pub fraudulent: f64,
    /// Overall score above this (and not fraudulent) is suspicious
    pub suspicious: f64,

    /// Individual score above this marks a primary concern
    pub concern: f64,
}

impl Default for FusionThresholds {
    fn default() -> Self {
        Self {
            conflict_agreement: 0.5,
            conflict_penalty: 0.2,
            weak_agreement: 0.7,
            weak_penalty: 0.1,
            convergence_score: 0.7,
            convergence_min_modalities: 3,
            convergence_bonus: 0.15,
            fraudulent: 0.7,
            suspicious: 0.4,
            concern: 0.7,
        }
    }
}

impl FusionThresholds {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let unit_fields = [
            ("conflict_agreement", self.conflict_agreement),
            ("conflict_penalty", self.conflict_penalty),
            ("weak_agreement", self.weak_agreement),
            ("weak_penalty", self.weak_penalty),
            ("convergence_score", self.convergence_score),
            ("convergence_bonus", self.convergence_bonus),
            ("fraudulent", self.fraudulent),
            ("suspicious", self.suspicious),
            ("concern", self.concern),
        ];
        for (field, value) in unit_fields {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::InvalidThreshold {
                    field,
                    reason: format!("must be in [0, 1], got {}", value),
                });
            }
        }

        if self.weak_agreement < self.conflict_agreement {
            return Err(ValidationError::InvalidThreshold {
                field: "weak_agreement",
                reason: format!(
                    "must be >= conflict_agreement ({}), got {}",
                    self.conflict_agreement, self.weak_agreement
                ),
            });
        }
        if self.fraudulent < self.suspicious {
            return Err(ValidationError::InvalidThreshold {
                field: "fraudulent",
                reason: format!(
                    "must be >= suspicious ({}), got {}",
                    self.suspicious, self.fraudulent
                ),
            });
        }
        if self.convergence_min_modalities == 0
            || self.convergence_min_modalities > Modality::ALL.len()
        {
            return Err(ValidationError::InvalidThreshold {
                field: "convergence_min_modalities",
                reason: format!(
                    "must be in [1, {}], got {}",
                    Modality::ALL.len(),
                    self.convergence_min_modalities
                ),
            });
        }
        Ok(())
    }
}
