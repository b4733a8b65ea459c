// Correlation Penalty - Cross-Modal Agreement
//
// Low agreement between channels is itself a risk signal: contradictory
// evidence raises the score instead of cancelling out.

use crate::fusion::{CorrelationPair, FusionThresholds, Modality, Probability};
use std::collections::BTreeSet;

/// Mean agreement over pairs whose modalities are both present
///
/// Returns 1.0 when no pair applies: no contradiction is detectable.
pub fn average_agreement(
    correlations: &[CorrelationPair],
    present: &BTreeSet<Modality>,
) -> Probability {
    let applicable: Vec<f64> = correlations
        .iter()
        .filter(|p| present.contains(&p.modality_a) && present.contains(&p.modality_b))
        .map(|p| p.agreement)
        .collect();

    if applicable.is_empty() {
        return 1.0;
    }
    applicable.iter().sum::<f64>() / applicable.len() as f64
}

/// Penalty for a given mean agreement
pub fn correlation_penalty(avg_agreement: Probability, thresholds: &FusionThresholds) -> f64 {
    if avg_agreement < thresholds.conflict_agreement {
        thresholds.conflict_penalty
    } else if avg_agreement < thresholds.weak_agreement {
        thresholds.weak_penalty
    } else {
        0.0
    }
}
