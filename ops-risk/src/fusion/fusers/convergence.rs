// Convergence Bonus - Independent Channels Agreeing On High Risk

use crate::fusion::{FusionThresholds, Modality, ModalityScore};
use std::collections::BTreeSet;

/// Present modalities whose score exceeds `threshold`
pub fn high_risk_modalities(present: &[ModalityScore], threshold: f64) -> BTreeSet<Modality> {
    present
        .iter()
        .filter(|s| s.score > threshold)
        .map(|s| s.modality)
        .collect()
}

/// Bonus when enough distinct modalities independently report high risk
pub fn convergence_bonus(present: &[ModalityScore], thresholds: &FusionThresholds) -> f64 {
    let convergent = high_risk_modalities(present, thresholds.convergence_score);
    if convergent.len() >= thresholds.convergence_min_modalities {
        thresholds.convergence_bonus
    } else {
        0.0
    }
}
