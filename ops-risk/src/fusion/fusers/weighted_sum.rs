// Weighted Sum - Quality-Weighted Base Score
//
// base = Σ(score_i * quality_i * w_i) / Σ(quality_i * w_i)
// over present modalities, with weights renormalized over those modalities.

use crate::fusion::{Modality, ModalityScore, Probability};
use std::collections::BTreeMap;

/// Quality-weighted mean score of `present` under `applied_weights`
///
/// Returns 0.0 when the denominator vanishes (no present score carries
/// weight), which only happens for an empty set.
pub fn base_score(
    present: &[ModalityScore],
    applied_weights: &BTreeMap<Modality, f64>,
) -> Probability {
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for s in present {
        let weight = applied_weights.get(&s.modality).copied().unwrap_or(0.0);
        numerator += s.score * s.quality * weight;
        denominator += s.quality * weight;
    }

    if denominator <= 0.0 {
        return 0.0;
    }
    (numerator / denominator).clamp(0.0, 1.0)
}
