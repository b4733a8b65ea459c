// Confidence Assessor - Coverage × Quality × Agreement
//
// confidence = (present / total modalities) * mean quality * (1 - variance)
// Score variance is the uncertainty proxy: channels that disagree lower
// confidence even when each one is individually reliable.

use crate::fusion::{Modality, ModalityScore, Probability};

/// Confidence for a set of present scores (quality > 0)
///
/// Returns 0.0 for an empty set.
pub fn assess_confidence(present: &[ModalityScore]) -> Probability {
    if present.is_empty() {
        return 0.0;
    }

    let coverage = present.len() as f64 / Modality::ALL.len() as f64;
    let quality = mean_quality(present);
    let variance = score_variance(present);

    (coverage * quality * (1.0 - variance)).clamp(0.0, 1.0)
}

/// Mean quality of `present` (0.0 when empty)
pub fn mean_quality(present: &[ModalityScore]) -> Probability {
    if present.is_empty() {
        return 0.0;
    }
    present.iter().map(|s| s.quality).sum::<f64>() / present.len() as f64
}

/// Population variance of scores in `present` (0.0 when empty)
pub fn score_variance(present: &[ModalityScore]) -> f64 {
    if present.is_empty() {
        return 0.0;
    }
    let n = present.len() as f64;
    let mean = present.iter().map(|s| s.score).sum::<f64>() / n;
    present
        .iter()
        .map(|s| (s.score - mean).powi(2))
        .sum::<f64>()
        / n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(assess_confidence(&[]), 0.0);
    }

    #[test]
    fn test_full_coverage_perfect_agreement() {
        let present: Vec<_> = Modality::ALL
            .iter()
            .map(|&m| ModalityScore::new(m, 0.6, 1.0))
            .collect();
        assert!((assess_confidence(&present) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_coverage_and_quality() {
        let present = vec![
            ModalityScore::new(Modality::Visual, 0.5, 0.8),
            ModalityScore::new(Modality::Audio, 0.5, 0.4),
        ];
        // coverage 0.4, mean quality 0.6, variance 0
        assert!((assess_confidence(&present) - 0.24).abs() < 1e-12);
    }

    #[test]
    fn test_variance_reduces_confidence() {
        let agreeing = vec![
            ModalityScore::new(Modality::Visual, 0.5, 1.0),
            ModalityScore::new(Modality::Audio, 0.5, 1.0),
        ];
        let disagreeing = vec![
            ModalityScore::new(Modality::Visual, 0.0, 1.0),
            ModalityScore::new(Modality::Audio, 1.0, 1.0),
        ];
        assert!(assess_confidence(&disagreeing) < assess_confidence(&agreeing));
        // variance of {0, 1} = 0.25
        assert!((score_variance(&disagreeing) - 0.25).abs() < 1e-12);
    }
}
