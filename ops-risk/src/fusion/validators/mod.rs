// Validators - Input Checks, Verdict Classification, Confidence Assessment
//
// Input validation runs before fusion and never repairs bad input.
// Verdict and confidence are derived from fused output.

pub mod confidence_assessor;
pub mod verdict_classifier;

pub use confidence_assessor::assess_confidence;
pub use verdict_classifier::classify;

use crate::fusion::{CorrelationPair, Modality, ModalityScore, ValidationError};
use std::collections::BTreeSet;

/// Check every score, including zero-quality ones
///
/// Each modality may appear at most once; score and quality must be
/// finite and inside [0, 1].
pub fn validate_scores(scores: &[ModalityScore]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for s in scores {
        check_unit("score", s.modality, s.score)?;
        check_unit("quality", s.modality, s.quality)?;
        if !seen.insert(s.modality) {
            return Err(ValidationError::DuplicateModality(s.modality));
        }
    }
    Ok(())
}

/// Check correlation pairs
///
/// Pairs must name two distinct modalities, agreement must be inside
/// [0, 1], and a pair may be given in only one direction.
pub fn validate_correlations(correlations: &[CorrelationPair]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for pair in correlations {
        if pair.modality_a == pair.modality_b {
            return Err(ValidationError::SelfCorrelation(pair.modality_a));
        }
        if !pair.agreement.is_finite() || !(0.0..=1.0).contains(&pair.agreement) {
            return Err(ValidationError::AgreementOutOfRange {
                modality_a: pair.modality_a,
                modality_b: pair.modality_b,
                value: pair.agreement,
            });
        }
        let key = pair.key();
        if !seen.insert(key) {
            return Err(ValidationError::DuplicateCorrelation(key.0, key.1));
        }
    }
    Ok(())
}

fn check_unit(field: &'static str, modality: Modality, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            modality,
            value,
        })
    }
}
