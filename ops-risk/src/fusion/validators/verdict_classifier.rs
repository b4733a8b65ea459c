// Verdict Classifier - Overall Score → Verdict
//
// Strict inequalities: a score exactly at a threshold falls into the
// lower category.

use crate::fusion::{FusionThresholds, Probability, Verdict};

/// Classify an overall risk score
pub fn classify(overall_score: Probability, thresholds: &FusionThresholds) -> Verdict {
    if overall_score > thresholds.fraudulent {
        Verdict::Fraudulent
    } else if overall_score > thresholds.suspicious {
        Verdict::Suspicious
    } else {
        Verdict::Genuine
    }
}
