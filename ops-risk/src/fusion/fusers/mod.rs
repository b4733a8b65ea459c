// Fusers - Weighted, Correlation-Adjusted Risk Fusion
//
// overall = clamp(base + correlation_penalty + convergence_bonus, 0, 1)
// Pure computation: no I/O, no shared state beyond the weights snapshot
// passed in by the caller.

pub mod convergence;
pub mod correlation;
pub mod weighted_sum;

use crate::fusion::validators::{
    assess_confidence, classify, confidence_assessor::mean_quality, validate_correlations,
    validate_scores,
};
use crate::fusion::{
    CorrelationPair, FusedResult, FusionMetadata, FusionThresholds, FusionWeights, Modality,
    ModalityScore, ValidationError, Verdict,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Risk signal aggregator
///
/// Holds only immutable thresholds, so one instance can be shared across
/// threads and requests without locking.
#[derive(Debug, Clone, Default)]
pub struct RiskAggregator {
    thresholds: FusionThresholds,
}

impl RiskAggregator {
    /// Create an aggregator, rejecting inconsistent thresholds
    pub fn new(thresholds: FusionThresholds) -> Result<Self, ValidationError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &FusionThresholds {
        &self.thresholds
    }

    /// Fuse per-modality scores, stamping the result with the current time
    pub fn fuse(
        &self,
        scores: &[ModalityScore],
        correlations: &[CorrelationPair],
        weights: &FusionWeights,
    ) -> Result<FusedResult, ValidationError> {
        self.fuse_at(scores, correlations, weights, Utc::now())
    }

    /// Fuse per-modality scores into a single risk assessment
    ///
    /// # Arguments
    /// * `scores` - At most one score per modality; zero-quality scores are
    ///   validated but do not contribute
    /// * `correlations` - Pairwise agreement, one direction per pair
    /// * `weights` - Weights snapshot; renormalized over present modalities
    /// * `timestamp` - Evaluation time recorded in the result metadata
    ///
    /// # Returns
    /// * `FusedResult`, or the first `ValidationError` found in the input
    pub fn fuse_at(
        &self,
        scores: &[ModalityScore],
        correlations: &[CorrelationPair],
        weights: &FusionWeights,
        timestamp: DateTime<Utc>,
    ) -> Result<FusedResult, ValidationError> {
        if let Err(e) = validate_scores(scores).and_then(|_| validate_correlations(correlations))
        {
            warn!("Rejected fusion input: {}", e);
            return Err(e);
        }

        let mut present: Vec<ModalityScore> =
            scores.iter().filter(|s| s.is_present()).copied().collect();
        present.sort_by_key(|s| s.modality);

        if present.is_empty() {
            debug!("No modality with quality > 0, returning empty result");
            return Ok(empty_result(weights.version(), timestamp));
        }

        let modalities: Vec<Modality> = present.iter().map(|s| s.modality).collect();
        let present_set: BTreeSet<Modality> = modalities.iter().copied().collect();
        let applied_weights = weights.renormalized_over(&modalities);

        let base_score = weighted_sum::base_score(&present, &applied_weights);
        let avg_agreement = correlation::average_agreement(correlations, &present_set);
        let correlation_penalty = correlation::correlation_penalty(avg_agreement, &self.thresholds);
        let convergence_bonus = convergence::convergence_bonus(&present, &self.thresholds);

        let overall_score = (base_score + correlation_penalty + convergence_bonus).clamp(0.0, 1.0);
        let verdict = classify(overall_score, &self.thresholds);
        let confidence = assess_confidence(&present);
        let primary_concerns = convergence::high_risk_modalities(&present, self.thresholds.concern);

        debug!(
            "Fused {} modalities: base={:.3}, penalty={:.2}, bonus={:.2}, overall={:.3}, verdict={}",
            present.len(),
            base_score,
            correlation_penalty,
            convergence_bonus,
            overall_score,
            verdict
        );

        Ok(FusedResult {
            overall_score,
            confidence,
            verdict,
            primary_concerns,
            base_score,
            correlation_penalty,
            convergence_bonus,
            metadata: FusionMetadata {
                modalities_used: modalities,
                data_quality: mean_quality(&present),
                avg_agreement,
                applied_weights,
                weights_version: weights.version(),
                timestamp,
            },
        })
    }
}

/// Fuse with default thresholds
pub fn fuse(
    scores: &[ModalityScore],
    correlations: &[CorrelationPair],
    weights: &FusionWeights,
) -> Result<FusedResult, ValidationError> {
    RiskAggregator::default().fuse(scores, correlations, weights)
}

fn empty_result(weights_version: u64, timestamp: DateTime<Utc>) -> FusedResult {
    FusedResult {
        overall_score: 0.0,
        confidence: 0.0,
        verdict: Verdict::Genuine,
        primary_concerns: BTreeSet::new(),
        base_score: 0.0,
        correlation_penalty: 0.0,
        convergence_bonus: 0.0,
        metadata: FusionMetadata {
            modalities_used: vec![],
            data_quality: 0.0,
            avg_agreement: 1.0,
            applied_weights: BTreeMap::new(),
            weights_version,
            timestamp,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_fusion_empty_input() {
        let result = RiskAggregator::default()
            .fuse_at(&[], &[], &FusionWeights::default(), at())
            .unwrap();
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.verdict, Verdict::Genuine);
        assert!(result.primary_concerns.is_empty());
        assert_eq!(result.metadata.timestamp, at());
    }

    #[test]
    fn test_zero_quality_only_is_empty() {
        let scores = vec![ModalityScore::new(Modality::Visual, 0.95, 0.0)];
        let result = fuse(&scores, &[], &FusionWeights::default()).unwrap();
        assert_eq!(result.overall_score, 0.0);
        assert!(result.metadata.modalities_used.is_empty());
    }

    #[test]
    fn test_zero_quality_score_not_treated_as_zero_risk() {
        let weights = FusionWeights::default();
        let alone = fuse(
            &[ModalityScore::new(Modality::Visual, 0.6, 1.0)],
            &[],
            &weights,
        )
        .unwrap();
        let with_absent = fuse(
            &[
                ModalityScore::new(Modality::Visual, 0.6, 1.0),
                ModalityScore::new(Modality::Audio, 0.0, 0.0),
            ],
            &[],
            &weights,
        )
        .unwrap();
        assert_eq!(alone.overall_score, with_absent.overall_score);
    }

    #[test]
    fn test_weak_agreement_adds_small_penalty() {
        let scores = vec![
            ModalityScore::new(Modality::Visual, 0.3, 1.0),
            ModalityScore::new(Modality::Audio, 0.3, 1.0),
        ];
        let pairs = vec![CorrelationPair::new(Modality::Visual, Modality::Audio, 0.6)];
        let result = fuse(&scores, &pairs, &FusionWeights::default()).unwrap();
        assert_eq!(result.correlation_penalty, 0.1);
        assert!((result.overall_score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_primary_concerns_listed() {
        let scores = vec![
            ModalityScore::new(Modality::Network, 0.9, 0.8),
            ModalityScore::new(Modality::Textual, 0.2, 0.8),
        ];
        let result = fuse(&scores, &[], &FusionWeights::default()).unwrap();
        assert_eq!(
            result.primary_concerns,
            BTreeSet::from([Modality::Network])
        );
    }

    #[test]
    fn test_invalid_input_rejected() {
        let scores = vec![ModalityScore::new(Modality::Visual, 0.5, 1.1)];
        let err = fuse(&scores, &[], &FusionWeights::default()).unwrap_err();
        assert_eq!(err.field(), "quality");
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let thresholds = FusionThresholds {
            concern: -0.5,
            ..Default::default()
        };
        assert!(RiskAggregator::new(thresholds).is_err());
    }

    #[test]
    fn test_result_carries_weights_version() {
        let weights = FusionWeights::default().with_version(9);
        let result = fuse(
            &[ModalityScore::new(Modality::Behavioral, 0.5, 1.0)],
            &[],
            &weights,
        )
        .unwrap();
        assert_eq!(result.metadata.weights_version, 9);
        assert_eq!(result.metadata.applied_weights[&Modality::Behavioral], 1.0);
    }
}
