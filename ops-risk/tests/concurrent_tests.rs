//! Integration tests for concurrent fusion across weight updates
//!
//! In-flight fusions must each observe exactly one weights snapshot, never a
//! mix of the old and new weights.

use chrono::{TimeZone, Utc};
use ops_risk::calibration::WeightStore;
use ops_risk::events::{RiskEvent, RiskEventBus, WeightSource};
use ops_risk::fusion::{
    CorrelationPair, FusedResult, FusionWeights, Modality, ModalityScore, RiskAggregator,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;

fn scores() -> Vec<ModalityScore> {
    vec![
        ModalityScore::new(Modality::Visual, 0.9, 0.9),
        ModalityScore::new(Modality::Audio, 0.2, 0.7),
        ModalityScore::new(Modality::Behavioral, 0.6, 0.8),
        ModalityScore::new(Modality::Network, 0.4, 1.0),
    ]
}

fn correlations() -> Vec<CorrelationPair> {
    vec![CorrelationPair::new(Modality::Visual, Modality::Audio, 0.55)]
}

fn network_heavy() -> FusionWeights {
    FusionWeights::new(BTreeMap::from([
        (Modality::Visual, 0.05),
        (Modality::Audio, 0.05),
        (Modality::Behavioral, 0.1),
        (Modality::Network, 0.8),
    ]))
    .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fusions_see_one_snapshot() {
    let at = Utc.with_ymd_and_hms(2026, 5, 2, 22, 15, 0).unwrap();
    let aggregator = Arc::new(RiskAggregator::default());
    let store = Arc::new(WeightStore::default());

    // Expected outcome for each snapshot, computed sequentially
    let expected_v0 = aggregator
        .fuse_at(&scores(), &correlations(), &FusionWeights::default(), at)
        .unwrap();
    let expected_v1 = aggregator
        .fuse_at(
            &scores(),
            &correlations(),
            &network_heavy().with_version(1),
            at,
        )
        .unwrap();
    assert_ne!(expected_v0.overall_score, expected_v1.overall_score);

    let mut join_set = JoinSet::new();
    for i in 0..1000 {
        let aggregator = Arc::clone(&aggregator);
        let store = Arc::clone(&store);

        if i == 500 {
            let store = Arc::clone(&store);
            join_set.spawn(async move {
                store.publish(network_heavy(), WeightSource::Manual);
                None
            });
        }

        join_set.spawn(async move {
            let weights = store.snapshot();
            Some(
                aggregator
                    .fuse_at(&scores(), &correlations(), &weights, at)
                    .unwrap(),
            )
        });
    }

    let mut results: Vec<FusedResult> = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        if let Some(result) = joined.unwrap() {
            results.push(result);
        }
    }

    assert_eq!(results.len(), 1000);
    for result in &results {
        match result.metadata.weights_version {
            0 => assert_eq!(result, &expected_v0),
            1 => assert_eq!(result, &expected_v1),
            other => panic!("unexpected weights version {}", other),
        }
    }

    assert_eq!(store.snapshot().version(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishes_get_distinct_versions() {
    let bus = RiskEventBus::new(64);
    let mut rx = bus.subscribe();
    let store = Arc::new(WeightStore::default().with_events(bus));

    let mut join_set = JoinSet::new();
    for _ in 0..20 {
        let store = Arc::clone(&store);
        join_set.spawn(async move { store.publish(network_heavy(), WeightSource::Manual).version() });
    }

    let mut versions = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        versions.push(joined.unwrap());
    }
    versions.sort_unstable();

    assert_eq!(versions, (1..=20).collect::<Vec<u64>>());
    assert_eq!(store.snapshot().version(), 20);

    let mut published = 0;
    while let Ok(event) = rx.try_recv() {
        assert!(matches!(event, RiskEvent::WeightsPublished { .. }));
        published += 1;
    }
    assert_eq!(published, 20);
}
