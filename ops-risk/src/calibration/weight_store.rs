//! Copy-on-write holder for the current weights snapshot
//!
//! Readers clone the `Arc` under a short read lock and compute without any
//! lock held, so an in-flight fusion always sees one complete snapshot.
//! Writers build a new `FusionWeights` off to the side and swap the `Arc`;
//! the old snapshot stays alive for as long as someone still holds it.

use crate::calibration::{calibrate, CalibrationError, CalibrationParams, LabeledSample};
use crate::events::{RiskEvent, RiskEventBus, WeightSource};
use crate::fusion::FusionWeights;
use std::sync::{Arc, RwLock};
use tracing::info;
use uuid::Uuid;

/// Current fusion weights, replaced atomically
pub struct WeightStore {
    current: RwLock<Arc<FusionWeights>>,
    events: Option<RiskEventBus>,
}

impl WeightStore {
    pub fn new(initial: FusionWeights) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            events: None,
        }
    }

    /// Publish a `WeightsPublished` event on every swap
    pub fn with_events(mut self, events: RiskEventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<FusionWeights> {
        // A poisoned lock still guards a fully-written Arc: writers only
        // ever assign a complete value.
        let guard = self.current.read().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&*guard)
    }

    /// Make `weights` current, stamped with the next version number
    pub fn publish(&self, weights: FusionWeights, source: WeightSource) -> Arc<FusionWeights> {
        let published = {
            let mut guard = self.current.write().unwrap_or_else(|p| p.into_inner());
            let next = Arc::new(weights.with_version(guard.version() + 1));
            *guard = Arc::clone(&next);
            next
        };

        info!("Published fusion weights v{} ({:?})", published.version(), source);

        if let Some(events) = &self.events {
            events.emit_lossy(RiskEvent::WeightsPublished {
                event_id: Uuid::new_v4(),
                version: published.version(),
                weights: published.as_map().clone(),
                source,
                timestamp: ops_common::time::now(),
            });
        }

        published
    }

    /// Recalibrate from labeled history and publish the result
    ///
    /// The current snapshot is read once; calibration runs without any
    /// lock held.
    pub fn recalibrate(
        &self,
        samples: &[LabeledSample],
        params: &CalibrationParams,
    ) -> Result<Arc<FusionWeights>, CalibrationError> {
        let base = self.snapshot();
        let calibrated = calibrate(samples, &base, params)?;
        Ok(self.publish(
            calibrated,
            WeightSource::Calibration {
                sample_count: samples.len(),
            },
        ))
    }
}

impl Default for WeightStore {
    fn default() -> Self {
        Self::new(FusionWeights::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Outcome;
    use crate::fusion::{Modality, ModalityScore};
    use std::collections::BTreeMap;

    fn manual_weights() -> FusionWeights {
        FusionWeights::new(BTreeMap::from([(Modality::Network, 1.0)])).unwrap()
    }

    #[test]
    fn test_snapshot_survives_publish() {
        let store = WeightStore::default();
        let before = store.snapshot();

        store.publish(manual_weights(), WeightSource::Manual);

        assert_eq!(before.get(Modality::Network), 0.20);
        assert_eq!(store.snapshot().get(Modality::Network), 1.0);
    }

    #[test]
    fn test_publish_bumps_version() {
        let store = WeightStore::default();
        let v1 = store.publish(manual_weights(), WeightSource::Manual);
        let v2 = store.publish(manual_weights().with_version(0), WeightSource::Manual);
        assert_eq!(v1.version(), 1);
        assert_eq!(v2.version(), 2);
    }

    #[tokio::test]
    async fn test_publish_emits_event() {
        let bus = RiskEventBus::new(16);
        let mut rx = bus.subscribe();
        let store = WeightStore::default().with_events(bus);

        store.publish(manual_weights(), WeightSource::Manual);

        match rx.recv().await.unwrap() {
            RiskEvent::WeightsPublished {
                version, source, ..
            } => {
                assert_eq!(version, 1);
                assert_eq!(source, WeightSource::Manual);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_recalibrate_publishes() {
        let store = WeightStore::default();
        let mut samples = Vec::new();
        for i in 0..6 {
            samples.push(LabeledSample {
                subject_id: format!("fraud-{}", i),
                outcome: Outcome::Fraudulent,
                scores: vec![ModalityScore::new(Modality::Behavioral, 0.95, 1.0)],
            });
            samples.push(LabeledSample {
                subject_id: format!("ok-{}", i),
                outcome: Outcome::Genuine,
                scores: vec![ModalityScore::new(Modality::Behavioral, 0.05, 1.0)],
            });
        }

        let published = store
            .recalibrate(&samples, &CalibrationParams::default())
            .unwrap();
        assert_eq!(published.version(), 1);
        assert_eq!(store.snapshot().version(), 1);
    }

    #[test]
    fn test_failed_recalibration_keeps_snapshot() {
        let store = WeightStore::default();
        let result = store.recalibrate(&[], &CalibrationParams::default());
        assert!(result.is_err());
        assert_eq!(store.snapshot().version(), 0);
    }
}
