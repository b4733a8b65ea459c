//! Modality score providers
//!
//! A provider analyses one channel (camera frames, call audio, trip
//! behaviour, device/network fingerprints, chat text) for a subject and a
//! time window and returns at most one [`ModalityScore`]. Providers live
//! outside this crate; the aggregator only needs the scores they produce
//! and tolerates any subset being absent.

use crate::fusion::{Modality, ModalityScore, ValidationError};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Subject (driver, passenger or session) and the window being assessed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectWindow {
    pub subject_id: String,
    /// Inclusive window start
    pub start: DateTime<Utc>,
    /// Exclusive window end
    pub end: DateTime<Utc>,
}

impl SubjectWindow {
    pub fn new(subject_id: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            subject_id: subject_id.into(),
            start,
            end,
        }
    }

    /// Trailing window of `minutes` ending at `end`
    pub fn trailing(subject_id: impl Into<String>, end: DateTime<Utc>, minutes: i64) -> Self {
        Self::new(subject_id, ops_common::time::window_start(end, minutes), end)
    }
}

/// One analysis channel
///
/// # Example
/// ```rust,ignore
/// struct ChatToneProvider { client: ToneClient }
///
/// #[async_trait::async_trait]
/// impl ModalityProvider for ChatToneProvider {
///     fn modality(&self) -> Modality { Modality::Textual }
///
///     async fn score(&self, window: &SubjectWindow) -> Option<ModalityScore> {
///         let tone = self.client.analyse(&window.subject_id, window.start, window.end).await.ok()?;
///         Some(ModalityScore::new(Modality::Textual, tone.risk, tone.coverage))
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait ModalityProvider: Send + Sync {
    /// Channel this provider reports on
    fn modality(&self) -> Modality;

    /// Score for the window, or `None` when the channel has no data
    async fn score(&self, window: &SubjectWindow) -> Option<ModalityScore>;
}

/// Run all providers concurrently and gather their scores
///
/// Absent scores are skipped. A provider reporting a modality other than
/// the one it declares, or two providers sharing a modality, is a wiring
/// bug and is rejected.
pub async fn collect_scores(
    providers: &[Arc<dyn ModalityProvider>],
    window: &SubjectWindow,
) -> Result<Vec<ModalityScore>, ValidationError> {
    let mut declared = BTreeSet::new();
    for provider in providers {
        if !declared.insert(provider.modality()) {
            return Err(ValidationError::DuplicateModality(provider.modality()));
        }
    }

    let results = join_all(providers.iter().map(|p| p.score(window))).await;

    let mut scores = Vec::new();
    for (provider, result) in providers.iter().zip(results) {
        match result {
            Some(score) if score.modality != provider.modality() => {
                warn!(
                    "Provider declared {} but returned a {} score",
                    provider.modality(),
                    score.modality
                );
                return Err(ValidationError::ModalityMismatch {
                    expected: provider.modality(),
                    actual: score.modality,
                });
            }
            Some(score) => scores.push(score),
            None => debug!(
                "No {} score for subject {}",
                provider.modality(),
                window.subject_id
            ),
        }
    }

    Ok(scores)
}
