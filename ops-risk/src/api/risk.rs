//! Risk assessment API handlers
//!
//! POST /risk/fuse, GET /risk/weights, PUT /risk/weights, POST /risk/calibrate

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    calibration::{CalibrationParams, LabeledSample, Outcome},
    error::ApiResult,
    events::{RiskEvent, WeightSource},
    fusion::{
        CorrelationPair, FusedResult, FusionWeights, Modality, ModalityScore, ValidationError,
        Verdict,
    },
    AppState,
};

/// One modality score as sent over the wire
///
/// The modality is a free string so unknown names come back as a 400 with
/// `field: "modality"` instead of a generic body rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct ModalityScoreInput {
    pub modality: String,
    pub score: f64,
    pub quality: f64,
}

impl TryFrom<&ModalityScoreInput> for ModalityScore {
    type Error = ValidationError;

    fn try_from(input: &ModalityScoreInput) -> Result<Self, Self::Error> {
        Ok(ModalityScore::new(
            input.modality.parse()?,
            input.score,
            input.quality,
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationInput {
    pub modality_a: String,
    pub modality_b: String,
    pub agreement: f64,
}

impl TryFrom<&CorrelationInput> for CorrelationPair {
    type Error = ValidationError;

    fn try_from(input: &CorrelationInput) -> Result<Self, Self::Error> {
        Ok(CorrelationPair::new(
            input.modality_a.parse()?,
            input.modality_b.parse()?,
            input.agreement,
        ))
    }
}

/// POST /risk/fuse request
#[derive(Debug, Deserialize)]
pub struct FuseRequest {
    /// Subject being assessed, echoed into `RiskAssessed` events
    #[serde(default)]
    pub subject_id: Option<String>,
    pub scores: Vec<ModalityScoreInput>,
    #[serde(default)]
    pub correlations: Vec<CorrelationInput>,
}

/// GET/PUT /risk/weights response
#[derive(Debug, Serialize)]
pub struct WeightsResponse {
    pub version: u64,
    pub weights: BTreeMap<Modality, f64>,
}

impl From<&FusionWeights> for WeightsResponse {
    fn from(weights: &FusionWeights) -> Self {
        Self {
            version: weights.version(),
            weights: weights.as_map().clone(),
        }
    }
}

/// PUT /risk/weights request
#[derive(Debug, Deserialize)]
pub struct UpdateWeightsRequest {
    /// Modality name → weight; renormalized before publishing
    pub weights: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct LabeledSampleInput {
    pub subject_id: String,
    pub outcome: Outcome,
    pub scores: Vec<ModalityScoreInput>,
}

/// POST /risk/calibrate request
#[derive(Debug, Deserialize)]
pub struct CalibrateRequest {
    pub samples: Vec<LabeledSampleInput>,
    /// Overrides the service's configured calibration params
    #[serde(default)]
    pub params: Option<CalibrationParams>,
}

/// POST /risk/calibrate response
#[derive(Debug, Serialize)]
pub struct CalibrateResponse {
    pub status: String,
    pub sample_count: usize,
    pub version: u64,
    pub weights: BTreeMap<Modality, f64>,
}

fn parse_scores(inputs: &[ModalityScoreInput]) -> Result<Vec<ModalityScore>, ValidationError> {
    inputs.iter().map(ModalityScore::try_from).collect()
}

/// POST /risk/fuse
///
/// Fuses against the weights snapshot current when the request arrives.
/// Suspicious and fraudulent verdicts are broadcast as `RiskAssessed`.
pub async fn fuse_scores(
    State(state): State<AppState>,
    Json(request): Json<FuseRequest>,
) -> ApiResult<Json<FusedResult>> {
    let scores = parse_scores(&request.scores)?;
    let correlations = request
        .correlations
        .iter()
        .map(CorrelationPair::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let weights = state.weights.snapshot();
    let result = state.aggregator.fuse(&scores, &correlations, &weights)?;

    tracing::debug!(
        subject = ?request.subject_id,
        verdict = %result.verdict,
        overall = result.overall_score,
        "Fused risk request"
    );

    if result.verdict != Verdict::Genuine {
        match state
            .event_bus
            .emit(RiskEvent::assessed(request.subject_id, &result))
        {
            Ok(delivered) => tracing::debug!("RiskAssessed sent to {} subscribers", delivered),
            Err(_) => tracing::debug!("RiskAssessed dropped, no subscribers"),
        }
    }

    Ok(Json(result))
}

/// GET /risk/weights
pub async fn get_weights(State(state): State<AppState>) -> Json<WeightsResponse> {
    Json(WeightsResponse::from(&*state.weights.snapshot()))
}

/// PUT /risk/weights
///
/// Replaces the weights wholesale; modalities left out weigh zero.
pub async fn update_weights(
    State(state): State<AppState>,
    Json(request): Json<UpdateWeightsRequest>,
) -> ApiResult<Json<WeightsResponse>> {
    tracing::info!(weights = ?request.weights, "Manual weights update");

    let weights = FusionWeights::from_named(&request.weights)?;
    let published = state.weights.publish(weights, WeightSource::Manual);

    Ok(Json(WeightsResponse::from(&*published)))
}

/// POST /risk/calibrate
pub async fn calibrate_weights(
    State(state): State<AppState>,
    Json(request): Json<CalibrateRequest>,
) -> ApiResult<Json<CalibrateResponse>> {
    let samples = request
        .samples
        .iter()
        .map(|s| -> Result<LabeledSample, ValidationError> {
            Ok(LabeledSample {
                subject_id: s.subject_id.clone(),
                outcome: s.outcome,
                scores: parse_scores(&s.scores)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let params = request.params.unwrap_or_else(|| state.calibration.clone());
    let published = state.weights.recalibrate(&samples, &params)?;

    Ok(Json(CalibrateResponse {
        status: "published".to_string(),
        sample_count: samples.len(),
        version: published.version(),
        weights: published.as_map().clone(),
    }))
}

/// Build risk routes
pub fn risk_routes() -> Router<AppState> {
    Router::new()
        .route("/risk/fuse", post(fuse_scores))
        .route("/risk/weights", get(get_weights).put(update_weights))
        .route("/risk/calibrate", post(calibrate_weights))
}
