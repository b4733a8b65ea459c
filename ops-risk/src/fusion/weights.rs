// Fusion Weights - Per-Modality Weighting
//
// Weights are non-negative and always sum to 1.0. A weights object is an
// immutable snapshot; recalibration produces a new one with a higher version.

use crate::fusion::{Modality, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance used when checking that weights sum to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Default starting weights (uncalibrated)
pub const DEFAULT_WEIGHTS: [(Modality, f64); 5] = [
    (Modality::Visual, 0.25),
    (Modality::Audio, 0.20),
    (Modality::Behavioral, 0.25),
    (Modality::Network, 0.20),
    (Modality::Textual, 0.10),
];

/// Normalized modality → weight mapping
///
/// Modalities missing from the map weigh zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct FusionWeights {
    weights: BTreeMap<Modality, f64>,
    version: u64,
}

#[derive(Deserialize)]
struct RawWeights {
    weights: BTreeMap<Modality, f64>,
    #[serde(default)]
    version: u64,
}

impl TryFrom<RawWeights> for FusionWeights {
    type Error = ValidationError;

    fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
        Ok(FusionWeights::new(raw.weights)?.with_version(raw.version))
    }
}

impl FusionWeights {
    /// Validate and renormalize raw weights
    ///
    /// Rejects negative or non-finite weights and an all-zero mapping.
    /// Weights already summing to 1.0 within [`WEIGHT_SUM_TOLERANCE`] are
    /// kept as given.
    pub fn new(raw: BTreeMap<Modality, f64>) -> Result<Self, ValidationError> {
        for (&modality, &value) in &raw {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidWeight { modality, value });
            }
        }

        if raw.values().all(|&value| value <= 0.0) {
            return Err(ValidationError::ZeroWeights);
        }

        Ok(Self {
            weights: normalized(raw),
            version: 0,
        })
    }

    /// Build weights from modality names (config files, HTTP bodies)
    pub fn from_named(raw: &BTreeMap<String, f64>) -> Result<Self, ValidationError> {
        let mut parsed = BTreeMap::new();
        for (name, &value) in raw {
            let modality: Modality = name.parse()?;
            parsed.insert(modality, value);
        }
        Self::new(parsed)
    }

    /// Equal weight for every modality
    pub fn uniform() -> Self {
        let share = 1.0 / Modality::ALL.len() as f64;
        Self {
            weights: Modality::ALL.iter().map(|&m| (m, share)).collect(),
            version: 0,
        }
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Weight for `modality` (0.0 if unset)
    pub fn get(&self, modality: Modality) -> f64 {
        self.weights.get(&modality).copied().unwrap_or(0.0)
    }

    pub fn as_map(&self) -> &BTreeMap<Modality, f64> {
        &self.weights
    }

    pub fn iter(&self) -> impl Iterator<Item = (Modality, f64)> + '_ {
        self.weights.iter().map(|(&m, &w)| (m, w))
    }

    /// Weights restricted to `present` and rescaled to sum to 1.0
    ///
    /// An absent modality's share is redistributed proportionally. If every
    /// present modality weighs zero, the present modalities share equally.
    pub fn renormalized_over(&self, present: &[Modality]) -> BTreeMap<Modality, f64> {
        if present.is_empty() {
            return BTreeMap::new();
        }

        let total: f64 = present.iter().map(|&m| self.get(m)).sum();
        if total <= 0.0 {
            let share = 1.0 / present.len() as f64;
            return present.iter().map(|&m| (m, share)).collect();
        }

        present.iter().map(|&m| (m, self.get(m) / total)).collect()
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            weights: normalized(DEFAULT_WEIGHTS.iter().copied().collect()),
            version: 0,
        }
    }
}

/// Rescale finite, non-negative weights with a positive maximum to sum to 1.0
fn normalized(raw: BTreeMap<Modality, f64>) -> BTreeMap<Modality, f64> {
    let total: f64 = raw.values().sum();
    if (total - 1.0).abs() < WEIGHT_SUM_TOLERANCE {
        return raw;
    }

    // Divide by the largest weight first: the raw sum of large finite
    // weights can overflow to infinity.
    let largest = raw.values().copied().fold(0.0, f64::max);
    let scaled_total: f64 = raw.values().map(|value| value / largest).sum();

    raw.into_iter()
        .map(|(modality, value)| (modality, value / largest / scaled_total))
        .collect()
}
