//! Configuration for ops-risk
//!
//! Bootstrap settings come from a TOML file located by
//! [`ConfigFileResolver`] (CLI → `OPS_TOWER_CONFIG` → platform config dir).
//! A missing file means compiled defaults.
//!
//! ```toml
//! port = 5790
//!
//! [logging]
//! level = "info"
//!
//! [fusion.weights]
//! visual = 0.25
//! audio = 0.20
//! behavioral = 0.25
//! network = 0.20
//! textual = 0.10
//!
//! [fusion.thresholds]
//! fraudulent = 0.7
//! suspicious = 0.4
//!
//! [calibration]
//! learning_rate = 0.5
//! ```

use crate::calibration::CalibrationParams;
use crate::fusion::weights::DEFAULT_WEIGHTS;
use crate::fusion::{FusionThresholds, FusionWeights, ValidationError};
use ops_common::config::{load_or_default, ConfigFileResolver, LoggingConfig};
use ops_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Module name used for the config file name
pub const MODULE_NAME: &str = "ops-risk";

/// Bootstrap configuration for the risk service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskServiceConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,

    /// HTTP server port
    pub port: u16,

    /// Broadcast buffer for dashboard event streams
    pub event_capacity: usize,

    pub logging: LoggingConfig,

    pub fusion: FusionConfig,

    pub calibration: CalibrationParams,
}

impl Default for RiskServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5790,
            event_capacity: 256,
            logging: LoggingConfig::default(),
            fusion: FusionConfig::default(),
            calibration: CalibrationParams::default(),
        }
    }
}

/// `[fusion]` section: starting weights and decision thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Modality name → weight; renormalized on load
    pub weights: BTreeMap<String, f64>,

    pub thresholds: FusionThresholds,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS
                .iter()
                .map(|(m, w)| (m.as_str().to_string(), *w))
                .collect(),
            thresholds: FusionThresholds::default(),
        }
    }
}

impl RiskServiceConfig {
    /// Resolve, load and validate the config file
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = ConfigFileResolver::new(MODULE_NAME).resolve(cli_path);
        let config: Self = load_or_default(path.as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Reject weights, thresholds or calibration params that would fail later
    pub fn validate(&self) -> Result<()> {
        self.initial_weights()
            .map_err(|e| Error::Config(format!("[fusion.weights] {}", e)))?;
        self.fusion
            .thresholds
            .validate()
            .map_err(|e| Error::Config(format!("[fusion.thresholds] {}", e)))?;
        self.calibration
            .validate()
            .map_err(|e| Error::Config(format!("[calibration] {}", e)))?;
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Starting weights snapshot (version 0)
    pub fn initial_weights(&self) -> std::result::Result<FusionWeights, ValidationError> {
        FusionWeights::from_named(&self.fusion.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::Modality;

    #[test]
    fn test_defaults_validate() {
        let config = RiskServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.initial_weights().unwrap(),
            FusionWeights::default()
        );
    }

    #[test]
    fn test_partial_toml_merges_with_defaults() {
        let config: RiskServiceConfig = toml::from_str(
            r#"
port = 6001

[fusion.weights]
visual = 1.0
network = 1.0

[fusion.thresholds]
fraudulent = 0.8
"#,
        )
        .unwrap();

        assert_eq!(config.port, 6001);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.fusion.thresholds.fraudulent, 0.8);
        assert_eq!(config.fusion.thresholds.suspicious, 0.4);

        let weights = config.initial_weights().unwrap();
        assert_eq!(weights.get(Modality::Visual), 0.5);
        assert_eq!(weights.get(Modality::Audio), 0.0);
    }

    #[test]
    fn test_unknown_modality_in_weights_rejected() {
        let mut config = RiskServiceConfig::default();
        config.fusion.weights.insert("gps".to_string(), 0.3);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gps"));
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut config = RiskServiceConfig::default();
        config.fusion.thresholds.suspicious = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_calibration_rejected() {
        let mut config = RiskServiceConfig::default();
        config.calibration.min_samples = 0;
        assert!(config.validate().is_err());
    }
}
