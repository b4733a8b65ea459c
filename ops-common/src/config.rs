//! Bootstrap configuration loading and config file resolution
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`OPS_TOWER_CONFIG` unless overridden)
//! 3. Per-user config file (`~/.config/ops-tower/<module>.toml`)
//! 4. System config file (`/etc/ops-tower/<module>.toml`, Linux only)
//!
//! A missing file is not fatal: callers receive compiled defaults and a
//! warning is logged.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "OPS_TOWER_CONFIG";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stdout if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locates the TOML config file for one module
pub struct ConfigFileResolver {
    module_name: String,
    env_var_name: String,
}

impl ConfigFileResolver {
    /// Create a resolver for `module_name` using the default env var
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            env_var_name: CONFIG_ENV_VAR.to_string(),
        }
    }

    /// Override the environment variable consulted at priority 2
    pub fn with_env_var(mut self, env_var_name: &str) -> Self {
        self.env_var_name = env_var_name.to_string();
        self
    }

    /// Resolve the config file path, or `None` if no candidate exists
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3/4: Platform config locations
        self.default_locations().into_iter().find(|p| p.exists())
    }

    /// Platform config file candidates, most specific first
    pub fn default_locations(&self) -> Vec<PathBuf> {
        let file_name = format!("{}.toml", self.module_name);
        let mut candidates = Vec::new();

        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("ops-tower").join(&file_name));
        }
        if cfg!(target_os = "linux") {
            candidates.push(PathBuf::from("/etc/ops-tower").join(&file_name));
        }

        candidates
    }
}

/// Parse a TOML config file
///
/// Unlike [`load_or_default`], a missing or malformed file is an error.
pub fn load_toml_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Load config from `path`, falling back to defaults when the file is absent
///
/// A file that exists but fails to parse is still an error: silently
/// ignoring a typo in a threshold would be worse than refusing to start.
pub fn load_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) if path.exists() => {
            let config = load_toml_config(path)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        Some(path) => {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            Ok(T::default())
        }
        None => {
            warn!("No config file found, using compiled defaults");
            Ok(T::default())
        }
    }
}

/// Write config to TOML atomically (temp file + rename)
pub fn write_toml_config<T: Serialize>(config: &T, target: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = target.with_extension("toml.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, target)?;
    Ok(())
}
