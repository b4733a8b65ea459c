//! Unit tests for configuration resolution and graceful degradation
//!
//! Tests that manipulate OPS_TOWER_CONFIG are marked with #[serial]
//! to ensure they run sequentially, not in parallel.

use ops_common::config::{
    load_or_default, load_toml_config, write_toml_config, ConfigFileResolver, LoggingConfig,
    CONFIG_ENV_VAR,
};
use serde::{Deserialize, Serialize};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SampleConfig {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    logging: LoggingConfig,
}

fn default_port() -> u16 {
    5800
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            logging: LoggingConfig::default(),
        }
    }
}

#[test]
fn test_logging_config_defaults() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.file.is_none());
}

#[test]
#[serial]
fn test_resolver_cli_arg_wins() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolver = ConfigFileResolver::new("ops-risk");
    let cli = PathBuf::from("/tmp/from-cli.toml");
    assert_eq!(resolver.resolve(Some(&cli)), Some(cli.clone()));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolver_env_var_used_without_cli() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolver = ConfigFileResolver::new("ops-risk");
    assert_eq!(
        resolver.resolve(None),
        Some(PathBuf::from("/tmp/from-env.toml"))
    );

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolver_custom_env_var() {
    env::set_var("OPS_TEST_CUSTOM_CONFIG", "/tmp/custom.toml");

    let resolver = ConfigFileResolver::new("ops-risk").with_env_var("OPS_TEST_CUSTOM_CONFIG");
    assert_eq!(resolver.resolve(None), Some(PathBuf::from("/tmp/custom.toml")));

    env::remove_var("OPS_TEST_CUSTOM_CONFIG");
}

#[test]
#[serial]
fn test_resolver_blank_env_var_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    let resolver = ConfigFileResolver::new("ops-risk-test-module-without-file");
    // Only platform locations remain, none of which exist for this module name
    assert_eq!(resolver.resolve(None), None);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_default_locations_named_after_module() {
    let resolver = ConfigFileResolver::new("ops-risk");
    let locations = resolver.default_locations();
    assert!(!locations.is_empty());
    assert!(locations
        .iter()
        .all(|p| p.file_name().unwrap() == "ops-risk.toml"));
}

#[test]
fn test_load_or_default_missing_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.toml");

    let config: SampleConfig = load_or_default(Some(&missing)).unwrap();
    assert_eq!(config, SampleConfig::default());

    let config: SampleConfig = load_or_default(None).unwrap();
    assert_eq!(config.port, 5800);
}

#[test]
fn test_load_or_default_reads_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ops-risk.toml");
    std::fs::write(
        &path,
        r#"
port = 6100

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config: SampleConfig = load_or_default(Some(&path)).unwrap();
    assert_eq!(config.port, 6100);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_or_default_malformed_file_errors() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    let result: ops_common::Result<SampleConfig> = load_or_default(Some(&path));
    assert!(result.is_err());
}

#[test]
fn test_load_toml_config_missing_file_errors() {
    let temp = TempDir::new().unwrap();
    let result: ops_common::Result<SampleConfig> =
        load_toml_config(&temp.path().join("nope.toml"));
    assert!(result.is_err());
}

#[test]
fn test_write_then_load_preserves_values() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("ops-risk.toml");

    let config = SampleConfig {
        port: 7000,
        logging: LoggingConfig {
            level: "warn".to_string(),
            file: Some(PathBuf::from("/var/log/ops-risk.log")),
        },
    };
    write_toml_config(&config, &path).unwrap();

    let loaded: SampleConfig = load_toml_config(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(!path.with_extension("toml.tmp").exists());
}
