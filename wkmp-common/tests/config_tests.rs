//! Unit tests for configuration loading and graceful degradation
//!
//! Missing or malformed TOML files must never terminate the caller; they
//! produce a warning and built-in defaults.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.

use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;
use wkmp_common::config::{load_toml_file, load_toml_or_default, resolve_config_path, LoggingConfig};
use wkmp_common::Error;

#[derive(Debug, Default, Deserialize, PartialEq)]
struct SampleConfig {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    name: Option<String>,
}

const TEST_ENV_VAR: &str = "WKMP_TEST_CONFIG";

#[test]
fn test_logging_config_defaults() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.file.is_none());
}

#[test]
fn test_load_toml_file_parses_sections() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sample.toml");
    fs::write(&path, "name = \"explore\"\n\n[logging]\nlevel = \"debug\"\n").unwrap();

    let config: SampleConfig = load_toml_file(&path).unwrap();

    assert_eq!(config.name.as_deref(), Some("explore"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_toml_file_missing_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let result: Result<SampleConfig, Error> = load_toml_file(&temp_dir.path().join("nope.toml"));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_load_toml_file_malformed_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "name = [unterminated").unwrap();

    let result: Result<SampleConfig, Error> = load_toml_file(&path);
    assert!(matches!(result, Err(Error::TomlParse(_))));
}

#[test]
fn test_load_or_default_degrades_gracefully() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "this is not toml =").unwrap();

    let from_broken: SampleConfig = load_toml_or_default(Some(&path));
    let from_none: SampleConfig = load_toml_or_default(None);

    assert_eq!(from_broken, SampleConfig::default());
    assert_eq!(from_none, SampleConfig::default());
}

#[test]
#[serial]
fn test_resolve_prefers_cli_argument() {
    env::set_var(TEST_ENV_VAR, "/tmp/from-env.toml");

    let path = resolve_config_path("wkmp-test", Some("/tmp/from-cli.toml"), TEST_ENV_VAR);

    assert_eq!(path.as_deref(), Some(std::path::Path::new("/tmp/from-cli.toml")));
    env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_resolve_uses_env_var() {
    env::set_var(TEST_ENV_VAR, "/tmp/from-env.toml");

    let path = resolve_config_path("wkmp-test", None, TEST_ENV_VAR);

    assert_eq!(path.as_deref(), Some(std::path::Path::new("/tmp/from-env.toml")));
    env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_resolve_without_candidates_is_none() {
    env::remove_var(TEST_ENV_VAR);

    // No such module config exists in the user's config dir
    let path = resolve_config_path("wkmp-test-module-that-does-not-exist", None, TEST_ENV_VAR);

    assert!(path.is_none());
}
