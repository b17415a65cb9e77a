//! Configuration loading and config file resolution
//!
//! Config file resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config directory (`<config_dir>/wkmp/<module>.toml`)
//!
//! A missing or unreadable config file never terminates the caller:
//! [`load_toml_or_default`] logs a warning and falls back to built-in defaults.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
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

/// Resolve the config file for a module.
///
/// Returns `None` when no candidate exists; callers then run on defaults.
pub fn resolve_config_path(
    module_name: &str,
    cli_arg: Option<&str>,
    env_var_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config directory
    let user_config = dirs::config_dir()
        .map(|d| d.join("wkmp").join(format!("{}.toml", module_name)))?;
    if user_config.exists() {
        Some(user_config)
    } else {
        None
    }
}

/// Read and parse a TOML file into `T`.
pub fn load_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let parsed = toml::from_str::<T>(&content)?;
    Ok(parsed)
}

/// Load a TOML config, falling back to `T::default()` on any failure.
///
/// Missing files and parse errors are logged at WARN, never propagated.
pub fn load_toml_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> T {
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return T::default();
    };

    match load_toml_file(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{}, using built-in defaults", e);
            T::default()
        }
    }
}
