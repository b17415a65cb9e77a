//! TOML configuration for the explore module
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [explore]
//! pool_target_size = 60
//! musicbrainz_spacing_ms = 1100
//!
//! [services]
//! user_agent = "MyPlayer/2.0 (me@example.com)"
//! ```
//!
//! Every section is optional.

use super::ExploreParameters;
use serde::Deserialize;
use std::path::Path;
use wkmp_common::config::{load_toml_or_default, resolve_config_path, LoggingConfig};
use wkmp_common::Result;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "WKMP_EX_CONFIG";

const MODULE_NAME: &str = "wkmp-ex";

/// Full explore configuration file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExploreConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub explore: ExploreParameters,

    #[serde(default)]
    pub services: ServiceEndpoints,
}

impl ExploreConfig {
    /// Resolve, load and validate the config.
    ///
    /// A missing or malformed file yields defaults; invalid tuning values are an error.
    pub fn load(cli_arg: Option<&str>) -> Result<Self> {
        let path = resolve_config_path(MODULE_NAME, cli_arg, CONFIG_ENV_VAR);
        Self::load_from(path.as_deref())
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config: Self = load_toml_or_default(path);
        config.explore.validate()?;
        Ok(config)
    }
}

/// External service endpoints
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServiceEndpoints {
    /// MusicBrainz web service root (id resolution, metadata, discography)
    #[serde(default = "default_musicbrainz_base_url")]
    pub musicbrainz_base_url: String,

    /// ListenBrainz labs API root (similar artists)
    #[serde(default = "default_listenbrainz_base_url")]
    pub listenbrainz_base_url: String,

    /// User-Agent sent to both services (MusicBrainz requires contact info)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// ListenBrainz similarity dataset name
    #[serde(default = "default_similar_artists_algorithm")]
    pub similar_artists_algorithm: String,

    /// Transport-level HTTP timeout
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_musicbrainz_base_url() -> String {
    "https://musicbrainz.org/ws/2".to_string()
}

fn default_listenbrainz_base_url() -> String {
    "https://labs.api.listenbrainz.org".to_string()
}

fn default_user_agent() -> String {
    format!(
        "WKMP/{} (https://github.com/wkmp/wkmp)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_similar_artists_algorithm() -> String {
    "session_based_days_7500_session_300_contribution_5_threshold_10_limit_100_filter_True_skip_30"
        .to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            musicbrainz_base_url: default_musicbrainz_base_url(),
            listenbrainz_base_url: default_listenbrainz_base_url(),
            user_agent: default_user_agent(),
            similar_artists_algorithm: default_similar_artists_algorithm(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}
