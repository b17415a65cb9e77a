//! Explore tuning parameters
//!
//! Every numeric knob of the discovery algorithm lives here so it can be
//! changed from configuration without touching the algorithm.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wkmp_common::{Error, Result};

/// Discovery and display tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreParameters {
    /// Similar artists requested per seed (default: 15)
    #[serde(default = "default_similar_artists_per_seed")]
    pub similar_artists_per_seed: usize,

    /// Albums kept per discovered artist (default: 10)
    #[serde(default = "default_albums_per_artist")]
    pub albums_per_artist: usize,

    /// Discovery stops once the pool holds this many entries (default: 40)
    #[serde(default = "default_pool_target_size")]
    pub pool_target_size: usize,

    /// Unprocessed library artists attempted per sync run (default: 10)
    #[serde(default = "default_max_seeds_per_run")]
    pub max_seeds_per_run: usize,

    /// Items per display section (default: 20)
    #[serde(default = "default_display_cap")]
    pub display_cap: usize,

    /// Minimum gap between MusicBrainz calls, measured from completion (default: 1000ms)
    #[serde(default = "default_musicbrainz_spacing_ms")]
    pub musicbrainz_spacing_ms: u64,

    /// Minimum gap between ListenBrainz call starts (default: 500ms)
    #[serde(default = "default_listenbrainz_spacing_ms")]
    pub listenbrainz_spacing_ms: u64,

    /// Deadline for each external call (default: none)
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,
}

fn default_similar_artists_per_seed() -> usize {
    15
}

fn default_albums_per_artist() -> usize {
    10
}

fn default_pool_target_size() -> usize {
    40
}

fn default_max_seeds_per_run() -> usize {
    10
}

fn default_display_cap() -> usize {
    20
}

fn default_musicbrainz_spacing_ms() -> u64 {
    1000
}

fn default_listenbrainz_spacing_ms() -> u64 {
    500
}

impl Default for ExploreParameters {
    fn default() -> Self {
        Self {
            similar_artists_per_seed: default_similar_artists_per_seed(),
            albums_per_artist: default_albums_per_artist(),
            pool_target_size: default_pool_target_size(),
            max_seeds_per_run: default_max_seeds_per_run(),
            display_cap: default_display_cap(),
            musicbrainz_spacing_ms: default_musicbrainz_spacing_ms(),
            listenbrainz_spacing_ms: default_listenbrainz_spacing_ms(),
            call_timeout_ms: None,
        }
    }
}

impl ExploreParameters {
    pub fn musicbrainz_spacing(&self) -> Duration {
        Duration::from_millis(self.musicbrainz_spacing_ms)
    }

    pub fn listenbrainz_spacing(&self) -> Duration {
        Duration::from_millis(self.listenbrainz_spacing_ms)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }

    /// Reject values that would make discovery a silent no-op.
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("similar_artists_per_seed", self.similar_artists_per_seed),
            ("albums_per_artist", self.albums_per_artist),
            ("pool_target_size", self.pool_target_size),
            ("max_seeds_per_run", self.max_seeds_per_run),
            ("display_cap", self.display_cap),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(Error::InvalidInput(format!("{} must be at least 1", name)));
            }
        }

        if self.call_timeout_ms == Some(0) {
            return Err(Error::InvalidInput(
                "call_timeout_ms must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }
}
