//! Sync metadata persisted alongside the pool

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Status message when the explorer run itself failed
pub const TOTAL_FAILURE_MESSAGE: &str = "Failed to load similar artists";

/// Status message when some seeds or candidates failed
pub const PARTIAL_FAILURE_MESSAGE: &str = "Some similar artists could not be loaded";

/// Sync progress and status for the explore pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploreMeta {
    /// Set once the first sync run finishes; later runs short-circuit
    pub has_initial_fill: bool,
    /// Set when new entries arrive, cleared by the UI
    pub has_new_data: bool,
    /// Library artist ids already used as seeds (no duplicates)
    pub processed_artist_ids: Vec<String>,
    /// Library artist id -> MBID, written once per library id
    pub server_artist_mbid_map: HashMap<String, String>,
    /// Human-readable status of the last run, `None` on full success
    pub last_sync_error: Option<String>,
}

impl ExploreMeta {
    /// Merge ids into `processed_artist_ids`, keeping first-seen order.
    pub fn merge_processed_ids<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: HashSet<String> = self.processed_artist_ids.iter().cloned().collect();
        for id in ids {
            let id = id.into();
            if seen.insert(id.clone()) {
                self.processed_artist_ids.push(id);
            }
        }
    }

    /// Record a library id -> MBID mapping. Existing mappings are never overwritten.
    ///
    /// Returns true when the mapping was inserted.
    pub fn remember_mbid(&mut self, library_id: &str, mbid: &str) -> bool {
        if self.server_artist_mbid_map.contains_key(library_id) {
            return false;
        }
        self.server_artist_mbid_map
            .insert(library_id.to_string(), mbid.to_string());
        true
    }
}
