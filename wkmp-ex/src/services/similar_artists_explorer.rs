//! Similar-artists explorer
//!
//! Grows the pool from a list of seed artists:
//!
//! 1. resolve the seed to an MBID (given, cached, or looked up by name)
//! 2. fetch artists similar to it
//! 3. for each candidate not yet pooled, fetch its profile and albums and
//!    append the entry
//!
//! Seeds and candidates are handled strictly one after another. Every
//! pool-size check reads the store fresh, and the shared limiters see a
//! simple ordered stream of calls. A failing seed or candidate is logged,
//! flagged in [`ExploreOutcome::had_errors`] and skipped; it never aborts
//! the run.

use crate::error::{ExploreError, Result};
use crate::models::{
    ExploreParameters, ExternalArtist, SeedArtist, SimilarArtistEntry, SimilarArtistRef,
};
use crate::services::explore_store::ExploreStore;
use crate::services::rate_limiter::{FifoRateLimiter, SpacedRateLimiter};
use crate::types::{ArtistCatalog, ArtistIdResolver, SimilarArtistsService};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wkmp_common::events::{EventBus, ExploreEvent};

/// Result of one explorer invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExploreOutcome {
    /// Library ids of seeds whose similar list was fetched
    pub consumed_artist_ids: Vec<String>,
    /// True if any resolution, fetch or merge step failed
    pub had_errors: bool,
    /// Entries appended to the pool by this invocation
    pub new_entries: usize,
}

/// Why a seed stopped being processed
enum SeedProgress {
    Done,
    TargetReached,
}

/// External collaborators used by the explorer
#[derive(Clone)]
pub struct ExplorerServices {
    pub resolver: Arc<dyn ArtistIdResolver>,
    pub similar: Arc<dyn SimilarArtistsService>,
    pub catalog: Arc<dyn ArtistCatalog>,
}

/// Rate limiters shared process-wide
#[derive(Clone)]
pub struct ExplorerLimiters {
    /// Id resolution, metadata and discography calls
    pub musicbrainz: Arc<FifoRateLimiter>,
    /// Similar-artists calls
    pub listenbrainz: Arc<SpacedRateLimiter>,
}

/// Similar-artists discovery service
pub struct SimilarArtistsExplorer {
    store: Arc<ExploreStore>,
    services: ExplorerServices,
    limiters: ExplorerLimiters,
    params: ExploreParameters,
    event_bus: EventBus,
}

impl SimilarArtistsExplorer {
    pub fn new(
        store: Arc<ExploreStore>,
        services: ExplorerServices,
        limiters: ExplorerLimiters,
        params: ExploreParameters,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            services,
            limiters,
            params,
            event_bus,
        }
    }

    /// Explore `seeds` in order until the pool holds `target_pool_size` entries.
    ///
    /// Never fails: per-seed and per-candidate problems are reported through
    /// `had_errors`.
    pub async fn request(&self, seeds: &[SeedArtist], target_pool_size: usize) -> ExploreOutcome {
        let mut outcome = ExploreOutcome::default();

        for seed in seeds {
            let pool_size = self.store.entry_count();
            if pool_size >= target_pool_size {
                info!(pool_size, target_pool_size, "Pool target reached, stopping");
                break;
            }

            if seed.is_various_artists() {
                debug!(seed = %seed.name, "Skipping compilation pseudo-artist");
                continue;
            }

            match self.explore_seed(seed, target_pool_size, &mut outcome).await {
                Ok(SeedProgress::Done) => {}
                Ok(SeedProgress::TargetReached) => {
                    info!(target_pool_size, "Pool target reached, stopping");
                    break;
                }
                Err(e) => {
                    warn!(seed = %seed.name, error = %e, "Seed could not be explored");
                    outcome.had_errors = true;
                }
            }
        }

        info!(
            seeds = seeds.len(),
            consumed = outcome.consumed_artist_ids.len(),
            new_entries = outcome.new_entries,
            had_errors = outcome.had_errors,
            "Explore request finished"
        );
        outcome
    }

    async fn explore_seed(
        &self,
        seed: &SeedArtist,
        target_pool_size: usize,
        outcome: &mut ExploreOutcome,
    ) -> Result<SeedProgress> {
        let mbid = self.resolve_seed(seed).await?;

        let limit = self.params.similar_artists_per_seed;
        let similar = self
            .limiters
            .listenbrainz
            .run(|| self.with_deadline(self.services.similar.get_similar_artists(&mbid, limit)))
            .await?;

        debug!(seed = %seed.name, mbid = %mbid, candidates = similar.len(), "Fetched similar artists");

        if let Some(id) = &seed.id {
            outcome.consumed_artist_ids.push(id.clone());
        }

        for candidate in similar.iter().take(limit) {
            let entries = self.store.entries();
            if entries.len() >= target_pool_size {
                return Ok(SeedProgress::TargetReached);
            }

            if candidate.artist_mbid.is_empty() {
                debug!(seed = %seed.name, "Ignoring similar artist without MBID");
                continue;
            }
            if entries
                .iter()
                .any(|entry| entry.artist.id == candidate.artist_mbid)
            {
                continue;
            }

            let Some(entry) = self.fetch_candidate(candidate, outcome).await else {
                continue;
            };
            self.merge_entry(entry, target_pool_size, outcome);
        }

        Ok(SeedProgress::Done)
    }

    /// MBID for a seed: explicit, cached by library id, or looked up by name.
    async fn resolve_seed(&self, seed: &SeedArtist) -> Result<String> {
        if let Some(mbid) = seed.mbid.as_deref().filter(|m| !m.is_empty()) {
            if let Some(id) = &seed.id {
                self.store.update_meta(|meta| meta.remember_mbid(id, mbid));
            }
            return Ok(mbid.to_string());
        }

        if let Some(id) = &seed.id {
            if let Some(mbid) = self.store.meta().server_artist_mbid_map.get(id) {
                return Ok(mbid.clone());
            }
        }

        let resolved = self
            .limiters
            .musicbrainz
            .run(|| {
                self.with_deadline(
                    self.services
                        .resolver
                        .resolve_canonical_id(seed.id.as_deref(), &seed.name),
                )
            })
            .await?;

        let mbid = resolved
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ExploreError::NotFound(format!("no MBID for '{}'", seed.name)))?;

        if let Some(id) = &seed.id {
            self.store.update_meta(|meta| meta.remember_mbid(id, &mbid));
        }
        debug!(seed = %seed.name, mbid = %mbid, "Resolved seed MBID");
        Ok(mbid)
    }

    /// Profile plus albums for a candidate.
    ///
    /// A missing profile discards the candidate; missing albums only empty the list.
    async fn fetch_candidate(
        &self,
        candidate: &SimilarArtistRef,
        outcome: &mut ExploreOutcome,
    ) -> Option<SimilarArtistEntry> {
        let mbid = candidate.artist_mbid.as_str();

        let artist: ExternalArtist = match self
            .limiters
            .musicbrainz
            .run(|| self.with_deadline(self.services.catalog.get_artist_by_id(mbid)))
            .await
        {
            Ok(Some(artist)) => artist,
            Ok(None) => {
                warn!(mbid = %mbid, "No metadata for similar artist, skipping");
                outcome.had_errors = true;
                return None;
            }
            Err(e) => {
                warn!(mbid = %mbid, error = %e, "Metadata fetch failed, skipping");
                outcome.had_errors = true;
                return None;
            }
        };

        let limit = self.params.albums_per_artist;
        let albums = match self
            .limiters
            .musicbrainz
            .run(|| {
                self.with_deadline(
                    self.services
                        .catalog
                        .get_artist_albums(mbid, &artist.name, limit),
                )
            })
            .await
        {
            Ok(mut albums) => {
                albums.truncate(limit);
                albums
            }
            Err(e) => {
                warn!(mbid = %mbid, artist = %artist.name, error = %e, "Album fetch failed, keeping artist without albums");
                outcome.had_errors = true;
                Vec::new()
            }
        };

        Some(SimilarArtistEntry { artist, albums })
    }

    /// Append unless present or full, then raise the new-data flag.
    fn merge_entry(
        &self,
        entry: SimilarArtistEntry,
        target_pool_size: usize,
        outcome: &mut ExploreOutcome,
    ) {
        let artist_id = entry.artist.id.clone();
        let artist_name = entry.artist.name.clone();
        let album_count = entry.albums.len();

        let pool_size = self.store.update_entries(|entries| {
            if entries.len() >= target_pool_size
                || entries.iter().any(|e| e.artist.id == entry.artist.id)
            {
                return None;
            }
            entries.push(entry);
            Some(entries.len())
        });

        let Some(pool_size) = pool_size else {
            debug!(mbid = %artist_id, "Entry not merged (already pooled or pool full)");
            return;
        };

        self.store.update_meta(|meta| meta.has_new_data = true);
        outcome.new_entries += 1;

        info!(mbid = %artist_id, artist = %artist_name, album_count, pool_size, "Added similar artist");
        self.event_bus.emit_lossy(ExploreEvent::PoolEntryAdded {
            artist_id,
            artist_name,
            album_count,
            pool_size,
            timestamp: Utc::now(),
        });
    }

    /// Apply the configured per-call deadline, if any.
    async fn with_deadline<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match self.params.call_timeout() {
            Some(deadline) => tokio::time::timeout(deadline, call)
                .await
                .map_err(|_| ExploreError::Timeout(deadline))?,
            None => call.await,
        }
    }
}
