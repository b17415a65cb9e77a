//! wkmp-ex - Explore (similar-artist discovery)
//!
//! Grows a bounded pool of artists similar to the ones in the user's library,
//! together with their albums, across repeated sync calls. Only library
//! artists not yet used as seeds are explored on later runs.
//!
//! The host application builds one [`ExploreState`] for the lifetime of the
//! process. It owns the pool store, the shared per-service rate limiters, the
//! explorer and the sync orchestrator, and exposes read-only projections for
//! the UI.

pub mod error;
pub mod models;
pub mod services;
pub mod types;

pub use crate::error::{ExploreError, Result};

use crate::models::{
    ExploreMeta, ExploreParameters, ExternalAlbum, ExternalArtist, LibraryArtist,
    ServiceEndpoints, SimilarArtistEntry,
};
use crate::services::{
    newest_albums, sample_albums, sample_artists, ExploreStore, ExplorerLimiters,
    ExplorerServices, FifoRateLimiter, ListenBrainzClient, MusicBrainzClient,
    SimilarArtistsExplorer, SnapshotCache, SpacedRateLimiter, SyncOrchestrator, SyncResult,
};
use crate::types::LibraryProvider;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use wkmp_common::events::{EventBus, ExploreEvent};

/// Memoised display projections
#[derive(Default)]
struct Snapshots {
    artists: SnapshotCache<ExternalArtist>,
    albums: SnapshotCache<ExternalAlbum>,
    newest: SnapshotCache<ExternalAlbum>,
}

/// Explore context shared across the host application
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct ExploreState {
    store: Arc<ExploreStore>,
    orchestrator: Arc<SyncOrchestrator>,
    limiters: ExplorerLimiters,
    params: ExploreParameters,
    event_bus: EventBus,
    reshuffle_key: Arc<AtomicU64>,
    snapshots: Arc<Mutex<Snapshots>>,
}

impl ExploreState {
    /// Wire up the store, limiters, explorer and orchestrator.
    pub fn new(
        params: ExploreParameters,
        library: Arc<dyn LibraryProvider>,
        services: ExplorerServices,
        event_bus: EventBus,
    ) -> Self {
        let store = Arc::new(ExploreStore::new());
        let limiters = ExplorerLimiters {
            musicbrainz: Arc::new(FifoRateLimiter::new(
                "musicbrainz",
                params.musicbrainz_spacing(),
            )),
            listenbrainz: Arc::new(SpacedRateLimiter::new(
                "listenbrainz",
                params.listenbrainz_spacing(),
            )),
        };

        let explorer = Arc::new(SimilarArtistsExplorer::new(
            Arc::clone(&store),
            services,
            limiters.clone(),
            params.clone(),
            event_bus.clone(),
        ));
        let orchestrator = Arc::new(SyncOrchestrator::new(
            Arc::clone(&store),
            explorer,
            library,
            params.clone(),
            event_bus.clone(),
        ));

        Self {
            store,
            orchestrator,
            limiters,
            params,
            event_bus,
            reshuffle_key: Arc::new(AtomicU64::new(0)),
            snapshots: Arc::new(Mutex::new(Snapshots::default())),
        }
    }

    /// Same as [`ExploreState::new`] with the MusicBrainz and ListenBrainz clients.
    pub fn with_default_services(
        params: ExploreParameters,
        endpoints: &ServiceEndpoints,
        library: Arc<dyn LibraryProvider>,
        event_bus: EventBus,
    ) -> Result<Self> {
        params.validate()?;
        let musicbrainz = Arc::new(MusicBrainzClient::new(endpoints)?);
        let services = ExplorerServices {
            resolver: musicbrainz.clone(),
            similar: Arc::new(ListenBrainzClient::new(endpoints)?),
            catalog: musicbrainz,
        };
        Ok(Self::new(params, library, services, event_bus))
    }

    pub fn params(&self) -> &ExploreParameters {
        &self.params
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Shared limiters, for other components calling the same services
    pub fn limiters(&self) -> &ExplorerLimiters {
        &self.limiters
    }

    /// Run one sync pass; see [`SyncOrchestrator::run_sync`].
    pub async fn run_sync(&self, current_artists: &[LibraryArtist]) -> SyncResult {
        self.orchestrator.run_sync(current_artists).await
    }

    pub fn is_syncing(&self) -> bool {
        self.orchestrator.is_running()
    }

    /// Current pool (always the latest store state)
    pub fn get_pool_entries(&self) -> Arc<Vec<SimilarArtistEntry>> {
        self.store.entries()
    }

    pub fn get_meta(&self) -> ExploreMeta {
        self.store.meta()
    }

    /// Acknowledge new data without touching entries.
    pub fn clear_new_data_flag(&self) {
        self.store.update_meta(|meta| meta.has_new_data = false);
        self.event_bus.emit_lossy(ExploreEvent::NewDataCleared {
            timestamp: Utc::now(),
        });
    }

    /// Clear entries and meta so the next sync performs a full fill.
    pub fn retry_sync(&self) {
        self.orchestrator.retry_sync();
    }

    /// Session ended (e.g. sign-out): drop everything discovered for it.
    pub fn invalidate_session(&self) {
        tracing::info!("Session invalidated, clearing explore pool");
        self.store.clear();
        self.event_bus.emit_lossy(ExploreEvent::StoreCleared {
            timestamp: Utc::now(),
        });
    }

    /// Force the shuffled projections to be recomputed on next read.
    pub fn reshuffle(&self) {
        self.reshuffle_key.fetch_add(1, Ordering::Relaxed);
    }

    /// Shuffled artists, at most `display_cap`
    pub fn artist_sample(&self) -> Arc<Vec<ExternalArtist>> {
        let entries = self.store.entries();
        let key = self.reshuffle_key.load(Ordering::Relaxed);
        let mut snapshots = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        snapshots.artists.get_or_compute(&entries, key, self.params.display_cap, |e, n| {
            sample_artists(e, n, &mut rand::thread_rng())
        })
    }

    /// Round-robin album sample, at most `display_cap`
    pub fn album_sample(&self) -> Arc<Vec<ExternalAlbum>> {
        let entries = self.store.entries();
        let key = self.reshuffle_key.load(Ordering::Relaxed);
        let mut snapshots = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        snapshots.albums.get_or_compute(&entries, key, self.params.display_cap, |e, n| {
            sample_albums(e, n, &mut rand::thread_rng())
        })
    }

    /// Newest dated albums, at most `display_cap`
    pub fn newest_albums(&self) -> Arc<Vec<ExternalAlbum>> {
        let entries = self.store.entries();
        let mut snapshots = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        // Not shuffled, so the reshuffle key does not apply
        snapshots
            .newest
            .get_or_compute(&entries, 0, self.params.display_cap, newest_albums)
    }
}
