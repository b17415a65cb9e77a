//! Sync orchestrator
//!
//! Entry point called on every library refresh. Picks the library artists
//! that have not seeded discovery yet, hands a capped batch to the explorer,
//! and records the outcome in meta.
//!
//! Policy: the pool is filled once. After the first completed run every call
//! short-circuits until [`SyncOrchestrator::retry_sync`] clears the store.

use crate::models::{
    ExploreParameters, LibraryArtist, SeedArtist, PARTIAL_FAILURE_MESSAGE, TOTAL_FAILURE_MESSAGE,
};
use crate::services::explore_store::ExploreStore;
use crate::services::similar_artists_explorer::SimilarArtistsExplorer;
use crate::types::LibraryProvider;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use wkmp_common::events::{EventBus, ExploreEvent, SyncSkipReason};

/// What a `run_sync` call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    /// Returned before contacting any service
    Skipped(SyncSkipReason),
    /// Ran to completion and updated meta
    Completed(SyncReport),
}

/// Summary of a completed sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub run_id: Uuid,
    /// Library ids handed to the explorer this run
    pub attempted_artist_ids: Vec<String>,
    /// Library ids the explorer marked as processed
    pub consumed_artist_ids: Vec<String>,
    pub new_entries: usize,
    /// Status message written to meta
    pub last_sync_error: Option<String>,
}

/// Clears the running flag on drop, including on panic or cancellation.
///
/// Owned rather than borrowed so it can travel into the spawned run task and
/// stay held until the explorer is really done.
struct RunGuard {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    fn acquire(running: &Arc<AtomicBool>) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                running: Arc::clone(running),
            })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Everything the detached part of a run needs once the batch is chosen
struct ExploreRun {
    _guard: RunGuard,
    run_id: Uuid,
    batch: Vec<SeedArtist>,
    attempted_artist_ids: Vec<String>,
    target: usize,
    store: Arc<ExploreStore>,
    explorer: Arc<SimilarArtistsExplorer>,
    event_bus: EventBus,
}

impl ExploreRun {
    /// Explore the batch and record the outcome in meta.
    ///
    /// Runs on its own task, so a caller that stops waiting neither releases
    /// the guard early nor loses the meta update.
    async fn execute(self) -> SyncReport {
        let run_id = self.run_id;
        let mut consumed_artist_ids = Vec::new();
        let mut new_entries = 0;
        let mut last_sync_error = None;

        if !self.batch.is_empty() {
            let explorer = Arc::clone(&self.explorer);
            let batch = self.batch;
            let target = self.target;

            // Spawned so that a panic inside the explorer surfaces as a JoinError
            // instead of unwinding through the run.
            match tokio::spawn(async move { explorer.request(&batch, target).await }).await {
                Ok(outcome) => {
                    if outcome.had_errors {
                        last_sync_error = Some(PARTIAL_FAILURE_MESSAGE.to_string());
                    }
                    new_entries = outcome.new_entries;
                    consumed_artist_ids = outcome.consumed_artist_ids;
                }
                Err(e) => {
                    error!(run_id = %run_id, error = %e, "Explore run failed");
                    last_sync_error = Some(TOTAL_FAILURE_MESSAGE.to_string());
                }
            }
        }

        let status = last_sync_error.clone();
        let consumed = consumed_artist_ids.clone();
        self.store.update_meta(move |meta| {
            meta.has_initial_fill = true;
            meta.last_sync_error = status;
            meta.merge_processed_ids(consumed);
        });

        let pool_size = self.store.entry_count();
        info!(
            run_id = %run_id,
            consumed = consumed_artist_ids.len(),
            new_entries,
            pool_size,
            status = last_sync_error.as_deref().unwrap_or("ok"),
            "Explore sync finished"
        );
        self.event_bus.emit_lossy(ExploreEvent::SyncCompleted {
            run_id,
            consumed_count: consumed_artist_ids.len(),
            pool_size,
            last_sync_error: last_sync_error.clone(),
            timestamp: Utc::now(),
        });

        SyncReport {
            run_id,
            attempted_artist_ids: self.attempted_artist_ids,
            consumed_artist_ids,
            new_entries,
            last_sync_error,
        }
    }
}

/// Sync orchestrator service
pub struct SyncOrchestrator {
    store: Arc<ExploreStore>,
    explorer: Arc<SimilarArtistsExplorer>,
    library: Arc<dyn LibraryProvider>,
    params: ExploreParameters,
    event_bus: EventBus,
    running: Arc<AtomicBool>,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<ExploreStore>,
        explorer: Arc<SimilarArtistsExplorer>,
        library: Arc<dyn LibraryProvider>,
        params: ExploreParameters,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            explorer,
            library,
            params,
            event_bus,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a run holds the guard
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Extend the pool from library artists not yet used as seeds.
    ///
    /// `current_artists` is the caller's view of the library. When it is
    /// empty the library provider is asked instead; a failing provider counts
    /// as an empty library.
    ///
    /// Overlapping calls are no-ops. Nothing is ever propagated to the caller:
    /// failures end up in `ExploreMeta::last_sync_error`.
    ///
    /// Once the batch is handed to the explorer the run is detached: dropping
    /// this future does not stop it, and later calls keep skipping until it
    /// has written its meta update.
    pub async fn run_sync(&self, current_artists: &[LibraryArtist]) -> SyncResult {
        let Some(guard) = RunGuard::acquire(&self.running) else {
            debug!("Sync already running, ignoring call");
            return self.skip(SyncSkipReason::AlreadyRunning);
        };

        if !self.library.is_authenticated() {
            debug!("No authenticated session, skipping sync");
            return self.skip(SyncSkipReason::NotAuthenticated);
        }

        if self.store.meta().has_initial_fill {
            debug!("Pool already filled, skipping sync");
            return self.skip(SyncSkipReason::AlreadyFilled);
        }

        let artists = if current_artists.is_empty() {
            self.fetch_library_artists().await
        } else {
            current_artists.to_vec()
        };

        let batch = self.select_batch(&artists);
        let run_id = Uuid::new_v4();
        let attempted_artist_ids: Vec<String> = batch.iter().filter_map(|s| s.id.clone()).collect();

        info!(
            run_id = %run_id,
            library_artists = artists.len(),
            batch = batch.len(),
            "Starting explore sync"
        );
        self.event_bus.emit_lossy(ExploreEvent::SyncStarted {
            run_id,
            seed_count: batch.len(),
            timestamp: Utc::now(),
        });

        let run = ExploreRun {
            _guard: guard,
            run_id,
            batch,
            attempted_artist_ids: attempted_artist_ids.clone(),
            target: self.params.pool_target_size,
            store: Arc::clone(&self.store),
            explorer: Arc::clone(&self.explorer),
            event_bus: self.event_bus.clone(),
        };

        match tokio::spawn(run.execute()).await {
            Ok(report) => SyncResult::Completed(report),
            Err(e) => {
                error!(run_id = %run_id, error = %e, "Explore sync task failed");
                SyncResult::Completed(SyncReport {
                    run_id,
                    attempted_artist_ids,
                    consumed_artist_ids: Vec::new(),
                    new_entries: 0,
                    last_sync_error: Some(TOTAL_FAILURE_MESSAGE.to_string()),
                })
            }
        }
    }

    /// Drop entries and meta so the next `run_sync` performs a full fill.
    pub fn retry_sync(&self) {
        info!("Explore retry requested, clearing pool");
        self.store.clear();
        self.event_bus.emit_lossy(ExploreEvent::StoreCleared {
            timestamp: Utc::now(),
        });
    }

    async fn fetch_library_artists(&self) -> Vec<LibraryArtist> {
        match self.library.list_library_artists().await {
            Ok(artists) => artists,
            Err(e) => {
                warn!(error = %e, "Failed to list library artists, treating as empty");
                Vec::new()
            }
        }
    }

    /// First `max_seeds_per_run` artists not yet processed, in library order.
    fn select_batch(&self, artists: &[LibraryArtist]) -> Vec<SeedArtist> {
        let meta = self.store.meta();
        let processed: HashSet<&str> = meta.processed_artist_ids.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();

        artists
            .iter()
            .filter(|artist| !processed.contains(artist.id.as_str()))
            .filter(|artist| seen.insert(artist.id.as_str()))
            .take(self.params.max_seeds_per_run)
            .map(SeedArtist::from)
            .collect()
    }

    fn skip(&self, reason: SyncSkipReason) -> SyncResult {
        self.event_bus.emit_lossy(ExploreEvent::SyncSkipped {
            reason,
            timestamp: Utc::now(),
        });
        SyncResult::Skipped(reason)
    }
}
