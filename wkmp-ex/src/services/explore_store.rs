//! Process-lifetime store for the explore pool
//!
//! Holds exactly two values: the entries list and the sync meta. Reads return
//! a default when a value is absent; writes are read-modify-write under one
//! lock, so concurrent updaters always observe the latest value. Nothing
//! expires; only [`ExploreStore::clear`] drops state.

use crate::models::{ExploreMeta, SimilarArtistEntry};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Default)]
struct StoreState {
    entries: Option<Arc<Vec<SimilarArtistEntry>>>,
    meta: Option<ExploreMeta>,
}

/// Entries + meta store shared by explorer, orchestrator and readers
#[derive(Default)]
pub struct ExploreStore {
    state: Mutex<StoreState>,
}

impl ExploreStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // An updater that panicked leaves the previous value in place
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current entries list (empty when absent).
    ///
    /// Every write installs a fresh `Arc`, so pointer equality tells readers
    /// whether the list changed.
    pub fn entries(&self) -> Arc<Vec<SimilarArtistEntry>> {
        let mut state = self.lock();
        Arc::clone(state.entries.get_or_insert_with(|| Arc::new(Vec::new())))
    }

    pub fn entry_count(&self) -> usize {
        self.lock().entries.as_ref().map_or(0, |entries| entries.len())
    }

    /// Read-modify-write the entries list.
    ///
    /// `update` returns `None` to leave the list untouched; the current `Arc`
    /// then stays installed and snapshots derived from it remain valid.
    pub fn update_entries<R>(
        &self,
        update: impl FnOnce(&mut Vec<SimilarArtistEntry>) -> Option<R>,
    ) -> Option<R> {
        let mut state = self.lock();
        let mut next = state
            .entries
            .as_ref()
            .map(|entries| entries.as_ref().clone())
            .unwrap_or_default();
        let result = update(&mut next)?;
        state.entries = Some(Arc::new(next));
        Some(result)
    }

    /// Current meta (default when absent)
    pub fn meta(&self) -> ExploreMeta {
        self.lock().meta.clone().unwrap_or_default()
    }

    /// Read-modify-write the meta.
    pub fn update_meta<R>(&self, update: impl FnOnce(&mut ExploreMeta) -> R) -> R {
        let mut state = self.lock();
        let meta = state.meta.get_or_insert_with(ExploreMeta::default);
        update(meta)
    }

    /// Drop both entries and meta.
    pub fn clear(&self) {
        let mut state = self.lock();
        let dropped = state.entries.as_ref().map_or(0, |entries| entries.len());
        *state = StoreState::default();
        debug!(dropped_entries = dropped, "Explore store cleared");
    }
}
