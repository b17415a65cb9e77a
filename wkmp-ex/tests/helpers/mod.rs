//! Test Helper Utilities
//!
//! Scripted in-memory stand-ins for the library server and the external
//! services. Every call is recorded so tests can assert on traffic.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wkmp_common::events::EventBus;
use wkmp_ex::models::{
    ExploreParameters, ExternalAlbum, ExternalArtist, LibraryArtist, SeedArtist,
    SimilarArtistRef,
};
use wkmp_ex::services::{
    ExploreStore, ExplorerLimiters, ExplorerServices, FifoRateLimiter, SimilarArtistsExplorer,
    SpacedRateLimiter,
};
use wkmp_ex::types::{ArtistCatalog, ArtistIdResolver, LibraryProvider, SimilarArtistsService};
use wkmp_ex::{ExploreError, ExploreState, Result};

/// One recorded collaborator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListLibrary,
    Resolve(String),
    Similar(String),
    Artist(String),
    Albums(String),
}

/// Scripted music world implementing every collaborator trait
#[derive(Default)]
pub struct FakeWorld {
    pub authenticated: AtomicBool,
    pub library: Mutex<Vec<LibraryArtist>>,
    pub library_fails: AtomicBool,
    /// artist name -> MBID
    pub mbids: Mutex<HashMap<String, String>>,
    /// seed MBID -> similar MBIDs
    pub similar: Mutex<HashMap<String, Vec<String>>>,
    /// MBID -> artist name
    pub artists: Mutex<HashMap<String, String>>,
    /// MBID -> albums
    pub albums: Mutex<HashMap<String, Vec<ExternalAlbum>>>,
    pub failing_resolve: Mutex<HashSet<String>>,
    pub failing_similar: Mutex<HashSet<String>>,
    pub failing_metadata: Mutex<HashSet<String>>,
    pub failing_albums: Mutex<HashSet<String>>,
    pub panic_on_similar: AtomicBool,
    /// Artificial latency for similar-artist calls
    pub similar_delay: Mutex<Option<Duration>>,
    /// Artificial latency for metadata calls
    pub metadata_delay: Mutex<Option<Duration>>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeWorld {
    pub fn new() -> Arc<Self> {
        let world = Self::default();
        world.authenticated.store(true, Ordering::SeqCst);
        Arc::new(world)
    }

    /// Register a seed artist and the similar artists it points to.
    ///
    /// Every similar MBID gets a profile named after it and two dated albums.
    pub fn seed(&self, name: &str, mbid: &str, similar: &[&str]) {
        self.mbids
            .lock()
            .unwrap()
            .insert(name.to_string(), mbid.to_string());
        self.similar.lock().unwrap().insert(
            mbid.to_string(),
            similar.iter().map(|s| s.to_string()).collect(),
        );
        for candidate in similar {
            self.add_artist(candidate, 2);
        }
    }

    pub fn add_artist(&self, mbid: &str, album_count: usize) {
        let name = format!("Artist {mbid}");
        self.artists
            .lock()
            .unwrap()
            .insert(mbid.to_string(), name.clone());
        let albums = (0..album_count)
            .map(|i| {
                ExternalAlbum::new(
                    format!("{mbid}-album-{i}"),
                    format!("Album {i}"),
                    name.clone(),
                    Some(format!("20{:02}-01-01", 10 + i).as_str()),
                )
            })
            .collect();
        self.albums.lock().unwrap().insert(mbid.to_string(), albums);
    }

    pub fn set_library(&self, artists: &[(&str, &str)]) {
        *self.library.lock().unwrap() = artists
            .iter()
            .map(|(id, name)| LibraryArtist::new(*id, *name))
            .collect();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn network_calls(&self) -> usize {
        self.count(|c| !matches!(c, Call::ListLibrary))
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LibraryProvider for FakeWorld {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn list_library_artists(&self) -> Result<Vec<LibraryArtist>> {
        self.record(Call::ListLibrary);
        if self.library_fails.load(Ordering::SeqCst) {
            return Err(ExploreError::Service("library offline".to_string()));
        }
        Ok(self.library.lock().unwrap().clone())
    }
}

#[async_trait]
impl ArtistIdResolver for FakeWorld {
    async fn resolve_canonical_id(
        &self,
        _known_id: Option<&str>,
        name: &str,
    ) -> Result<Option<String>> {
        self.record(Call::Resolve(name.to_string()));
        if self.failing_resolve.lock().unwrap().contains(name) {
            return Err(ExploreError::Network("connection reset".to_string()));
        }
        Ok(self.mbids.lock().unwrap().get(name).cloned())
    }
}

#[async_trait]
impl SimilarArtistsService for FakeWorld {
    async fn get_similar_artists(&self, mbid: &str, limit: usize) -> Result<Vec<SimilarArtistRef>> {
        self.record(Call::Similar(mbid.to_string()));
        let delay = *self.similar_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic_on_similar.load(Ordering::SeqCst) {
            panic!("similar-artists service exploded");
        }
        if self.failing_similar.lock().unwrap().contains(mbid) {
            return Err(ExploreError::Api {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self
            .similar
            .lock()
            .unwrap()
            .get(mbid)
            .map(|ids| ids.iter().take(limit).map(SimilarArtistRef::new).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ArtistCatalog for FakeWorld {
    async fn get_artist_by_id(&self, mbid: &str) -> Result<Option<ExternalArtist>> {
        self.record(Call::Artist(mbid.to_string()));
        let delay = *self.metadata_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_metadata.lock().unwrap().contains(mbid) {
            return Err(ExploreError::Api {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        Ok(self
            .artists
            .lock()
            .unwrap()
            .get(mbid)
            .map(|name| ExternalArtist::new(mbid, name.clone())))
    }

    async fn get_artist_albums(
        &self,
        mbid: &str,
        _name: &str,
        _limit: usize,
    ) -> Result<Vec<ExternalAlbum>> {
        self.record(Call::Albums(mbid.to_string()));
        if self.failing_albums.lock().unwrap().contains(mbid) {
            return Err(ExploreError::Parse("unexpected body".to_string()));
        }
        Ok(self
            .albums
            .lock()
            .unwrap()
            .get(mbid)
            .cloned()
            .unwrap_or_default())
    }
}

/// Parameters with no request spacing so tests run instantly
pub fn fast_params() -> ExploreParameters {
    ExploreParameters {
        musicbrainz_spacing_ms: 0,
        listenbrainz_spacing_ms: 0,
        ..Default::default()
    }
}

pub fn services(world: &Arc<FakeWorld>) -> ExplorerServices {
    ExplorerServices {
        resolver: world.clone(),
        similar: world.clone(),
        catalog: world.clone(),
    }
}

pub fn limiters(params: &ExploreParameters) -> ExplorerLimiters {
    ExplorerLimiters {
        musicbrainz: Arc::new(FifoRateLimiter::new("musicbrainz", params.musicbrainz_spacing())),
        listenbrainz: Arc::new(SpacedRateLimiter::new("listenbrainz", params.listenbrainz_spacing())),
    }
}

/// Explorer plus the store it writes to
pub fn create_test_explorer(
    world: &Arc<FakeWorld>,
    params: ExploreParameters,
) -> (SimilarArtistsExplorer, Arc<ExploreStore>) {
    let store = Arc::new(ExploreStore::new());
    let explorer = SimilarArtistsExplorer::new(
        Arc::clone(&store),
        services(world),
        limiters(&params),
        params,
        EventBus::new(100),
    );
    (explorer, store)
}

pub fn create_test_state(world: &Arc<FakeWorld>, params: ExploreParameters) -> ExploreState {
    ExploreState::new(params, world.clone(), services(world), EventBus::new(100))
}

pub fn seed(id: &str, name: &str) -> SeedArtist {
    SeedArtist {
        id: Some(id.to_string()),
        name: name.to_string(),
        mbid: None,
    }
}

pub fn library(artists: &[(&str, &str)]) -> Vec<LibraryArtist> {
    artists
        .iter()
        .map(|(id, name)| LibraryArtist::new(*id, *name))
        .collect()
}
