//! Explore services

pub mod explore_store;
pub mod listenbrainz_client;
pub mod musicbrainz_client;
pub mod rate_limiter;
pub mod similar_artists_explorer;
pub mod snapshot_builder;
pub mod sync_orchestrator;

pub use explore_store::ExploreStore;
pub use listenbrainz_client::ListenBrainzClient;
pub use musicbrainz_client::MusicBrainzClient;
pub use rate_limiter::{FifoRateLimiter, SpacedRateLimiter};
pub use similar_artists_explorer::{
    ExploreOutcome, ExplorerLimiters, ExplorerServices, SimilarArtistsExplorer,
};
pub use snapshot_builder::{newest_albums, sample_albums, sample_artists, SnapshotCache};
pub use sync_orchestrator::{SyncOrchestrator, SyncReport, SyncResult};
