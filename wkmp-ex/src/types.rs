//! Collaborator trait definitions for wkmp-ex
//!
//! The explore core never talks HTTP itself. Each external service is reached
//! through one of these traits, so the host can plug in real clients
//! ([`crate::services::MusicBrainzClient`], [`crate::services::ListenBrainzClient`])
//! or test doubles.
//!
//! These are the only places where an explore run suspends (besides limiter
//! sleeps).

use crate::error::Result;
use crate::models::{ExternalAlbum, ExternalArtist, LibraryArtist, SimilarArtistRef};
use async_trait::async_trait;

// ============================================================================
// Inputs from the host application
// ============================================================================

/// Library server adapter: session state and the user's artists
#[async_trait]
pub trait LibraryProvider: Send + Sync {
    /// True while the user is signed in to their library server
    fn is_authenticated(&self) -> bool;

    /// All artists in the user's library
    async fn list_library_artists(&self) -> Result<Vec<LibraryArtist>>;
}

// ============================================================================
// External services
// ============================================================================

/// Resolves an artist to its canonical MBID
#[async_trait]
pub trait ArtistIdResolver: Send + Sync {
    /// `known_id` is the library-local id, when there is one.
    ///
    /// `Ok(None)` means the artist could not be identified.
    async fn resolve_canonical_id(&self, known_id: Option<&str>, name: &str)
        -> Result<Option<String>>;
}

/// Similar-artists recommendation service
#[async_trait]
pub trait SimilarArtistsService: Send + Sync {
    async fn get_similar_artists(&self, mbid: &str, limit: usize)
        -> Result<Vec<SimilarArtistRef>>;
}

/// Artist metadata and discography service
#[async_trait]
pub trait ArtistCatalog: Send + Sync {
    /// `Ok(None)` when the service has no artist with this MBID
    async fn get_artist_by_id(&self, mbid: &str) -> Result<Option<ExternalArtist>>;

    /// Albums credited to the artist, at most `limit`
    async fn get_artist_albums(
        &self,
        mbid: &str,
        name: &str,
        limit: usize,
    ) -> Result<Vec<ExternalAlbum>>;
}
