//! Artist and album models
//!
//! Library-side types (`LibraryArtist`, `SeedArtist`) use the library's local
//! ids. External types are keyed by the canonical MusicBrainz id (MBID).

use serde::{Deserialize, Serialize};

/// Artist as listed by the user's library server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryArtist {
    /// Library-local artist id
    pub id: String,
    /// Display name
    pub name: String,
}

impl LibraryArtist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Discovery starting point, constructed per sync call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeedArtist {
    /// Library-local id (absent for ad-hoc seeds)
    pub id: Option<String>,
    /// Display name, used for name-based MBID resolution
    pub name: String,
    /// Canonical id, if already known
    pub mbid: Option<String>,
}

impl SeedArtist {
    /// True for the "Various Artists" compilation pseudo-artist (any case)
    pub fn is_various_artists(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case("various artists")
    }
}

impl From<&LibraryArtist> for SeedArtist {
    fn from(artist: &LibraryArtist) -> Self {
        Self {
            id: Some(artist.id.clone()),
            name: artist.name.clone(),
            mbid: None,
        }
    }
}

/// Artist profile fetched from the metadata service
///
/// Identity is `id` (the MBID).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalArtist {
    /// Artist MBID
    pub id: String,
    /// Artist name
    pub name: String,
    /// Sort name (e.g. "Beatles, The")
    #[serde(default)]
    pub sort_name: Option<String>,
    /// Disambiguation comment
    #[serde(default)]
    pub disambiguation: Option<String>,
    /// Person, Group, Orchestra, ...
    #[serde(default)]
    pub artist_type: Option<String>,
    /// ISO 3166-1 country code
    #[serde(default)]
    pub country: Option<String>,
    /// Career start date (partial ISO date)
    #[serde(default)]
    pub begin_date: Option<String>,
    /// Most relevant genre/tag names
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ExternalArtist {
    /// Minimal profile with only identity and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sort_name: None,
            disambiguation: None,
            artist_type: None,
            country: None,
            begin_date: None,
            tags: Vec::new(),
        }
    }
}

/// Album fetched from the discography service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAlbum {
    /// Album (release group) id
    pub id: String,
    pub title: String,
    /// Credited artist name
    pub artist: String,
    /// First release date, ISO ordered ("2019", "2019-03", "2019-03-08")
    #[serde(default)]
    pub release_date: Option<String>,
    /// Album, EP, Single, ...
    #[serde(default)]
    pub primary_type: Option<String>,
}

impl ExternalAlbum {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        release_date: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            release_date: release_date.map(str::to_string),
            primary_type: None,
        }
    }
}

/// One row of a similar-artists response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarArtistRef {
    pub artist_mbid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl SimilarArtistRef {
    pub fn new(artist_mbid: impl Into<String>) -> Self {
        Self {
            artist_mbid: artist_mbid.into(),
            name: None,
            score: None,
        }
    }
}

/// One discovered unit of the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarArtistEntry {
    pub artist: ExternalArtist,
    /// Capped per artist at fetch time
    pub albums: Vec<ExternalAlbum>,
}
