//! MusicBrainz API client
//!
//! Backs id resolution (artist search), artist metadata and discography
//! (release-group browse). Calls are not paced here: MusicBrainz allows about
//! one request per second per client, which the shared
//! [`FifoRateLimiter`](crate::services::FifoRateLimiter) enforces for every
//! caller in the process.

use crate::error::{ExploreError, Result};
use crate::models::{ExternalAlbum, ExternalArtist, ServiceEndpoints};
use crate::types::{ArtistCatalog, ArtistIdResolver};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Search hits below this score are not trusted as an identification
const MIN_SEARCH_SCORE: u32 = 90;

/// Release groups requested per browse call; the newest are kept
const BROWSE_PAGE_SIZE: usize = 100;

/// MusicBrainz search response (`/artist?query=`)
#[derive(Debug, Deserialize)]
struct MBArtistSearch {
    #[serde(default)]
    artists: Vec<MBSearchHit>,
}

#[derive(Debug, Deserialize)]
struct MBSearchHit {
    id: String,
    name: String,
    #[serde(default)]
    score: u32,
}

/// MusicBrainz artist lookup response (`/artist/{mbid}`)
#[derive(Debug, Deserialize)]
struct MBArtist {
    id: String,
    name: String,
    #[serde(rename = "sort-name")]
    sort_name: Option<String>,
    disambiguation: Option<String>,
    #[serde(rename = "type")]
    artist_type: Option<String>,
    country: Option<String>,
    #[serde(rename = "life-span")]
    life_span: Option<MBLifeSpan>,
    #[serde(default)]
    tags: Vec<MBTag>,
}

#[derive(Debug, Deserialize)]
struct MBLifeSpan {
    begin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MBTag {
    name: String,
    #[serde(default)]
    count: i64,
}

/// MusicBrainz release-group browse response
#[derive(Debug, Deserialize)]
struct MBReleaseGroupBrowse {
    #[serde(rename = "release-groups", default)]
    release_groups: Vec<MBReleaseGroup>,
}

#[derive(Debug, Deserialize)]
struct MBReleaseGroup {
    id: String,
    title: String,
    #[serde(rename = "first-release-date")]
    first_release_date: Option<String>,
    #[serde(rename = "primary-type")]
    primary_type: Option<String>,
}

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MusicBrainzClient {
    pub fn new(endpoints: &ServiceEndpoints) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(endpoints.user_agent.as_str())
            .timeout(Duration::from_secs(endpoints.http_timeout_secs))
            .build()
            .map_err(|e| ExploreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: endpoints.musicbrainz_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `path` with `query`; `Ok(None)` on 404.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(url = %url, "Querying MusicBrainz API");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .query(&[("fmt", "json")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExploreError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| ExploreError::Parse(e.to_string()))?;
        Ok(Some(body))
    }
}

/// Best identification among search hits: exact name match first, then a
/// confident top hit.
fn pick_search_hit(hits: Vec<MBSearchHit>, name: &str) -> Option<String> {
    let wanted = name.trim();
    if let Some(hit) = hits.iter().find(|h| h.name.trim().eq_ignore_ascii_case(wanted)) {
        return Some(hit.id.clone());
    }
    hits.into_iter()
        .find(|h| h.score >= MIN_SEARCH_SCORE)
        .map(|h| h.id)
}

/// Quote a value for a Lucene query.
fn lucene_phrase(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Map a lookup response, keeping the five most-voted tags.
fn artist_from_dto(dto: MBArtist) -> ExternalArtist {
    let mut tags = dto.tags;
    tags.sort_by(|a, b| b.count.cmp(&a.count));

    ExternalArtist {
        id: dto.id,
        name: dto.name,
        sort_name: dto.sort_name,
        disambiguation: dto.disambiguation.filter(|d| !d.is_empty()),
        artist_type: dto.artist_type,
        country: dto.country,
        begin_date: dto.life_span.and_then(|span| span.begin),
        tags: tags.into_iter().take(5).map(|t| t.name).collect(),
    }
}

/// Newest-first albums, truncated to `limit`.
fn albums_from_browse(
    browse: MBReleaseGroupBrowse,
    artist_name: &str,
    limit: usize,
) -> Vec<ExternalAlbum> {
    let mut albums: Vec<ExternalAlbum> = browse
        .release_groups
        .into_iter()
        .map(|rg| ExternalAlbum {
            id: rg.id,
            title: rg.title,
            artist: artist_name.to_string(),
            release_date: rg.first_release_date.filter(|d| !d.is_empty()),
            primary_type: rg.primary_type,
        })
        .collect();

    // Undated release groups sort last
    albums.sort_by(|a, b| b.release_date.cmp(&a.release_date));
    albums.truncate(limit);
    albums
}

#[async_trait]
impl ArtistIdResolver for MusicBrainzClient {
    async fn resolve_canonical_id(
        &self,
        _known_id: Option<&str>,
        name: &str,
    ) -> Result<Option<String>> {
        let query = format!("artist:{}", lucene_phrase(name));
        let search: Option<MBArtistSearch> = self
            .get_json("artist", &[("query", query), ("limit", "5".to_string())])
            .await?;

        let mbid = search.and_then(|s| pick_search_hit(s.artists, name));
        tracing::debug!(artist = %name, mbid = ?mbid, "MusicBrainz artist search");
        Ok(mbid)
    }
}

#[async_trait]
impl ArtistCatalog for MusicBrainzClient {
    async fn get_artist_by_id(&self, mbid: &str) -> Result<Option<ExternalArtist>> {
        let artist: Option<MBArtist> = self
            .get_json(&format!("artist/{}", mbid), &[("inc", "tags".to_string())])
            .await?;
        Ok(artist.map(artist_from_dto))
    }

    async fn get_artist_albums(
        &self,
        mbid: &str,
        name: &str,
        limit: usize,
    ) -> Result<Vec<ExternalAlbum>> {
        let browse: Option<MBReleaseGroupBrowse> = self
            .get_json(
                "release-group",
                &[
                    ("artist", mbid.to_string()),
                    ("type", "album".to_string()),
                    ("limit", BROWSE_PAGE_SIZE.to_string()),
                ],
            )
            .await?;

        Ok(browse
            .map(|b| albums_from_browse(b, name, limit))
            .unwrap_or_default())
    }
}
