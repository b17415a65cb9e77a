//! ListenBrainz similar-artists client
//!
//! Queries the ListenBrainz labs similarity dataset. Pacing is handled by the
//! shared [`SpacedRateLimiter`](crate::services::SpacedRateLimiter).

use crate::error::{ExploreError, Result};
use crate::models::{ServiceEndpoints, SimilarArtistRef};
use crate::types::SimilarArtistsService;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// One row of the labs similar-artists response
#[derive(Debug, Deserialize)]
struct LBSimilarArtist {
    artist_mbid: Option<String>,
    name: Option<String>,
    score: Option<f64>,
}

/// ListenBrainz labs API client
pub struct ListenBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    algorithm: String,
}

impl ListenBrainzClient {
    pub fn new(endpoints: &ServiceEndpoints) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(endpoints.user_agent.as_str())
            .timeout(Duration::from_secs(endpoints.http_timeout_secs))
            .build()
            .map_err(|e| ExploreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: endpoints
                .listenbrainz_base_url
                .trim_end_matches('/')
                .to_string(),
            algorithm: endpoints.similar_artists_algorithm.clone(),
        })
    }
}

/// Highest-scoring rows first, without the reference artist, at most `limit`.
fn rank_similar(rows: Vec<LBSimilarArtist>, reference_mbid: &str, limit: usize) -> Vec<SimilarArtistRef> {
    let mut refs: Vec<SimilarArtistRef> = rows
        .into_iter()
        .filter_map(|row| {
            let mbid = row.artist_mbid.filter(|m| !m.is_empty() && m != reference_mbid)?;
            Some(SimilarArtistRef {
                artist_mbid: mbid,
                name: row.name,
                score: row.score,
            })
        })
        .collect();

    refs.sort_by(|a, b| {
        b.score
            .unwrap_or(0.0)
            .partial_cmp(&a.score.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    refs.truncate(limit);
    refs
}

#[async_trait]
impl SimilarArtistsService for ListenBrainzClient {
    async fn get_similar_artists(&self, mbid: &str, limit: usize) -> Result<Vec<SimilarArtistRef>> {
        let url = format!("{}/similar-artists/json", self.base_url);
        tracing::debug!(mbid = %mbid, url = %url, "Querying ListenBrainz similar artists");

        let response = self
            .http_client
            .get(&url)
            .query(&[("artist_mbids", mbid), ("algorithm", self.algorithm.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExploreError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let rows: Vec<LBSimilarArtist> = response
            .json()
            .await
            .map_err(|e| ExploreError::Parse(e.to_string()))?;

        Ok(rank_similar(rows, mbid, limit))
    }
}
