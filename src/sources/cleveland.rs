//! Cleveland Museum of Art Open Access API client.
//!
//! The search endpoint filters server-side to CC0 records with images;
//! the license field is still checked per record before a candidate is
//! emitted.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::models::{is_open_license, join_nonempty, Candidate, SourceId};
use super::{RateLimiter, SourceAdapter};

const API_BASE: &str = "https://openaccess-api.clevelandart.org/api/artworks/";

pub struct ClevelandAdapter {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
    max_results: usize,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SearchResponse {
    data: Vec<Artwork>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Artwork {
    title: String,
    creation_date: String,
    culture: Vec<String>,
    technique: String,
    department: String,
    #[serde(rename = "type")]
    artwork_type: String,
    tombstone: String,
    url: String,
    share_license_status: String,
    images: Option<Images>,
    creators: Vec<Creator>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Images {
    web: Option<ImageRef>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ImageRef {
    url: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Creator {
    description: String,
}

impl ClevelandAdapter {
    pub fn new(client: reqwest::Client, limiter: Arc<RateLimiter>, max_results: usize) -> Self {
        Self {
            client,
            limiter,
            max_results,
        }
    }

    async fn try_search(&self, query: &str) -> Result<Vec<Candidate>> {
        let url = format!(
            "{}?q={}&has_image=1&cc0=1&limit={}",
            API_BASE,
            urlencoding::encode(query),
            self.max_results
        );
        let response = self.limiter.get(&self.client, &url).await?;
        if !response.status().is_success() {
            anyhow::bail!("Cleveland search failed with status {}", response.status());
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Cleveland search response")?;
        Ok(candidates_from_response(body, self.max_results))
    }
}

fn candidates_from_response(body: SearchResponse, cap: usize) -> Vec<Candidate> {
    body.data
        .into_iter()
        .filter_map(artwork_to_candidate)
        .take(cap)
        .collect()
}

fn artwork_to_candidate(artwork: Artwork) -> Option<Candidate> {
    if !is_open_license(&artwork.share_license_status) {
        return None;
    }
    let image_url = artwork.images.and_then(|i| i.web).map(|w| w.url)?;
    if image_url.is_empty() {
        return None;
    }

    let culture = artwork.culture.join(" ");
    let metadata = join_nonempty(&[
        &artwork.creation_date,
        &culture,
        &artwork.technique,
        &artwork.artwork_type,
        &artwork.department,
        &artwork.tombstone,
    ]);
    let creator = artwork
        .creators
        .first()
        .map(|c| c.description.clone())
        .unwrap_or_default();

    Some(Candidate {
        source: SourceId::ClevelandMuseum,
        url: image_url,
        page_url: artwork.url,
        title: artwork.title,
        institution: SourceId::ClevelandMuseum.display_name().to_string(),
        creator,
        license: artwork.share_license_status,
        metadata,
        score: 0,
    })
}

#[async_trait]
impl SourceAdapter for ClevelandAdapter {
    fn id(&self) -> SourceId {
        SourceId::ClevelandMuseum
    }

    async fn search(&self, query: &str) -> Vec<Candidate> {
        match self.try_search(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Cleveland search failed for {:?}: {:#}", query, e);
                Vec::new()
            }
        }
    }
}
