//! Met Museum Collection API client.
//!
//! Two-step search: a query returns object IDs, each object is then looked
//! up individually. Only public-domain objects with a primary image become
//! candidates.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::models::{join_nonempty, Candidate, SourceId};
use super::{RateLimiter, SourceAdapter};

const API_BASE: &str = "https://collectionapi.metmuseum.org/public/collection/v1";

pub struct MetMuseumAdapter {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "objectIDs")]
    object_ids: Option<Vec<u64>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ObjectResponse {
    #[serde(rename = "isPublicDomain")]
    is_public_domain: bool,
    #[serde(rename = "primaryImage")]
    primary_image: String,
    title: String,
    #[serde(rename = "artistDisplayName")]
    artist_display_name: String,
    #[serde(rename = "objectDate")]
    object_date: String,
    medium: String,
    culture: String,
    period: String,
    classification: String,
    department: String,
    repository: String,
    #[serde(rename = "objectURL")]
    object_url: String,
}

impl MetMuseumAdapter {
    pub fn new(client: reqwest::Client, limiter: Arc<RateLimiter>, max_results: usize) -> Self {
        Self {
            client,
            limiter,
            max_results,
        }
    }

    async fn try_search(&self, query: &str) -> Result<Vec<Candidate>> {
        let url = format!(
            "{}/search?hasImages=true&q={}",
            API_BASE,
            urlencoding::encode(query)
        );
        let response = self.limiter.get(&self.client, &url).await?;
        if !response.status().is_success() {
            anyhow::bail!("Met search failed with status {}", response.status());
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Met search response")?;
        let ids = body.object_ids.unwrap_or_default();

        let mut candidates = Vec::new();
        for id in ids.into_iter().take(self.max_results) {
            match self.fetch_object(id).await {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => {}
                Err(e) => warn!("Met object {} lookup failed: {:#}", id, e),
            }
        }
        Ok(candidates)
    }

    async fn fetch_object(&self, id: u64) -> Result<Option<Candidate>> {
        let url = format!("{}/objects/{}", API_BASE, id);
        let response = self.limiter.get(&self.client, &url).await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let object: ObjectResponse = response
            .json()
            .await
            .context("Failed to parse Met object response")?;
        Ok(object_to_candidate(object))
    }
}

fn object_to_candidate(object: ObjectResponse) -> Option<Candidate> {
    if !object.is_public_domain || object.primary_image.is_empty() {
        return None;
    }

    let metadata = join_nonempty(&[
        &object.object_date,
        &object.medium,
        &object.culture,
        &object.period,
        &object.classification,
        &object.department,
    ]);
    let institution = if object.repository.is_empty() {
        SourceId::MetMuseum.display_name().to_string()
    } else {
        object.repository
    };

    Some(Candidate {
        source: SourceId::MetMuseum,
        url: object.primary_image,
        page_url: object.object_url,
        title: object.title,
        institution,
        creator: object.artist_display_name,
        license: "Public domain (CC0)".to_string(),
        metadata,
        score: 0,
    })
}

#[async_trait]
impl SourceAdapter for MetMuseumAdapter {
    fn id(&self) -> SourceId {
        SourceId::MetMuseum
    }

    async fn search(&self, query: &str) -> Vec<Candidate> {
        match self.try_search(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Met Museum search failed for {:?}: {:#}", query, e);
                Vec::new()
            }
        }
    }
}
