//! Rijksmuseum collection API client.
//!
//! Gated on `RIJKSMUSEUM_API_KEY`. The collection endpoint only returns
//! open-data records; `imgonly` restricts results to records with a web
//! image.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::models::{join_nonempty, Candidate, SourceId};
use super::{RateLimiter, SourceAdapter};

const API_BASE: &str = "https://www.rijksmuseum.nl/api/en/collection";

pub struct RijksmuseumAdapter {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
    max_results: usize,
    api_key: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SearchResponse {
    #[serde(rename = "artObjects")]
    art_objects: Vec<ArtObject>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ArtObject {
    title: String,
    #[serde(rename = "longTitle")]
    long_title: String,
    #[serde(rename = "principalOrFirstMaker")]
    principal_or_first_maker: String,
    #[serde(rename = "webImage")]
    web_image: Option<WebImage>,
    #[serde(rename = "productionPlaces")]
    production_places: Vec<String>,
    links: Links,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WebImage {
    url: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Links {
    web: String,
}

impl RijksmuseumAdapter {
    pub fn new(
        client: reqwest::Client,
        limiter: Arc<RateLimiter>,
        max_results: usize,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            limiter,
            max_results,
            api_key,
        }
    }

    async fn try_search(&self, query: &str, api_key: &str) -> Result<Vec<Candidate>> {
        let url = format!(
            "{}?key={}&q={}&imgonly=True&ps={}",
            API_BASE,
            api_key,
            urlencoding::encode(query),
            self.max_results
        );
        let response = self.limiter.get(&self.client, &url).await?;
        if !response.status().is_success() {
            anyhow::bail!(
                "Rijksmuseum search failed with status {}",
                response.status()
            );
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Rijksmuseum search response")?;
        Ok(candidates_from_response(body, self.max_results))
    }
}

fn candidates_from_response(body: SearchResponse, cap: usize) -> Vec<Candidate> {
    body.art_objects
        .into_iter()
        .filter_map(object_to_candidate)
        .take(cap)
        .collect()
}

fn object_to_candidate(object: ArtObject) -> Option<Candidate> {
    let image_url = object.web_image.map(|w| w.url).filter(|u| !u.is_empty())?;

    let places = object.production_places.join(" ");
    let metadata = join_nonempty(&[&object.long_title, &places]);

    Some(Candidate {
        source: SourceId::Rijksmuseum,
        url: image_url,
        page_url: object.links.web,
        title: object.title,
        institution: SourceId::Rijksmuseum.display_name().to_string(),
        creator: object.principal_or_first_maker,
        license: "Public domain".to_string(),
        metadata,
        score: 0,
    })
}

#[async_trait]
impl SourceAdapter for RijksmuseumAdapter {
    fn id(&self) -> SourceId {
        SourceId::Rijksmuseum
    }

    fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str) -> Vec<Candidate> {
        let Some(api_key) = self.api_key.clone() else {
            return Vec::new();
        };
        match self.try_search(query, &api_key).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Rijksmuseum search failed for {:?}: {:#}", query, e);
                Vec::new()
            }
        }
    }
}
