//! Art Institute of Chicago API client.
//!
//! Search results carry an `image_id` that resolves through the museum's
//! IIIF endpoint. Only public-domain records become candidates.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::models::{join_nonempty, Candidate, SourceId};
use super::{RateLimiter, SourceAdapter};

const API_BASE: &str = "https://api.artic.edu/api/v1/artworks/search";
const IIIF_BASE: &str = "https://www.artic.edu/iiif/2";

const SEARCH_FIELDS: &str =
    "id,title,image_id,artist_display,date_display,medium_display,is_public_domain,classification_titles,department_title";

pub struct ArtInstituteAdapter {
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
    id: u64,
    title: String,
    image_id: Option<String>,
    artist_display: String,
    date_display: String,
    medium_display: String,
    is_public_domain: bool,
    classification_titles: Vec<String>,
    department_title: String,
}

impl ArtInstituteAdapter {
    pub fn new(client: reqwest::Client, limiter: Arc<RateLimiter>, max_results: usize) -> Self {
        Self {
            client,
            limiter,
            max_results,
        }
    }

    async fn try_search(&self, query: &str) -> Result<Vec<Candidate>> {
        let url = format!(
            "{}?q={}&limit={}&fields={}",
            API_BASE,
            urlencoding::encode(query),
            self.max_results,
            SEARCH_FIELDS
        );
        let response = self.limiter.get(&self.client, &url).await?;
        if !response.status().is_success() {
            anyhow::bail!(
                "Art Institute search failed with status {}",
                response.status()
            );
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Art Institute search response")?;
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
    if !artwork.is_public_domain {
        return None;
    }
    let image_id = artwork.image_id.filter(|id| !id.is_empty())?;

    let classifications = artwork.classification_titles.join(" ");
    let metadata = join_nonempty(&[
        &artwork.date_display,
        &artwork.medium_display,
        &classifications,
        &artwork.department_title,
    ]);

    Some(Candidate {
        source: SourceId::ArtInstituteChicago,
        url: format!("{}/{}/full/843,/0/default.jpg", IIIF_BASE, image_id),
        page_url: format!("https://www.artic.edu/artworks/{}", artwork.id),
        title: artwork.title,
        institution: SourceId::ArtInstituteChicago.display_name().to_string(),
        creator: artwork.artist_display,
        license: "Public domain (CC0)".to_string(),
        metadata,
        score: 0,
    })
}

#[async_trait]
impl SourceAdapter for ArtInstituteAdapter {
    fn id(&self) -> SourceId {
        SourceId::ArtInstituteChicago
    }

    async fn search(&self, query: &str) -> Vec<Candidate> {
        match self.try_search(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Art Institute search failed for {:?}: {:#}", query, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "data": [
            {
                "id": 9503,
                "title": "Fragment of a Discus Thrower",
                "image_id": "7bb83c3f-1111-2222-3333-444455556666",
                "artist_display": "Ancient Roman",
                "date_display": "2nd century AD",
                "medium_display": "Marble",
                "is_public_domain": true,
                "classification_titles": ["sculpture", "classical antiquity"],
                "department_title": "Arts of the Ancient Mediterranean"
            },
            {
                "id": 10101,
                "title": "Modern Work Under Copyright",
                "image_id": "ffff0000-1111-2222-3333-444455556666",
                "is_public_domain": false
            },
            {
                "id": 20202,
                "title": "Public Domain But No Image",
                "image_id": null,
                "is_public_domain": true
            }
        ]
    }"#;

    #[test]
    fn test_public_domain_records_with_images_survive() {
        let body: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let candidates = candidates_from_response(body, 10);

        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.source, SourceId::ArtInstituteChicago);
        assert_eq!(
            candidate.url,
            "https://www.artic.edu/iiif/2/7bb83c3f-1111-2222-3333-444455556666/full/843,/0/default.jpg"
        );
        assert_eq!(candidate.page_url, "https://www.artic.edu/artworks/9503");
        assert!(candidate.metadata.contains("classical antiquity"));
    }

    #[test]
    fn test_empty_image_id_is_dropped() {
        let artwork = Artwork {
            is_public_domain: true,
            image_id: Some(String::new()),
            ..Default::default()
        };
        assert!(artwork_to_candidate(artwork).is_none());
    }
}
