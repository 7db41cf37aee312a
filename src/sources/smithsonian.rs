//! Smithsonian Open Access API client.
//!
//! Gated on `SMITHSONIAN_API_KEY`; without it the adapter is disabled and
//! returns an empty result without making a call.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::models::{is_open_license, join_nonempty, Candidate, SourceId};
use super::{RateLimiter, SourceAdapter};

const API_BASE: &str = "https://api.si.edu/openaccess/api/v1.0/search";

pub struct SmithsonianAdapter {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
    max_results: usize,
    api_key: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ApiResponse {
    response: SearchRows,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SearchRows {
    rows: Vec<Row>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Row {
    title: String,
    content: Content,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Content {
    #[serde(rename = "descriptiveNonRepeating")]
    descriptive: Descriptive,
    #[serde(rename = "indexedStructured")]
    indexed: Indexed,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Descriptive {
    record_link: String,
    data_source: String,
    online_media: OnlineMedia,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct OnlineMedia {
    media: Vec<Media>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Media {
    content: String,
    #[serde(rename = "type")]
    media_type: String,
    usage: Usage,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Usage {
    access: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Indexed {
    topic: Vec<String>,
    date: Vec<String>,
    object_type: Vec<String>,
    culture: Vec<String>,
    name: Vec<String>,
}

impl SmithsonianAdapter {
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
            "{}?api_key={}&q={}&rows={}",
            API_BASE,
            api_key,
            urlencoding::encode(query),
            self.max_results
        );
        let response = self.limiter.get(&self.client, &url).await?;
        if !response.status().is_success() {
            anyhow::bail!("Smithsonian search failed with status {}", response.status());
        }

        let body: ApiResponse = response
            .json()
            .await
            .context("Failed to parse Smithsonian search response")?;
        Ok(candidates_from_response(body, self.max_results))
    }
}

fn candidates_from_response(body: ApiResponse, cap: usize) -> Vec<Candidate> {
    body.response
        .rows
        .into_iter()
        .filter_map(row_to_candidate)
        .take(cap)
        .collect()
}

fn row_to_candidate(row: Row) -> Option<Candidate> {
    let media = row
        .content
        .descriptive
        .online_media
        .media
        .into_iter()
        .find(|m| {
            m.media_type == "Images" && !m.content.is_empty() && is_open_license(&m.usage.access)
        })?;

    let indexed = row.content.indexed;
    let metadata = join_nonempty(&[
        &indexed.date.join(" "),
        &indexed.topic.join(" "),
        &indexed.object_type.join(" "),
        &indexed.culture.join(" "),
    ]);
    let creator = indexed.name.first().cloned().unwrap_or_default();
    let institution = if row.content.descriptive.data_source.is_empty() {
        SourceId::Smithsonian.display_name().to_string()
    } else {
        row.content.descriptive.data_source
    };

    Some(Candidate {
        source: SourceId::Smithsonian,
        url: media.content,
        page_url: row.content.descriptive.record_link,
        title: row.title,
        institution,
        creator,
        license: media.usage.access,
        metadata,
        score: 0,
    })
}

#[async_trait]
impl SourceAdapter for SmithsonianAdapter {
    fn id(&self) -> SourceId {
        SourceId::Smithsonian
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
                warn!("Smithsonian search failed for {:?}: {:#}", query, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "response": {
            "rows": [
                {
                    "title": "Abacus, Chinese",
                    "content": {
                        "descriptiveNonRepeating": {
                            "record_link": "https://www.si.edu/object/nmah_1",
                            "data_source": "National Museum of American History",
                            "online_media": {
                                "media": [
                                    {
                                        "content": "https://ids.si.edu/ids/deliveryService?id=NMAH-1",
                                        "type": "Images",
                                        "usage": {"access": "CC0"}
                                    }
                                ]
                            }
                        },
                        "indexedStructured": {
                            "topic": ["Mathematics", "Arithmetic Teaching"],
                            "date": ["1800s"],
                            "object_type": ["abacus"],
                            "culture": ["Chinese"],
                            "name": ["Unknown"]
                        }
                    }
                },
                {
                    "title": "Restricted object",
                    "content": {
                        "descriptiveNonRepeating": {
                            "record_link": "https://www.si.edu/object/nmah_2",
                            "data_source": "NMAH",
                            "online_media": {
                                "media": [
                                    {
                                        "content": "https://ids.si.edu/ids/deliveryService?id=NMAH-2",
                                        "type": "Images",
                                        "usage": {"access": "Usage conditions apply"}
                                    }
                                ]
                            }
                        }
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn test_cc0_image_rows_become_candidates() {
        let body: ApiResponse = serde_json::from_str(SAMPLE).unwrap();
        let candidates = candidates_from_response(body, 10);

        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.source, SourceId::Smithsonian);
        assert_eq!(candidate.title, "Abacus, Chinese");
        assert_eq!(candidate.institution, "National Museum of American History");
        assert_eq!(candidate.license, "CC0");
        assert!(candidate.metadata.contains("Mathematics"));
        assert!(candidate.metadata.contains("Chinese"));
    }

    #[tokio::test]
    async fn test_disabled_without_key() {
        let limiter = Arc::new(RateLimiter::new(
            std::time::Duration::from_millis(1),
            std::time::Duration::from_millis(1),
        ));
        let adapter =
            SmithsonianAdapter::new(reqwest::Client::new(), limiter, 10, None);

        assert!(!adapter.enabled());
        // No credential: empty result, no network call to fail on.
        assert!(adapter.search("abacus").await.is_empty());
    }
}
