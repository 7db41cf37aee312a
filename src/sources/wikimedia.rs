//! Wikimedia Commons MediaWiki API client.
//!
//! Uses a generator search over the File namespace with imageinfo and
//! extended metadata, then filters on the extracted license short name.
//! The general open-media catalog: broadest coverage, weakest curation,
//! lowest reliability tier.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::models::{is_open_license, join_nonempty, Candidate, SourceId};
use super::{RateLimiter, SourceAdapter};

const API_BASE: &str = "https://commons.wikimedia.org/w/api.php";

lazy_static! {
    // extmetadata values embed HTML markup
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

pub struct WikimediaAdapter {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
    max_results: usize,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ApiResponse {
    query: QueryBlock,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct QueryBlock {
    pages: HashMap<String, Page>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Page {
    title: String,
    /// Position in the generator's result order.
    index: Option<i64>,
    #[serde(rename = "imageinfo")]
    image_info: Vec<ImageInfo>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ImageInfo {
    url: String,
    #[serde(rename = "descriptionurl")]
    description_url: String,
    #[serde(rename = "extmetadata")]
    ext_metadata: ExtMetadata,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ExtMetadata {
    #[serde(rename = "LicenseShortName")]
    license_short_name: Option<MetaValue>,
    #[serde(rename = "ImageDescription")]
    image_description: Option<MetaValue>,
    #[serde(rename = "Artist")]
    artist: Option<MetaValue>,
    #[serde(rename = "Categories")]
    categories: Option<MetaValue>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct MetaValue {
    value: serde_json::Value,
}

fn meta_text(value: &Option<MetaValue>) -> String {
    let raw = value
        .as_ref()
        .and_then(|v| v.value.as_str())
        .unwrap_or_default();
    HTML_TAG.replace_all(raw, " ").trim().to_string()
}

/// "File:Discus thrower (bronze).jpg" -> "Discus thrower (bronze)"
fn file_title(page_title: &str) -> String {
    let stripped = page_title.strip_prefix("File:").unwrap_or(page_title);
    match stripped.rsplit_once('.') {
        Some((name, ext)) if ext.len() <= 4 => name.to_string(),
        _ => stripped.to_string(),
    }
}

impl WikimediaAdapter {
    pub fn new(client: reqwest::Client, limiter: Arc<RateLimiter>, max_results: usize) -> Self {
        Self {
            client,
            limiter,
            max_results,
        }
    }

    async fn try_search(&self, query: &str) -> Result<Vec<Candidate>> {
        let url = format!(
            "{}?action=query&format=json&generator=search&gsrnamespace=6&gsrsearch={}&gsrlimit={}&prop=imageinfo&iiprop=url%7Cextmetadata",
            API_BASE,
            urlencoding::encode(query),
            self.max_results
        );
        let response = self.limiter.get(&self.client, &url).await?;
        if !response.status().is_success() {
            anyhow::bail!("Commons search failed with status {}", response.status());
        }

        let body: ApiResponse = response
            .json()
            .await
            .context("Failed to parse Commons search response")?;
        Ok(candidates_from_response(body, self.max_results))
    }
}

fn candidates_from_response(body: ApiResponse, cap: usize) -> Vec<Candidate> {
    // The pages map is keyed by page id; generator order lives in `index`.
    let mut pages: Vec<Page> = body.query.pages.into_values().collect();
    pages.sort_by_key(|p| p.index.unwrap_or(i64::MAX));

    pages
        .into_iter()
        .filter_map(page_to_candidate)
        .take(cap)
        .collect()
}

fn page_to_candidate(mut page: Page) -> Option<Candidate> {
    if page.image_info.is_empty() {
        return None;
    }
    let info = page.image_info.remove(0);
    if info.url.is_empty() {
        return None;
    }

    let license = meta_text(&info.ext_metadata.license_short_name);
    if !is_open_license(&license) {
        return None;
    }

    let description = meta_text(&info.ext_metadata.image_description);
    let categories = meta_text(&info.ext_metadata.categories);
    let creator = meta_text(&info.ext_metadata.artist);

    Some(Candidate {
        source: SourceId::WikimediaCommons,
        url: info.url,
        page_url: info.description_url,
        title: file_title(&page.title),
        institution: String::new(),
        creator,
        license,
        metadata: join_nonempty(&[&description, &categories]),
        score: 0,
    })
}

#[async_trait]
impl SourceAdapter for WikimediaAdapter {
    fn id(&self) -> SourceId {
        SourceId::WikimediaCommons
    }

    async fn search(&self, query: &str) -> Vec<Candidate> {
        match self.try_search(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Commons search failed for {:?}: {:#}", query, e);
                Vec::new()
            }
        }
    }
}
