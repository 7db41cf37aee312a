//! Source adapters for the external open-access catalogs.
//!
//! Each adapter owns one catalog's request shape, response parsing and
//! license extraction, and normalizes results into [`Candidate`]s. Adapters
//! never propagate errors out of `search`: a dead catalog degrades to an
//! empty result so one outage cannot abort the run.

mod art_institute;
mod cleveland;
mod met_museum;
mod models;
mod rate_limiter;
mod rijksmuseum;
mod smithsonian;
mod wikimedia;

pub use art_institute::ArtInstituteAdapter;
pub use cleveland::ClevelandAdapter;
pub use met_museum::MetMuseumAdapter;
pub use models::{is_open_license, Candidate, SourceId};
pub use rate_limiter::RateLimiter;
pub use rijksmuseum::RijksmuseumAdapter;
pub use smithsonian::SmithsonianAdapter;
pub use wikimedia::WikimediaAdapter;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::PolicySettings;

/// Environment variable holding the Smithsonian Open Access API key.
pub const SMITHSONIAN_API_KEY_VAR: &str = "SMITHSONIAN_API_KEY";
/// Environment variable holding the Rijksmuseum API key.
pub const RIJKSMUSEUM_API_KEY_VAR: &str = "RIJKSMUSEUM_API_KEY";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Integration with one external open-access catalog.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn id(&self) -> SourceId;

    /// Credential-gated adapters report false when their key is absent;
    /// they are skipped without a network call.
    fn enabled(&self) -> bool {
        true
    }

    /// Search the catalog. Transport and parse failures are handled
    /// internally and yield an empty result.
    async fn search(&self, query: &str) -> Vec<Candidate>;
}

/// Build the full adapter set, reading access credentials from the
/// environment. Adapters missing their credential stay registered but
/// disabled.
pub fn default_adapters(
    limiter: Arc<RateLimiter>,
    policy: &PolicySettings,
) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;
    let max_results = policy.max_results_per_source;

    let smithsonian_key = std::env::var(SMITHSONIAN_API_KEY_VAR).ok();
    let rijksmuseum_key = std::env::var(RIJKSMUSEUM_API_KEY_VAR).ok();

    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(MetMuseumAdapter::new(
            client.clone(),
            limiter.clone(),
            max_results,
        )),
        Arc::new(ClevelandAdapter::new(
            client.clone(),
            limiter.clone(),
            max_results,
        )),
        Arc::new(SmithsonianAdapter::new(
            client.clone(),
            limiter.clone(),
            max_results,
            smithsonian_key,
        )),
        Arc::new(ArtInstituteAdapter::new(
            client.clone(),
            limiter.clone(),
            max_results,
        )),
        Arc::new(RijksmuseumAdapter::new(
            client.clone(),
            limiter.clone(),
            max_results,
            rijksmuseum_key,
        )),
        Arc::new(WikimediaAdapter::new(client, limiter, max_results)),
    ];

    for adapter in &adapters {
        if adapter.enabled() {
            info!("Source enabled: {}", adapter.id());
        } else {
            info!("Source disabled (no credential): {}", adapter.id());
        }
    }

    Ok(adapters)
}
