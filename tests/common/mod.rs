//! Shared fixtures for pipeline integration tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use catalog_image_resolver::{Candidate, SourceAdapter, SourceId, TargetEntity};

/// An adapter that returns the same canned results for every query and
/// counts how often it was called.
pub struct ScriptedAdapter {
    id: SourceId,
    enabled: bool,
    results: Vec<Candidate>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedAdapter {
    pub fn new(id: SourceId, results: Vec<Candidate>) -> Self {
        Self {
            id,
            enabled: true,
            results,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

}

#[async_trait]
impl SourceAdapter for ScriptedAdapter {
    fn id(&self) -> SourceId {
        self.id
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn search(&self, _query: &str) -> Vec<Candidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.clone()
    }
}

pub fn entity(slug: &str, title: &str, era: &str, tags: &[&str]) -> TargetEntity {
    TargetEntity {
        slug: slug.to_string(),
        title: title.to_string(),
        era: era.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        image: None,
    }
}

pub fn candidate(
    source: SourceId,
    url: &str,
    title: &str,
    license: &str,
    metadata: &str,
) -> Candidate {
    Candidate {
        source,
        url: url.to_string(),
        page_url: format!("{}?page", url),
        title: title.to_string(),
        institution: String::new(),
        creator: String::new(),
        license: license.to_string(),
        metadata: metadata.to_string(),
        score: 0,
    }
}
