//! Fans query variants out to the source adapters and merges the results.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::sources::{Candidate, SourceAdapter};

/// Build the raw candidate pool for one entity.
///
/// Variants are processed one at a time; within a variant every enabled
/// adapter runs concurrently. The fan-out is bounded by the adapter count,
/// never by the variant count. Pool order is deterministic: variant order,
/// then adapter registration order, then per-adapter result order, with
/// later duplicates of an already-seen URL dropped.
pub async fn gather_candidates(
    adapters: &[Arc<dyn SourceAdapter>],
    queries: &[String],
) -> Vec<Candidate> {
    let enabled: Vec<&Arc<dyn SourceAdapter>> =
        adapters.iter().filter(|a| a.enabled()).collect();

    let mut pool = Vec::new();
    let mut seen_urls = HashSet::new();

    for query in queries {
        let searches = enabled.iter().map(|adapter| adapter.search(query));
        for candidates in join_all(searches).await {
            for candidate in candidates {
                if seen_urls.insert(candidate.url.clone()) {
                    pool.push(candidate);
                }
            }
        }
        debug!("Pool at {} candidates after query {:?}", pool.len(), query);
    }

    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceId;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeAdapter {
        id: SourceId,
        enabled: bool,
        per_query: Vec<Candidate>,
        calls: AtomicUsize,
    }

    impl FakeAdapter {
        fn new(id: SourceId, enabled: bool, per_query: Vec<Candidate>) -> Self {
            Self {
                id,
                enabled,
                per_query,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SourceAdapter for FakeAdapter {
        fn id(&self) -> SourceId {
            self.id
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn search(&self, _query: &str) -> Vec<Candidate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.per_query.clone()
        }
    }

    fn candidate(source: SourceId, url: &str) -> Candidate {
        Candidate {
            source,
            url: url.to_string(),
            page_url: String::new(),
            title: String::new(),
            institution: String::new(),
            creator: String::new(),
            license: "CC0".to_string(),
            metadata: String::new(),
            score: 0,
        }
    }

    #[tokio::test]
    async fn test_merges_across_adapters_and_variants() {
        let met = Arc::new(FakeAdapter::new(
            SourceId::MetMuseum,
            true,
            vec![candidate(SourceId::MetMuseum, "https://images.metmuseum.org/a.jpg")],
        ));
        let commons = Arc::new(FakeAdapter::new(
            SourceId::WikimediaCommons,
            true,
            vec![candidate(SourceId::WikimediaCommons, "https://upload.wikimedia.org/b.jpg")],
        ));
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![met.clone(), commons.clone()];
        let queries = vec!["bronze discus".to_string(), "discus artifact".to_string()];

        let pool = gather_candidates(&adapters, &queries).await;

        // Duplicate URLs from the second variant are dropped
        assert_eq!(pool.len(), 2);
        assert_eq!(met.calls.load(Ordering::SeqCst), 2);
        assert_eq!(commons.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_adapter_order_is_preserved_within_a_variant() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(FakeAdapter::new(
                SourceId::MetMuseum,
                true,
                vec![candidate(SourceId::MetMuseum, "https://images.metmuseum.org/a.jpg")],
            )),
            Arc::new(FakeAdapter::new(
                SourceId::WikimediaCommons,
                true,
                vec![candidate(SourceId::WikimediaCommons, "https://upload.wikimedia.org/b.jpg")],
            )),
        ];
        let queries = vec!["query".to_string()];

        let pool = gather_candidates(&adapters, &queries).await;
        assert_eq!(pool[0].source, SourceId::MetMuseum);
        assert_eq!(pool[1].source, SourceId::WikimediaCommons);
    }

    #[tokio::test]
    async fn test_disabled_adapters_are_never_called() {
        let gated = Arc::new(FakeAdapter::new(
            SourceId::Smithsonian,
            false,
            vec![candidate(SourceId::Smithsonian, "https://ids.si.edu/a.jpg")],
        ));
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![gated.clone()];
        let queries = vec!["query".to_string()];

        let pool = gather_candidates(&adapters, &queries).await;
        assert!(pool.is_empty());
        assert_eq!(gated.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_queries_yield_empty_pool() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(FakeAdapter::new(
            SourceId::MetMuseum,
            true,
            vec![],
        ))];
        let pool = gather_candidates(&adapters, &[]).await;
        assert!(pool.is_empty());
    }
}
