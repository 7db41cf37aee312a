//! The candidate resolution pipeline: entity in, graded decision out.
//!
//! Resolution is pure apart from the adapter calls: planning, validation,
//! scoring and the decision policy are all deterministic functions, so the
//! whole pipeline is exercisable with fake adapters and no network.

mod aggregator;
mod decision;
mod era;
mod planner;
mod scoring;
mod validation;

pub use aggregator::gather_candidates;
pub use decision::{decide, Decision, DecisionStatus};
pub use era::{classify_era, EraClass};
pub use planner::plan_queries;
pub use scoring::{score_candidate, score_pool};
pub use validation::{host_is_trusted, validate, ValidationOutcome, TRUSTED_DOMAINS};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::PolicySettings;
use crate::content_store::TargetEntity;
use crate::overrides::OverrideMap;
use crate::sources::{Candidate, SourceAdapter};

/// Title words that carry matching signal: lowercased, longer than 3
/// characters, deduplicated in first-seen order.
pub fn significant_words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut words: Vec<String> = Vec::new();
    for word in lower.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() > 3 && !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

/// One filtered-out candidate, kept for the run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionRecord {
    pub url: String,
    pub reason: String,
}

/// Everything the outer loop needs to report about one entity's resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub decision: Decision,
    /// Raw pool size before validation.
    pub pool_size: usize,
    pub rejections: Vec<RejectionRecord>,
}

impl Resolution {
    fn without_pool(decision: Decision) -> Self {
        Self {
            decision,
            pool_size: 0,
            rejections: Vec::new(),
        }
    }
}

/// Drives one entity through override lookup, query planning, aggregation,
/// validation, scoring and the decision policy.
pub struct EntityResolver {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    overrides: OverrideMap,
    policy: PolicySettings,
}

impl EntityResolver {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        overrides: OverrideMap,
        policy: PolicySettings,
    ) -> Self {
        Self {
            adapters,
            overrides,
            policy,
        }
    }

    pub async fn resolve(&self, entity: &TargetEntity) -> Resolution {
        // Speculative entities never query any source
        if classify_era(&entity.era, &self.policy) == EraClass::Speculative {
            return Resolution::without_pool(Decision::placeholder(format!(
                "speculative era {:?}, placeholder retained",
                entity.era
            )));
        }

        // A manual override bypasses planning, validation and scoring,
        // but may not point at an untrusted host.
        if let Some(url) = self.overrides.get(&entity.slug) {
            let decision = if host_is_trusted(url) {
                Decision::success(Candidate::manual_override(url))
            } else {
                Decision::failed(format!("override URL host not allow-listed: {}", url))
            };
            return Resolution::without_pool(decision);
        }

        let queries = plan_queries(entity, &self.policy);
        let pool = gather_candidates(&self.adapters, &queries).await;
        let pool_size = pool.len();

        let mut valid = Vec::new();
        let mut rejections = Vec::new();
        for candidate in pool {
            let outcome = validate(entity, &candidate, &self.policy);
            if outcome.accepted {
                valid.push(candidate);
            } else {
                let reason = outcome.reason.unwrap_or_default();
                debug!("Rejected {}: {}", candidate.url, reason);
                rejections.push(RejectionRecord {
                    url: candidate.url,
                    reason,
                });
            }
        }

        score_pool(entity, &mut valid);
        let decision = decide(entity, valid, &self.policy);

        Resolution {
            decision,
            pool_size,
            rejections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significant_words_filters_and_dedups() {
        assert_eq!(
            significant_words("The Ancient Bronze Discus of the Bronze Age"),
            vec!["ancient", "bronze", "discus"]
        );
        assert_eq!(significant_words("An Ax"), Vec::<String>::new());
        assert_eq!(significant_words(""), Vec::<String>::new());
    }

    #[test]
    fn test_significant_words_split_on_punctuation() {
        assert_eq!(
            significant_words("Astrolabe, brass (Persian)"),
            vec!["astrolabe", "brass", "persian"]
        );
    }
}
