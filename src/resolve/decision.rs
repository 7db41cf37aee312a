//! Final classification of a scored candidate pool.

use serde::{Deserialize, Serialize};

use super::validation::{fine_art_hit, host_is_trusted, is_technology_entity, keyword_overlap_ok};
use crate::config::PolicySettings;
use crate::content_store::TargetEntity;
use crate::sources::Candidate;

/// The pipeline's graded outcome for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    /// Auto-approved top candidate.
    Success,
    /// A candidate exists but needs manual review before approval.
    Suspicious,
    /// No usable candidate.
    Failed,
    /// Speculative entity, never resolved; keeps its placeholder image.
    Placeholder,
}

impl DecisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Success => "success",
            DecisionStatus::Suspicious => "suspicious",
            DecisionStatus::Failed => "failed",
            DecisionStatus::Placeholder => "placeholder",
        }
    }
}

/// Per-entity decision: at most one winning candidate, and a reason
/// whenever the status is not Success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub status: DecisionStatus,
    pub winner: Option<Candidate>,
    pub reason: Option<String>,
}

impl Decision {
    pub fn success(winner: Candidate) -> Self {
        Self {
            status: DecisionStatus::Success,
            winner: Some(winner),
            reason: None,
        }
    }

    pub fn suspicious(winner: Candidate, reason: impl Into<String>) -> Self {
        Self {
            status: DecisionStatus::Suspicious,
            winner: Some(winner),
            reason: Some(reason.into()),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: DecisionStatus::Failed,
            winner: None,
            reason: Some(reason.into()),
        }
    }

    pub fn placeholder(reason: impl Into<String>) -> Self {
        Self {
            status: DecisionStatus::Placeholder,
            winner: None,
            reason: Some(reason.into()),
        }
    }
}

/// Pick and classify the top candidate from a validated, scored pool.
///
/// The pool is stable-sorted by score, so equal scores keep their
/// first-seen order and the outcome is deterministic for a fixed pool.
pub fn decide(entity: &TargetEntity, mut pool: Vec<Candidate>, policy: &PolicySettings) -> Decision {
    pool.sort_by_key(|c| std::cmp::Reverse(c.score));

    if pool.is_empty() {
        return Decision::failed("no valid candidate");
    }
    let top = pool.swap_remove(0);

    // The allow-list invariant is re-checked here independently of the
    // validator; a decision must never reference an untrusted host.
    if !host_is_trusted(&top.url) {
        return Decision::failed(format!("top candidate host not allow-listed: {}", top.url));
    }

    if top.score < policy.acceptance_threshold {
        let reason = format!(
            "score {} below acceptance threshold {}",
            top.score, policy.acceptance_threshold
        );
        return Decision::suspicious(top, reason);
    }

    // Final independent gate on the winner only
    let combined = top.combined_text();
    if is_technology_entity(entity) {
        if let Some(term) = fine_art_hit(&combined) {
            let reason = format!("final check: fine-art term {:?} in top candidate", term);
            return Decision::suspicious(top, reason);
        }
    }
    if !keyword_overlap_ok(entity, &combined, policy) {
        return Decision::suspicious(top, "final check: insufficient keyword overlap");
    }

    Decision::success(top)
}
