//! Additive confidence scoring for validated candidates.

use super::significant_words;
use crate::content_store::TargetEntity;
use crate::sources::Candidate;

const TITLE_WORD_BONUS: i64 = 15;
const METADATA_WORD_BONUS: i64 = 8;
const PUBLIC_DOMAIN_BONUS: i64 = 15;
const CC_ATTRIBUTION_BONUS: i64 = 10;
const INSTITUTION_BONUS: i64 = 5;

/// Score one candidate against the entity. Deterministic and additive:
/// each extra matching title word strictly increases the score.
pub fn score_candidate(entity: &TargetEntity, candidate: &Candidate) -> i64 {
    let mut score = candidate.source.reliability_bonus();

    let entity_words = significant_words(&entity.title);
    let candidate_title_words = significant_words(&candidate.title);
    let metadata = candidate.metadata.to_lowercase();

    for word in &entity_words {
        if candidate_title_words.contains(word) {
            score += TITLE_WORD_BONUS;
        }
        if metadata.contains(word.as_str()) {
            score += METADATA_WORD_BONUS;
        }
    }

    score += license_bonus(&candidate.license);

    if !candidate.institution.trim().is_empty() {
        score += INSTITUTION_BONUS;
    }

    score
}

/// Score the whole pool in place, preserving order.
pub fn score_pool(entity: &TargetEntity, pool: &mut [Candidate]) {
    for candidate in pool.iter_mut() {
        candidate.score = score_candidate(entity, candidate);
    }
}

fn license_bonus(license: &str) -> i64 {
    let lower = license.to_lowercase();
    if lower.contains("public domain") || lower.contains("cc0") || lower.contains("pdm") {
        PUBLIC_DOMAIN_BONUS
    } else if lower.contains("cc by") || lower.contains("cc-by") || lower.contains("attribution") {
        CC_ATTRIBUTION_BONUS
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceId;

    fn entity() -> TargetEntity {
        TargetEntity {
            slug: "bronze-discus".to_string(),
            title: "Ancient Bronze Discus".to_string(),
            era: "450 BCE".to_string(),
            tags: vec![],
            image: None,
        }
    }

    fn candidate(source: SourceId, title: &str, license: &str, metadata: &str) -> Candidate {
        Candidate {
            source,
            url: "https://upload.wikimedia.org/x.jpg".to_string(),
            page_url: String::new(),
            title: title.to_string(),
            institution: String::new(),
            creator: String::new(),
            license: license.to_string(),
            metadata: metadata.to_string(),
            score: 0,
        }
    }

    #[test]
    fn test_worked_example_scores_over_threshold() {
        // 25 (source) + 3x15 (ancient/bronze/discus in title) + 8 (ancient in
        // metadata) + 15 (CC0) = 93
        let c = candidate(
            SourceId::WikimediaCommons,
            "Discus thrower ancient bronze",
            "CC0",
            "ancient greek museum",
        );
        let score = score_candidate(&entity(), &c);
        assert_eq!(score, 93);
        assert!(score >= 55);
    }

    #[test]
    fn test_title_overlap_is_strictly_monotonic() {
        let one = candidate(SourceId::WikimediaCommons, "Bronze statuette", "CC0", "");
        let two = candidate(SourceId::WikimediaCommons, "Bronze discus statuette", "CC0", "");
        assert!(
            score_candidate(&entity(), &two) > score_candidate(&entity(), &one),
            "one more matching title word must strictly increase the score"
        );
    }

    #[test]
    fn test_source_tier_bonuses() {
        let met = candidate(SourceId::MetMuseum, "", "", "");
        let commons = candidate(SourceId::WikimediaCommons, "", "", "");
        assert_eq!(score_candidate(&entity(), &met), 40);
        assert_eq!(score_candidate(&entity(), &commons), 25);
    }

    #[test]
    fn test_license_bonuses() {
        assert_eq!(license_bonus("Public domain (CC0)"), 15);
        assert_eq!(license_bonus("CC0 1.0"), 15);
        assert_eq!(license_bonus("CC BY-SA 4.0"), 10);
        assert_eq!(license_bonus("Attribution 2.0"), 10);
        assert_eq!(license_bonus("unknown"), 0);
    }

    #[test]
    fn test_institution_bonus() {
        let mut c = candidate(SourceId::WikimediaCommons, "", "", "");
        let without = score_candidate(&entity(), &c);
        c.institution = "The Metropolitan Museum of Art".to_string();
        assert_eq!(score_candidate(&entity(), &c), without + 5);
    }

    #[test]
    fn test_metadata_word_bonus() {
        let plain = candidate(SourceId::WikimediaCommons, "", "", "");
        let with_meta = candidate(SourceId::WikimediaCommons, "", "", "bronze discus fragment");
        assert_eq!(
            score_candidate(&entity(), &with_meta),
            score_candidate(&entity(), &plain) + 16
        );
    }

    #[test]
    fn test_score_pool_preserves_order() {
        let mut pool = vec![
            candidate(SourceId::WikimediaCommons, "Bronze discus", "CC0", ""),
            candidate(SourceId::MetMuseum, "Unrelated", "", ""),
        ];
        score_pool(&entity(), &mut pool);
        assert_eq!(pool[0].title, "Bronze discus");
        assert!(pool.iter().all(|c| c.score > 0));
    }
}
