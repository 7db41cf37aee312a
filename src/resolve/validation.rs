//! Hard accept/reject gates applied to the candidate pool before scoring.
//!
//! Rules run in a fixed order and the first rejection wins. Validation is
//! a pure filter: it never touches a candidate's score.

use reqwest::Url;

use super::era::{classify_era, EraClass};
use super::significant_words;
use crate::config::PolicySettings;
use crate::content_store::TargetEntity;
use crate::sources::Candidate;

/// Hosts a candidate (or override) URL may point at. Anything else is
/// rejected outright, whatever its score would have been.
pub const TRUSTED_DOMAINS: &[&str] = &[
    "metmuseum.org",
    "clevelandart.org",
    "si.edu",
    "artic.edu",
    "rijksmuseum.nl",
    // Rijksmuseum web images are served from Google's CDN
    "googleusercontent.com",
    "wikimedia.org",
];

/// Terms that mark a record as retail/stock imagery or a modern knock-off,
/// implausible for an ancient artifact.
const ANACHRONISM_TERMS: &[&str] = &[
    "stock photo",
    "stock image",
    "shutterstock",
    "getty images",
    "istock",
    "dreamstime",
    "alamy",
    "clipart",
    "clip art",
    "3d render",
    "3d model",
    "vector art",
    "replica",
    "reproduction",
    "souvenir",
    "merchandise",
    "t-shirt",
    "wallpaper",
    "screenshot",
];

/// At least one of these must appear in an ancient entity's candidate text.
const ANTIQUITY_SIGNALS: &[&str] = &[
    "ancient",
    "antiquity",
    "antiquities",
    "archaeolog",
    "excavat",
    "museum",
    "artifact",
    "artefact",
    "classical",
    "bronze age",
    "iron age",
    "roman",
    "greek",
    "greece",
    "egypt",
    "mesopotam",
    "hellenistic",
    "etruscan",
    "byzantine",
    "dynasty",
    "terracotta",
    "relic",
    "bce",
    "b.c.",
];

/// Fine-art vocabulary: a technology artifact should not resolve to a
/// painting of its subject.
const FINE_ART_TERMS: &[&str] = &[
    "oil painting",
    "painting",
    "watercolor",
    "watercolour",
    "canvas",
    "fresco",
    "still life",
    "lithograph",
    "etching",
    "engraving",
    "fine art",
];

/// Tags (or title words) marking an entity as a technology/modern artifact.
const TECHNOLOGY_MARKERS: &[&str] = &[
    "software",
    "hardware",
    "computing",
    "computer",
    "technology",
    "electronics",
    "internet",
    "digital",
    "robotics",
    "ai",
    "machine-learning",
];

/// Result of one validation rule: accept, or reject with a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub accepted: bool,
    pub reason: Option<String>,
}

impl ValidationOutcome {
    pub fn accept() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: Some(reason.into()),
        }
    }
}

/// Whether a URL's host is an allow-listed catalog domain or one of its
/// subdomains.
pub fn host_is_trusted(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    TRUSTED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

/// Whether the entity's tags or title mark it as a technology artifact.
pub fn is_technology_entity(entity: &TargetEntity) -> bool {
    let tag_hit = entity
        .tags
        .iter()
        .any(|tag| TECHNOLOGY_MARKERS.contains(&tag.to_lowercase().as_str()));
    if tag_hit {
        return true;
    }
    significant_words(&entity.title)
        .iter()
        .any(|word| TECHNOLOGY_MARKERS.contains(&word.as_str()))
}

/// First fine-art term found in the combined candidate text, if any.
pub fn fine_art_hit(combined: &str) -> Option<&'static str> {
    FINE_ART_TERMS.iter().copied().find(|t| combined.contains(t))
}

/// Whether enough of the entity's significant title words appear in the
/// combined candidate text. Entities with no significant words are exempt;
/// the requirement never exceeds the number of words available.
pub fn keyword_overlap_ok(entity: &TargetEntity, combined: &str, policy: &PolicySettings) -> bool {
    let words = significant_words(&entity.title);
    if words.is_empty() {
        return true;
    }
    let required = policy.min_keyword_overlap.min(words.len());
    let found = words.iter().filter(|w| combined.contains(w.as_str())).count();
    found >= required
}

/// Run the full rule chain against one candidate.
pub fn validate(
    entity: &TargetEntity,
    candidate: &Candidate,
    policy: &PolicySettings,
) -> ValidationOutcome {
    // Rule 1: trusted domain
    if !host_is_trusted(&candidate.url) {
        return ValidationOutcome::reject(format!("untrusted host: {}", candidate.url));
    }

    let combined = candidate.combined_text();

    // Rule 2: era plausibility, ancient entities only
    if classify_era(&entity.era, policy) == EraClass::Ancient {
        if let Some(term) = ANACHRONISM_TERMS.iter().find(|t| combined.contains(*t)) {
            return ValidationOutcome::reject(format!("anachronistic term: {}", term));
        }
        if !ANTIQUITY_SIGNALS.iter().any(|t| combined.contains(t)) {
            return ValidationOutcome::reject("no antiquity signal in candidate text");
        }
    }

    // Rule 3: negative keywords, technology entities only
    if is_technology_entity(entity) {
        if let Some(term) = fine_art_hit(&combined) {
            return ValidationOutcome::reject(format!("fine-art term for technology entity: {}", term));
        }
    }

    // Rule 4: required keyword overlap
    if !keyword_overlap_ok(entity, &combined, policy) {
        return ValidationOutcome::reject("insufficient title keyword overlap");
    }

    ValidationOutcome::accept()
}
