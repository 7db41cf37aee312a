//! Common candidate shape every catalog adapter normalizes into.

use serde::{Deserialize, Serialize};

/// The external catalogs the pipeline can draw candidates from,
/// plus the marker for manually overridden images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    MetMuseum,
    ClevelandMuseum,
    Smithsonian,
    ArtInstituteChicago,
    Rijksmuseum,
    WikimediaCommons,
    Manual,
}

impl SourceId {
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::MetMuseum => "The Metropolitan Museum of Art",
            SourceId::ClevelandMuseum => "Cleveland Museum of Art",
            SourceId::Smithsonian => "Smithsonian Open Access",
            SourceId::ArtInstituteChicago => "Art Institute of Chicago",
            SourceId::Rijksmuseum => "Rijksmuseum",
            SourceId::WikimediaCommons => "Wikimedia Commons",
            SourceId::Manual => "Manual override",
        }
    }

    /// Fixed reliability bonus added to every candidate from this source.
    ///
    /// Curated museum APIs with vetted metadata rank above the general
    /// open-media catalog. Manual overrides never go through scoring.
    pub fn reliability_bonus(&self) -> i64 {
        match self {
            SourceId::MetMuseum | SourceId::ClevelandMuseum => 40,
            SourceId::Smithsonian => 35,
            SourceId::ArtInstituteChicago | SourceId::Rijksmuseum => 30,
            SourceId::WikimediaCommons => 25,
            SourceId::Manual => 0,
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One externally sourced image record proposed as a match for an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub source: SourceId,
    /// Direct URL of the image binary.
    pub url: String,
    /// Human-readable page describing the record.
    pub page_url: String,
    pub title: String,
    pub institution: String,
    pub creator: String,
    pub license: String,
    /// Descriptive text and category terms, space-joined.
    pub metadata: String,
    /// 0 until the scorer runs.
    pub score: i64,
}

impl Candidate {
    /// Lowercased title + metadata, the text the validation rules and
    /// overlap checks run against.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.metadata).to_lowercase()
    }

    /// Synthetic candidate for a manually overridden image URL.
    pub fn manual_override(url: &str) -> Self {
        Self {
            source: SourceId::Manual,
            url: url.to_string(),
            page_url: url.to_string(),
            title: String::new(),
            institution: SourceId::Manual.display_name().to_string(),
            creator: String::new(),
            license: "manual".to_string(),
            metadata: String::new(),
            score: 0,
        }
    }
}

/// Join the non-empty parts of a record's descriptive fields into the
/// candidate metadata blob.
pub(crate) fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a license string names an open license the pipeline accepts.
///
/// Adapters drop records failing this check before they ever become
/// candidates.
pub fn is_open_license(license: &str) -> bool {
    let lower = license.to_lowercase();
    lower.contains("public domain")
        || lower.contains("cc0")
        || lower.contains("pdm")
        || lower.contains("cc by")
        || lower.contains("cc-by")
}
