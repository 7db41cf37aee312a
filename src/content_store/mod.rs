//! Typed JSON store for the catalog entities the pipeline resolves images for.
//!
//! The store is a flat JSON array of entity records. The run updates records
//! in memory and persists the whole document atomically on write-back, so
//! attribution updates are a structured read-modify-write rather than text
//! patching.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One catalog entity needing an authoritative image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEntity {
    /// Stable identifier, unique across the store.
    pub slug: String,
    pub title: String,
    /// Free-text era/date label, e.g. "450 BCE", "c. 1890", "2042 (projected)".
    #[serde(default)]
    pub era: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Current image attribution, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageMeta>,
}

impl TargetEntity {
    /// Whether this entity still needs resolution: no image at all,
    /// or only a placeholder.
    pub fn needs_image(&self) -> bool {
        match &self.image {
            None => true,
            Some(meta) => meta.quality == ImageQuality::Placeholder,
        }
    }
}

/// Stored image attribution for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    pub path: String,
    pub license: String,
    pub source_url: String,
    pub quality: ImageQuality,
}

/// Quality grade of a stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    Approved,
    NeedsReview,
    Placeholder,
}

/// In-memory view of the entity store file.
#[derive(Debug)]
pub struct ContentStore {
    path: PathBuf,
    entities: Vec<TargetEntity>,
}

impl ContentStore {
    /// Load the store, validating slug uniqueness.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read entity store: {:?}", path))?;
        let entities: Vec<TargetEntity> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse entity store: {:?}", path))?;

        let mut seen = HashSet::new();
        for entity in &entities {
            if !seen.insert(entity.slug.as_str()) {
                bail!("Duplicate entity slug in store: {}", entity.slug);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            entities,
        })
    }

    pub fn entities(&self) -> &[TargetEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Replace the image attribution of the entity with the given slug.
    /// Returns false if no such entity exists.
    pub fn update_image(&mut self, slug: &str, meta: ImageMeta) -> bool {
        match self.entities.iter_mut().find(|e| e.slug == slug) {
            Some(entity) => {
                entity.image = Some(meta);
                true
            }
            None => false,
        }
    }

    /// Persist the store. Writes to a temporary file in the same directory
    /// and renames over the original, so a crash mid-write cannot corrupt it.
    pub fn write_back(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entities)
            .context("Failed to serialize entity store")?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp_path = dir.join(format!(
            ".{}.tmp",
            self.path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "entities.json".to_string())
        ));

        std::fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write entity store: {:?}", tmp_path))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace entity store: {:?}", self.path))?;
        Ok(())
    }
}
