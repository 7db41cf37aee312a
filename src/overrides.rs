//! Manual slug -> URL override map.
//!
//! Loaded once at pipeline start; a malformed file is a fatal error rather
//! than a silently empty map, since an override that fails to load would
//! otherwise let the automated pipeline overwrite a curated choice.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default)]
pub struct OverrideMap {
    map: HashMap<String, String>,
}

impl OverrideMap {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a flat JSON object of slug -> image URL.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read override file: {:?}", path))?;
        let map: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse override file: {:?}", path))?;
        Ok(Self { map })
    }

    pub fn get(&self, slug: &str) -> Option<&str> {
        self.map.get(slug).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_and_lookup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(
            &path,
            r#"{"bronze-discus": "https://images.metmuseum.org/discus.jpg"}"#,
        )
        .unwrap();

        let overrides = OverrideMap::load(&path).unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(
            overrides.get("bronze-discus"),
            Some("https://images.metmuseum.org/discus.jpg")
        );
        assert_eq!(overrides.get("unknown"), None);
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, r#"["not", "a", "map"]"#).unwrap();

        assert!(OverrideMap::load(&path).is_err());
    }

    #[test]
    fn test_empty_map() {
        let overrides = OverrideMap::empty();
        assert!(overrides.is_empty());
        assert_eq!(overrides.get("anything"), None);
    }
}
