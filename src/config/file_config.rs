use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub out_dir: Option<String>,
    pub report_dir: Option<String>,
    pub overrides_path: Option<String>,
    pub limit: Option<usize>,

    // Tunable resolution policy
    pub policy: Option<PolicyConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PolicyConfig {
    pub acceptance_threshold: Option<i64>,
    pub min_keyword_overlap: Option<usize>,
    pub min_request_interval_ms: Option<u64>,
    pub rate_limit_retry_delay_ms: Option<u64>,
    pub max_results_per_source: Option<usize>,
    pub min_image_bytes: Option<u64>,
    pub ancient_year_ceiling: Option<i32>,
    pub speculative_year_floor: Option<i32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
