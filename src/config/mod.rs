mod file_config;

pub use file_config::{FileConfig, PolicyConfig};

use anyhow::{bail, Result};
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub entities_path: PathBuf,
    pub out_dir: PathBuf,
    pub report_dir: Option<PathBuf>,
    pub overrides_path: Option<PathBuf>,
    pub force: bool,
    pub review: bool,
    pub limit: Option<usize>,
    pub write_back: bool,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub entities_path: PathBuf,
    pub out_dir: PathBuf,
    pub report_dir: PathBuf,
    pub overrides_path: Option<PathBuf>,
    pub force: bool,
    pub review: bool,
    pub limit: Option<usize>,
    pub write_back: bool,
    pub policy: PolicySettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        if !cli.review && !cli.entities_path.exists() {
            bail!("Entity store file does not exist: {:?}", cli.entities_path);
        }

        let out_dir = file
            .out_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.out_dir.clone());

        // Reports land next to the images unless directed elsewhere
        let report_dir = file
            .report_dir
            .map(PathBuf::from)
            .or_else(|| cli.report_dir.clone())
            .unwrap_or_else(|| out_dir.clone());

        let overrides_path = file
            .overrides_path
            .map(PathBuf::from)
            .or_else(|| cli.overrides_path.clone());

        if let Some(path) = &overrides_path {
            if !path.exists() {
                bail!("Override file does not exist: {:?}", path);
            }
        }

        let limit = file.limit.or(cli.limit);

        let policy = PolicySettings::resolve(file.policy.unwrap_or_default());

        Ok(Self {
            entities_path: cli.entities_path.clone(),
            out_dir,
            report_dir,
            overrides_path,
            force: cli.force,
            review: cli.review,
            limit,
            write_back: cli.write_back,
            policy,
        })
    }
}

/// Tunable resolution policy.
///
/// The acceptance threshold and keyword overlap minimum are policy knobs,
/// not invariants: they can be adjusted per deployment from the TOML config.
#[derive(Debug, Clone)]
pub struct PolicySettings {
    /// Minimum score for a top candidate to be auto-approved.
    pub acceptance_threshold: i64,
    /// How many significant entity title words must appear in a candidate.
    pub min_keyword_overlap: usize,
    /// Minimum interval between any two outbound requests.
    pub min_request_interval_ms: u64,
    /// Delay before the single retry after an HTTP 429.
    pub rate_limit_retry_delay_ms: u64,
    /// Result cap per adapter call, bounds pool growth.
    pub max_results_per_source: usize,
    /// Payloads smaller than this are rejected as error-page images.
    pub min_image_bytes: u64,
    /// Years strictly before this classify an era label as ancient.
    pub ancient_year_ceiling: i32,
    /// Years at or after this classify an entity as speculative.
    pub speculative_year_floor: i32,
}

impl PolicySettings {
    fn resolve(file: PolicyConfig) -> Self {
        let defaults = Self::default();
        Self {
            acceptance_threshold: file
                .acceptance_threshold
                .unwrap_or(defaults.acceptance_threshold),
            min_keyword_overlap: file
                .min_keyword_overlap
                .unwrap_or(defaults.min_keyword_overlap),
            min_request_interval_ms: file
                .min_request_interval_ms
                .unwrap_or(defaults.min_request_interval_ms),
            rate_limit_retry_delay_ms: file
                .rate_limit_retry_delay_ms
                .unwrap_or(defaults.rate_limit_retry_delay_ms),
            max_results_per_source: file
                .max_results_per_source
                .unwrap_or(defaults.max_results_per_source),
            min_image_bytes: file.min_image_bytes.unwrap_or(defaults.min_image_bytes),
            ancient_year_ceiling: file
                .ancient_year_ceiling
                .unwrap_or(defaults.ancient_year_ceiling),
            speculative_year_floor: file
                .speculative_year_floor
                .unwrap_or(defaults.speculative_year_floor),
        }
    }
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            acceptance_threshold: 50,
            min_keyword_overlap: 2,
            min_request_interval_ms: 300,
            rate_limit_retry_delay_ms: 2000,
            max_results_per_source: 10,
            min_image_bytes: 1024,
            ancient_year_ceiling: 500,
            speculative_year_floor: 2035,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_entities_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("entities.json");
        std::fs::write(&path, "[]").unwrap();
        path
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = TempDir::new().unwrap();
        let entities = make_entities_file(&temp_dir);
        let cli = CliConfig {
            entities_path: entities.clone(),
            out_dir: PathBuf::from("/images"),
            report_dir: Some(PathBuf::from("/reports")),
            overrides_path: None,
            force: true,
            review: false,
            limit: Some(5),
            write_back: true,
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.entities_path, entities);
        assert_eq!(config.out_dir, PathBuf::from("/images"));
        assert_eq!(config.report_dir, PathBuf::from("/reports"));
        assert!(config.force);
        assert!(!config.review);
        assert_eq!(config.limit, Some(5));
        assert!(config.write_back);
        assert_eq!(config.policy.acceptance_threshold, 50);
    }

    #[test]
    fn test_report_dir_defaults_to_out_dir() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            entities_path: make_entities_file(&temp_dir),
            out_dir: PathBuf::from("/images"),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();
        assert_eq!(config.report_dir, PathBuf::from("/images"));
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            entities_path: make_entities_file(&temp_dir),
            out_dir: PathBuf::from("/cli/images"),
            limit: Some(10),
            ..Default::default()
        };

        let file_config = FileConfig {
            out_dir: Some("/toml/images".to_string()),
            limit: Some(3),
            policy: Some(PolicyConfig {
                acceptance_threshold: Some(70),
                min_keyword_overlap: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        assert_eq!(config.out_dir, PathBuf::from("/toml/images"));
        assert_eq!(config.limit, Some(3));
        assert_eq!(config.policy.acceptance_threshold, 70);
        assert_eq!(config.policy.min_keyword_overlap, 3);
        // Untouched policy fields keep their defaults
        assert_eq!(config.policy.min_request_interval_ms, 300);
    }

    #[test]
    fn test_resolve_missing_entities_error() {
        let cli = CliConfig {
            entities_path: PathBuf::from("/nonexistent/entities.json"),
            out_dir: PathBuf::from("/images"),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_review_mode_skips_entities_check() {
        let cli = CliConfig {
            entities_path: PathBuf::from("/nonexistent/entities.json"),
            out_dir: PathBuf::from("/images"),
            review: true,
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_ok());
    }

    #[test]
    fn test_resolve_missing_overrides_error() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            entities_path: make_entities_file(&temp_dir),
            out_dir: PathBuf::from("/images"),
            overrides_path: Some(PathBuf::from("/nonexistent/overrides.json")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Override file does not exist"));
    }

    #[test]
    fn test_policy_defaults() {
        let policy = PolicySettings::default();
        assert_eq!(policy.acceptance_threshold, 50);
        assert_eq!(policy.min_keyword_overlap, 2);
        assert_eq!(policy.min_request_interval_ms, 300);
        assert_eq!(policy.rate_limit_retry_delay_ms, 2000);
        assert_eq!(policy.max_results_per_source, 10);
        assert_eq!(policy.min_image_bytes, 1024);
        assert_eq!(policy.ancient_year_ceiling, 500);
        assert_eq!(policy.speculative_year_floor, 2035);
    }
}
