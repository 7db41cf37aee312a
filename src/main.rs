use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_image_resolver::config::{AppConfig, CliConfig, FileConfig};
use catalog_image_resolver::content_store::{ContentStore, ImageMeta, ImageQuality, TargetEntity};
use catalog_image_resolver::downloader::ImageDownloader;
use catalog_image_resolver::overrides::OverrideMap;
use catalog_image_resolver::report::{render_review, ReportEntry, ReportWriter, REPORT_JSON};
use catalog_image_resolver::resolve::{DecisionStatus, EntityResolver};
use catalog_image_resolver::sources::{default_adapters, RateLimiter};

#[derive(Parser, Debug)]
#[clap(about = "Resolve authoritative open-access images for catalog entities")]
struct CliArgs {
    /// Path to the JSON entity store.
    pub entities_json: PathBuf,

    /// Directory downloaded images are written to.
    pub out_dir: PathBuf,

    /// Optional TOML settings file; values override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// JSON file mapping entity slug to a manually chosen image URL.
    #[clap(long)]
    pub overrides: Option<PathBuf>,

    /// Reprocess every entity, not only those missing an image.
    #[clap(long)]
    pub force: bool,

    /// Print the previous run's suspicious and failed lists, then exit.
    #[clap(long)]
    pub review: bool,

    /// Only process the first N eligible entities.
    #[clap(long)]
    pub limit: Option<usize>,

    /// Persist attribution updates into the entity store.
    #[clap(long)]
    pub write_back: bool,

    /// Directory reports are written to. Defaults to OUT_DIR.
    #[clap(long)]
    pub report_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli = CliConfig {
        entities_path: cli_args.entities_json,
        out_dir: cli_args.out_dir,
        report_dir: cli_args.report_dir,
        overrides_path: cli_args.overrides,
        force: cli_args.force,
        review: cli_args.review,
        limit: cli_args.limit,
        write_back: cli_args.write_back,
    };
    let config = AppConfig::resolve(&cli, file_config)?;

    if config.review {
        let report = ReportWriter::load(&config.report_dir)?;
        println!(
            "Run of {}: {} entities, {} suspicious, {} failed",
            report.generated_at,
            report.entries.len(),
            report.suspicious.len(),
            report.failed.len()
        );
        print!("{}", render_review(&report));
        return Ok(());
    }

    info!("Loading entity store at {:?}...", config.entities_path);
    let mut store = ContentStore::load(&config.entities_path)?;

    let overrides = match &config.overrides_path {
        Some(path) => {
            let overrides = OverrideMap::load(path)?;
            info!("Loaded {} manual overrides from {:?}", overrides.len(), path);
            overrides
        }
        None => OverrideMap::empty(),
    };

    let limiter = Arc::new(RateLimiter::from_policy(&config.policy));
    let adapters = default_adapters(limiter.clone(), &config.policy)?;
    let downloader = ImageDownloader::new(limiter, config.policy.min_image_bytes)?;
    let resolver = EntityResolver::new(adapters, overrides, config.policy.clone());
    let mut report = ReportWriter::new(&config.report_dir, &config.policy);

    let selected: Vec<TargetEntity> = store
        .entities()
        .iter()
        .filter(|e| config.force || e.needs_image())
        .take(config.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    info!(
        "Resolving images for {} of {} entities",
        selected.len(),
        store.len()
    );

    let progress = ProgressBar::new(selected.len() as u64);
    for entity in &selected {
        progress.set_message(entity.slug.clone());
        let resolution = resolver.resolve(entity).await;
        let mut entry = ReportEntry::from_resolution(entity, &resolution);

        match &resolution.decision.winner {
            Some(winner) => {
                match downloader
                    .fetch_image(&winner.url, &entity.slug, &config.out_dir)
                    .await
                {
                    Ok(image) => {
                        let path = image.path.to_string_lossy().to_string();
                        let quality = match resolution.decision.status {
                            DecisionStatus::Success => ImageQuality::Approved,
                            _ => ImageQuality::NeedsReview,
                        };
                        store.update_image(
                            &entity.slug,
                            ImageMeta {
                                path: path.clone(),
                                license: winner.license.clone(),
                                source_url: if winner.page_url.is_empty() {
                                    winner.url.clone()
                                } else {
                                    winner.page_url.clone()
                                },
                                quality,
                            },
                        );
                        entry.image_path = Some(path);
                        info!(
                            "{}: {} via {} (score {})",
                            entity.slug,
                            resolution.decision.status.as_str(),
                            winner.source,
                            winner.score
                        );
                    }
                    Err(e) => {
                        warn!("{}: download failed: {}", entity.slug, e);
                        entry.mark_download_failure(format!("download failed: {}", e));
                    }
                }
            }
            None => {
                info!(
                    "{}: {}",
                    entity.slug,
                    resolution
                        .decision
                        .reason
                        .as_deref()
                        .unwrap_or_else(|| resolution.decision.status.as_str())
                );
            }
        }

        report.record(entry);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let summary = {
        let mut counts = [0usize; 4];
        for entry in report.entries() {
            let i = match entry.status {
                DecisionStatus::Success => 0,
                DecisionStatus::Suspicious => 1,
                DecisionStatus::Failed => 2,
                DecisionStatus::Placeholder => 3,
            };
            counts[i] += 1;
        }
        counts
    };

    report
        .flush()
        .context("Failed to flush run report")?;
    info!("Report written to {:?}", config.report_dir.join(REPORT_JSON));

    if config.write_back {
        store.write_back()?;
        info!("Entity store updated at {:?}", config.entities_path);
    }

    info!(
        "Done: {} success, {} suspicious, {} failed, {} placeholder",
        summary[0], summary[1], summary[2], summary[3]
    );

    Ok(())
}
