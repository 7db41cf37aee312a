//! Run reporting: per-entity outcomes, suspicious/failed review lists,
//! machine-readable and human-readable renderings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::PolicySettings;
use crate::content_store::TargetEntity;
use crate::resolve::{DecisionStatus, RejectionRecord, Resolution};

pub const REPORT_JSON: &str = "report.json";
pub const REPORT_TEXT: &str = "report.txt";

/// The full machine-readable run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: String,
    /// Policy thresholds in effect, recorded for reproducibility.
    pub acceptance_threshold: i64,
    pub min_keyword_overlap: usize,
    pub entries: Vec<ReportEntry>,
    pub suspicious: Vec<SuspiciousEntry>,
    pub failed: Vec<FailedEntry>,
}

/// Outcome of one entity, in processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub slug: String,
    pub title: String,
    pub status: DecisionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub pool_size: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejections: Vec<RejectionRecord>,
}

impl ReportEntry {
    /// Build an entry from a resolution; the image path is attached later
    /// once the download outcome is known.
    pub fn from_resolution(entity: &TargetEntity, resolution: &Resolution) -> Self {
        let decision = &resolution.decision;
        let winner = decision.winner.as_ref();
        Self {
            slug: entity.slug.clone(),
            title: entity.title.clone(),
            status: decision.status,
            score: winner.map(|c| c.score),
            source: winner.map(|c| c.source.display_name().to_string()),
            license: winner.map(|c| c.license.clone()),
            institution: winner
                .map(|c| c.institution.clone())
                .filter(|i| !i.is_empty()),
            page_url: winner.map(|c| c.page_url.clone()).filter(|u| !u.is_empty()),
            image_path: None,
            reason: decision.reason.clone(),
            pool_size: resolution.pool_size,
            rejections: resolution.rejections.clone(),
        }
    }

    /// Downgrade the entry after a failed download of the chosen candidate.
    pub fn mark_download_failure(&mut self, reason: String) {
        self.status = DecisionStatus::Failed;
        self.reason = Some(reason);
        self.image_path = None;
    }
}

/// Review-list record for a suspicious outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousEntry {
    pub slug: String,
    pub title: String,
    pub score: Option<i64>,
    pub source: Option<String>,
    pub page_url: Option<String>,
    pub reason: Option<String>,
}

/// Review-list record for a failed outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedEntry {
    pub slug: String,
    pub title: String,
    pub reason: Option<String>,
}

/// Accumulates entries across the run and flushes them once at the end.
pub struct ReportWriter {
    report_dir: PathBuf,
    report: RunReport,
}

impl ReportWriter {
    pub fn new(report_dir: &Path, policy: &PolicySettings) -> Self {
        Self {
            report_dir: report_dir.to_path_buf(),
            report: RunReport {
                generated_at: String::new(),
                acceptance_threshold: policy.acceptance_threshold,
                min_keyword_overlap: policy.min_keyword_overlap,
                entries: Vec::new(),
                suspicious: Vec::new(),
                failed: Vec::new(),
            },
        }
    }

    /// Append one entity's outcome, deriving the review lists.
    pub fn record(&mut self, entry: ReportEntry) {
        match entry.status {
            DecisionStatus::Suspicious => self.report.suspicious.push(SuspiciousEntry {
                slug: entry.slug.clone(),
                title: entry.title.clone(),
                score: entry.score,
                source: entry.source.clone(),
                page_url: entry.page_url.clone(),
                reason: entry.reason.clone(),
            }),
            DecisionStatus::Failed => self.report.failed.push(FailedEntry {
                slug: entry.slug.clone(),
                title: entry.title.clone(),
                reason: entry.reason.clone(),
            }),
            DecisionStatus::Success | DecisionStatus::Placeholder => {}
        }
        self.report.entries.push(entry);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.report.entries
    }

    /// Write `report.json` and the derived `report.txt`. Called exactly
    /// once at the end of a run.
    pub fn flush(&mut self) -> Result<()> {
        self.report.generated_at = chrono::Utc::now().to_rfc3339();

        std::fs::create_dir_all(&self.report_dir)
            .with_context(|| format!("Failed to create report dir: {:?}", self.report_dir))?;

        let json_path = self.report_dir.join(REPORT_JSON);
        let json = serde_json::to_string_pretty(&self.report).context("Failed to serialize report")?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("Failed to write report: {:?}", json_path))?;

        let text_path = self.report_dir.join(REPORT_TEXT);
        std::fs::write(&text_path, render_text(&self.report))
            .with_context(|| format!("Failed to write report: {:?}", text_path))?;

        Ok(())
    }

    /// Load a previous run's report for review mode.
    pub fn load(report_dir: &Path) -> Result<RunReport> {
        let json_path = report_dir.join(REPORT_JSON);
        let content = std::fs::read_to_string(&json_path)
            .with_context(|| format!("Failed to read report: {:?}", json_path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse report: {:?}", json_path))
    }
}

/// Human-readable summary grouped by outcome.
pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Image resolution report ({})\n", report.generated_at));
    out.push_str(&format!(
        "Entities: {} total, {} suspicious, {} failed\n\n",
        report.entries.len(),
        report.suspicious.len(),
        report.failed.len()
    ));

    for entry in &report.entries {
        out.push_str(&format!("[{}] {} ({})\n", entry.status.as_str(), entry.title, entry.slug));
        if let Some(source) = &entry.source {
            let score = entry
                .score
                .map(|s| format!(", score {}", s))
                .unwrap_or_default();
            out.push_str(&format!("    source: {}{}\n", source, score));
        }
        if let Some(license) = &entry.license {
            out.push_str(&format!("    license: {}\n", license));
        }
        if let Some(path) = &entry.image_path {
            out.push_str(&format!("    image: {}\n", path));
        }
        if let Some(reason) = &entry.reason {
            out.push_str(&format!("    reason: {}\n", reason));
        }
    }

    out.push_str(&render_review(report));
    out
}

/// The suspicious and failed sections only, as shown by review mode.
pub fn render_review(report: &RunReport) -> String {
    let mut out = String::new();

    if !report.suspicious.is_empty() {
        out.push_str("\nSuspicious (needs manual review):\n");
        for entry in &report.suspicious {
            out.push_str(&format!(
                "  {} ({}) score {} from {}\n",
                entry.title,
                entry.slug,
                entry.score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
                entry.source.as_deref().unwrap_or("-"),
            ));
            if let Some(reason) = &entry.reason {
                out.push_str(&format!("      {}\n", reason));
            }
        }
    }

    if !report.failed.is_empty() {
        out.push_str("\nFailed:\n");
        for entry in &report.failed {
            out.push_str(&format!(
                "  {} ({}): {}\n",
                entry.title,
                entry.slug,
                entry.reason.as_deref().unwrap_or("no reason recorded"),
            ));
        }
    }

    out
}
