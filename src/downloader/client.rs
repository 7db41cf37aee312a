//! Rate-limited image fetching and persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::sources::RateLimiter;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Why a download was rejected. These are reported per entity as failure
/// reasons, never raised as panics.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("response is not an image (content-type {0:?})")]
    NotAnImage(Option<String>),
    #[error("empty payload")]
    EmptyPayload,
    #[error("payload of {size} bytes below minimum of {min}")]
    TooSmall { size: u64, min: u64 },
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("file missing after write: {0}")]
    Vanished(PathBuf),
}

/// A successfully persisted image.
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub path: PathBuf,
    pub bytes: u64,
    pub extension: &'static str,
}

pub struct ImageDownloader {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
    min_bytes: u64,
}

impl ImageDownloader {
    pub fn new(limiter: Arc<RateLimiter>, min_bytes: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self {
            client,
            limiter,
            min_bytes,
        })
    }

    /// Fetch `url` and persist it as `{out_dir}/{slug}.{ext}`, with the
    /// extension derived from the content type. The payload must be a
    /// non-empty image of at least the configured minimum size, and the
    /// file is checked to exist on disk before success is reported.
    pub async fn fetch_image(
        &self,
        url: &str,
        slug: &str,
        out_dir: &Path,
    ) -> Result<DownloadedImage, DownloadError> {
        let response = self.limiter.get(&self.client, url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(DownloadError::EmptyPayload);
        }
        if (bytes.len() as u64) < self.min_bytes {
            return Err(DownloadError::TooSmall {
                size: bytes.len() as u64,
                min: self.min_bytes,
            });
        }

        let extension = image_extension(content_type.as_deref(), &bytes)
            .ok_or(DownloadError::NotAnImage(content_type))?;

        tokio::fs::create_dir_all(out_dir).await?;
        let path = out_dir.join(format!("{}.{}", slug, extension));

        let mut file = File::create(&path).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        if !path.exists() {
            return Err(DownloadError::Vanished(path));
        }

        Ok(DownloadedImage {
            path,
            bytes: bytes.len() as u64,
            extension,
        })
    }
}

/// File extension for an image payload, from the content-type header when
/// it names an image type, otherwise by sniffing the payload bytes. None
/// means the payload is not an image at all.
fn image_extension(content_type: Option<&str>, bytes: &[u8]) -> Option<&'static str> {
    if let Some(ct) = content_type {
        let essence = ct.split(';').next().unwrap_or(ct).trim().to_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => return Some("jpg"),
            "image/png" => return Some("png"),
            "image/gif" => return Some("gif"),
            "image/webp" => return Some("webp"),
            "image/svg+xml" => return Some("svg"),
            _ => {}
        }
        // A non-image content type that isn't just a generic octet-stream
        // is disqualifying even if the bytes would sniff as an image.
        if essence != "application/octet-stream" && !essence.is_empty() {
            return None;
        }
    }

    match infer::get(bytes) {
        Some(kind) if kind.mime_type().starts_with("image/") => match kind.extension() {
            "jpg" => Some("jpg"),
            "png" => Some("png"),
            "gif" => Some("gif"),
            "webp" => Some("webp"),
            _ => None,
        },
        _ => None,
    }
}
