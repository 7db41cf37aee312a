//! Image download and persistence for chosen candidates.

mod client;

pub use client::{DownloadError, DownloadedImage, ImageDownloader};
