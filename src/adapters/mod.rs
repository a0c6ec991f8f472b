//! Adapter interfaces for external systems.
//!
//! The library never downloads anything itself. A [`MediaFetcher`] turns a
//! source URL into a file in the media storage area and reports what it
//! produced; only then is the video recorded.

pub mod ytdlp;

use std::io;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use ytdlp::YtDlpFetcher;

/// What a successful fetch left in the media directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    /// Title reported by the source
    pub title: String,

    /// Remote thumbnail image, if any
    pub thumbnail_url: Option<String>,

    /// File name inside the media directory
    pub filename: String,

    /// Content type of the file
    pub mime: String,
}

impl From<FetchedMedia> for crate::domain::NewVideo {
    fn from(media: FetchedMedia) -> Self {
        Self {
            title: media.title,
            thumbnail_url: media.thumbnail_url,
            filename: media.filename,
            mime: media.mime,
        }
    }
}

/// Errors reported by a fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to run downloader: {0}")]
    Spawn(#[source] io::Error),

    #[error("Downloader exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Download timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unreadable downloader output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Downloader reported success but produced no file: {0}")]
    NoFile(String),
}

/// Trait for media download backends
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Download `url` into `media_dir`
    ///
    /// On success the returned file exists in `media_dir`.
    async fn fetch(&self, url: &str, media_dir: &Path) -> Result<FetchedMedia, FetchError>;
}
