//! yt-dlp fetcher.
//!
//! Spawns the `yt-dlp` binary, lets it download and merge into the media
//! directory, and reads the single JSON document it prints afterwards.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use super::{FetchError, FetchedMedia, MediaFetcher};
use crate::domain::mime_for_filename;

/// Format selector: best video and audio merged, else best single file
pub const DEFAULT_FORMAT: &str = "bestvideo+bestaudio/best";

/// Container the merged output is written as
const MERGE_FORMAT: &str = "mp4";

/// Default wall-clock limit for one download
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1800);

/// Fetcher backed by the `yt-dlp` CLI
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    binary_path: String,
    format: String,
    timeout: Duration,
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpFetcher {
    pub fn new() -> Self {
        Self {
            binary_path: "yt-dlp".to_string(),
            format: DEFAULT_FORMAT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a custom binary path
    pub fn with_binary_path(mut self, binary_path: impl Into<String>) -> Self {
        self.binary_path = binary_path.into();
        self
    }

    /// Use a custom format selector
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Limit how long a single download may run
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(&self, url: &str, media_dir: &Path) -> Result<FetchedMedia, FetchError> {
        let template = media_dir.join("%(title)s.%(ext)s");

        debug!(url, binary = %self.binary_path, "Starting download");
        let child = Command::new(&self.binary_path)
            .arg("--format")
            .arg(&self.format)
            .arg("--merge-output-format")
            .arg(MERGE_FORMAT)
            .arg("--output")
            .arg(&template)
            .args(["--dump-single-json", "--no-simulate", "--no-progress", "--no-playlist"])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(FetchError::Spawn)?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
            .map_err(FetchError::Spawn)?;

        if !output.status.success() {
            return Err(FetchError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let media = parse_output(&output.stdout)?;

        if !tokio::fs::try_exists(media_dir.join(&media.filename))
            .await
            .unwrap_or(false)
        {
            return Err(FetchError::NoFile(media.filename));
        }

        info!(url, filename = %media.filename, "Download complete");
        Ok(media)
    }
}

/// The subset of yt-dlp's info document we use
#[derive(Debug, Deserialize)]
struct InfoJson {
    title: String,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    requested_downloads: Vec<RequestedDownload>,
    #[serde(default, rename = "_filename")]
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RequestedDownload {
    #[serde(default)]
    filepath: Option<String>,
}

/// Extract title, thumbnail and the final (merged) file name from yt-dlp output
fn parse_output(stdout: &[u8]) -> Result<FetchedMedia, FetchError> {
    let info: InfoJson = serde_json::from_slice(stdout)?;

    let reported = info
        .requested_downloads
        .iter()
        .find_map(|d| d.filepath.clone())
        .or(info.filename)
        .ok_or_else(|| FetchError::NoFile(info.title.clone()))?;

    // Merging may change the container after the name was reported
    let merged = Path::new(&reported).with_extension(MERGE_FORMAT);
    let filename = merged
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| FetchError::NoFile(reported.clone()))?;

    Ok(FetchedMedia {
        mime: mime_for_filename(&filename),
        title: info.title,
        thumbnail_url: info.thumbnail,
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let fetcher = YtDlpFetcher::new()
            .with_binary_path("/opt/bin/yt-dlp")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(fetcher.name(), "yt-dlp");
        assert_eq!(fetcher.binary_path, "/opt/bin/yt-dlp");
        assert_eq!(fetcher.format, DEFAULT_FORMAT);
        assert_eq!(fetcher.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_output_prefers_final_filepath() {
        let stdout = br#"{
            "title": "Sunset Drive",
            "thumbnail": "https://i.ytimg.com/vi/x/hq.jpg",
            "_filename": "/media/Sunset Drive.webm",
            "requested_downloads": [{"filepath": "/media/Sunset Drive.mp4"}]
        }"#;

        let media = parse_output(stdout).unwrap();
        assert_eq!(media.title, "Sunset Drive");
        assert_eq!(media.filename, "Sunset Drive.mp4");
        assert_eq!(media.mime, "video/mp4");
        assert_eq!(
            media.thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/x/hq.jpg")
        );
    }

    #[test]
    fn test_parse_output_rewrites_extension() {
        let stdout = br#"{"title": "Clip", "_filename": "/media/Clip.webm"}"#;

        let media = parse_output(stdout).unwrap();
        assert_eq!(media.filename, "Clip.mp4");
        assert!(media.thumbnail_url.is_none());
    }

    #[test]
    fn test_parse_output_without_file() {
        let result = parse_output(br#"{"title": "Nothing"}"#);
        assert!(matches!(result, Err(FetchError::NoFile(_))));

        let result = parse_output(b"not json");
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let fetcher = YtDlpFetcher::new().with_binary_path("/nonexistent/yt-dlp");

        let result = fetcher.fetch("https://example.com/v", temp.path()).await;
        assert!(matches!(result, Err(FetchError::Spawn(_))));
    }
}
