//! Stored video records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{UserId, VideoId};
use super::Owned;

/// Fallback content type for records that predate the `mime` field
pub const DEFAULT_MIME: &str = "video/mp4";

/// A downloaded video in the media storage area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Unique video identifier
    pub id: VideoId,

    /// Human-readable title reported by the downloader
    pub title: String,

    /// Remote thumbnail image, if the source had one
    #[serde(rename = "thumbnail", alias = "thumbnail_url", default)]
    pub thumbnail_url: Option<String>,

    /// File name inside the media storage area
    pub filename: String,

    /// Content type of the backing file
    pub mime: String,

    /// Owning user; `None` marks a legacy, shared record
    #[serde(default)]
    pub owner_id: Option<UserId>,

    /// When the video was added to the library
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Create a video owned by `owner`
    pub fn new(owner: UserId, details: NewVideo) -> Self {
        Self {
            id: VideoId::generate(),
            title: details.title,
            thumbnail_url: details.thumbnail_url,
            filename: details.filename,
            mime: details.mime,
            owner_id: Some(owner),
            added_at: Some(Utc::now()),
        }
    }
}

impl Owned for Video {
    fn owner_id(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }
}

/// Fields supplied by the media fetcher when a download completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub filename: String,
    pub mime: String,
}

/// Pick a content type for a file name from its extension
pub fn mime_for_filename(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_MIME.to_string())
}
