//! User playlists.

use serde::{Deserialize, Serialize};

use super::ids::{PlaylistId, UserId, VideoId};
use super::Owned;

/// A named, ordered list of video ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Display name
    pub name: String,

    /// Video ids in play order (no duplicates)
    #[serde(default)]
    pub songs: Vec<VideoId>,

    /// Owning user; `None` marks a legacy, shared record
    #[serde(default)]
    pub owner_id: Option<UserId>,
}

impl Playlist {
    /// Create an empty playlist owned by `owner`
    pub fn new(owner: UserId, name: impl Into<String>) -> Self {
        Self {
            id: PlaylistId::generate(),
            name: name.into(),
            songs: Vec::new(),
            owner_id: Some(owner),
        }
    }

    /// Check whether a video is already in the playlist
    pub fn contains(&self, video_id: &VideoId) -> bool {
        self.songs.contains(video_id)
    }

    /// Append a video unless it is already present. Returns true if added.
    pub fn push_song(&mut self, video_id: VideoId) -> bool {
        if self.contains(&video_id) {
            return false;
        }
        self.songs.push(video_id);
        true
    }

    /// Drop a video from the playlist. Returns true if it was present.
    pub fn remove_song(&mut self, video_id: &VideoId) -> bool {
        let before = self.songs.len();
        self.songs.retain(|id| id != video_id);
        self.songs.len() != before
    }
}

impl Owned for Playlist {
    fn owner_id(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }
}
