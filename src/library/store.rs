//! JSON-backed store for the video and playlist collections.
//!
//! Both collections are loaded whole at startup and rewritten whole on every
//! change. Older files may lack ids, owners or content types; those gaps are
//! filled once at load time and the repaired collection is written back.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::core::json_file::{load_json, write_json_atomic, DirLock, StoreError};
use crate::domain::{mime_for_filename, Playlist, PlaylistId, UserId, Video, VideoId};

const VIDEOS_FILE: &str = "videos.json";
const PLAYLISTS_FILE: &str = "playlists.json";

/// On-disk video record as older versions may have written it
#[derive(Debug, Deserialize)]
struct StoredVideo {
    #[serde(default)]
    id: Option<VideoId>,
    title: String,
    #[serde(rename = "thumbnail", alias = "thumbnail_url", default)]
    thumbnail_url: Option<String>,
    filename: String,
    #[serde(default)]
    mime: Option<String>,
    #[serde(default)]
    owner_id: Option<UserId>,
    #[serde(default)]
    added_at: Option<DateTime<Utc>>,
}

/// On-disk playlist record as older versions may have written it
#[derive(Debug, Deserialize)]
struct StoredPlaylist {
    #[serde(default)]
    id: Option<PlaylistId>,
    name: String,
    #[serde(default)]
    songs: Vec<VideoId>,
    #[serde(default)]
    owner_id: Option<UserId>,
}

/// Owner of the library data directory
#[derive(Debug)]
pub struct LibraryStore {
    dir: PathBuf,
    _lock: DirLock,
}

impl LibraryStore {
    /// Open the data directory, taking the single-process lock
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        let lock = DirLock::acquire(&dir)?;
        Ok(Self { dir, _lock: lock })
    }

    pub fn videos_path(&self) -> PathBuf {
        self.dir.join(VIDEOS_FILE)
    }

    pub fn playlists_path(&self) -> PathBuf {
        self.dir.join(PLAYLISTS_FILE)
    }

    /// Load both collections, repairing and re-persisting legacy records
    pub fn load(&self) -> Result<(Vec<Video>, Vec<Playlist>), StoreError> {
        let stored_videos: Vec<StoredVideo> = load_json(&self.videos_path())?.unwrap_or_default();
        let (videos, videos_repaired) = migrate_videos(stored_videos);
        if videos_repaired > 0 {
            info!(count = videos_repaired, "Repaired legacy video records");
            self.persist_videos(&videos)?;
        }

        let stored_playlists: Vec<StoredPlaylist> =
            load_json(&self.playlists_path())?.unwrap_or_default();
        let (playlists, playlists_repaired) = migrate_playlists(stored_playlists);
        if playlists_repaired > 0 {
            info!(count = playlists_repaired, "Repaired legacy playlist records");
            self.persist_playlists(&playlists)?;
        }

        Ok((videos, playlists))
    }

    /// Rewrite the whole video collection
    pub fn persist_videos(&self, videos: &[Video]) -> Result<(), StoreError> {
        write_json_atomic(&self.videos_path(), videos)
    }

    /// Rewrite the whole playlist collection
    pub fn persist_playlists(&self, playlists: &[Playlist]) -> Result<(), StoreError> {
        write_json_atomic(&self.playlists_path(), playlists)
    }
}

/// Fill in missing ids and content types; returns the number of records touched
fn migrate_videos(stored: Vec<StoredVideo>) -> (Vec<Video>, usize) {
    let mut repaired = 0;

    let videos: Vec<Video> = stored
        .into_iter()
        .map(|v| {
            if v.id.is_none() || v.mime.is_none() {
                repaired += 1;
            }
            Video {
                id: v.id.unwrap_or_else(VideoId::generate),
                mime: v.mime.unwrap_or_else(|| mime_for_filename(&v.filename)),
                title: v.title,
                thumbnail_url: v.thumbnail_url,
                filename: v.filename,
                owner_id: v.owner_id,
                added_at: v.added_at,
            }
        })
        .collect();

    (videos, repaired)
}

/// Fill in missing ids and collapse duplicate songs; returns the number of records touched
fn migrate_playlists(stored: Vec<StoredPlaylist>) -> (Vec<Playlist>, usize) {
    let mut repaired = 0;

    let playlists: Vec<Playlist> = stored
        .into_iter()
        .map(|p| {
            let mut seen = HashSet::new();
            let songs: Vec<VideoId> = p
                .songs
                .iter()
                .filter(|id| seen.insert(*id))
                .cloned()
                .collect();

            if p.id.is_none() || songs.len() != p.songs.len() {
                repaired += 1;
            }
            Playlist {
                id: p.id.unwrap_or_else(PlaylistId::generate),
                name: p.name,
                songs,
                owner_id: p.owner_id,
            }
        })
        .collect();

    (playlists, repaired)
}
