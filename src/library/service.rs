//! Ownership-scoped operations over videos and playlists.
//!
//! Every call names the acting user. Reads are filtered through the
//! [`OwnershipPolicy`]; mutations on records the actor cannot see are
//! silent no-ops, so other users' ids are never confirmed to exist.
//!
//! Each collection sits behind its own lock. Mutations work on a copy,
//! persist it, then swap it in, so memory never runs ahead of disk. When an
//! operation needs both collections it locks videos first, then playlists.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::media::{MediaError, MediaStorage};
use super::policy::OwnershipPolicy;
use super::store::LibraryStore;
use crate::core::json_file::StoreError;
use crate::domain::{NewVideo, Playlist, PlaylistId, UserId, Video, VideoId};

/// Errors from library operations
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Invalid playlist name: {0:?}")]
    InvalidName(String),

    #[error("Media file already recorded: {0}")]
    DuplicateFilename(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LibraryError {
    fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// The video library with its ownership rules applied
pub struct LibraryService {
    store: LibraryStore,
    media: MediaStorage,
    policy: OwnershipPolicy,
    videos: Mutex<Vec<Video>>,
    playlists: Mutex<Vec<Playlist>>,
}

impl LibraryService {
    /// Load both collections from `store`
    pub fn open(
        store: LibraryStore,
        media: MediaStorage,
        policy: OwnershipPolicy,
    ) -> Result<Self, LibraryError> {
        let (videos, playlists) = store.load()?;
        info!(
            videos = videos.len(),
            playlists = playlists.len(),
            mode = %policy.mode(),
            "Library loaded"
        );

        Ok(Self {
            store,
            media,
            policy,
            videos: Mutex::new(videos),
            playlists: Mutex::new(playlists),
        })
    }

    pub fn media(&self) -> &MediaStorage {
        &self.media
    }

    // ------------------------------------------------------------------
    // Videos
    // ------------------------------------------------------------------

    /// Videos the actor can see, in insertion order
    pub async fn list_videos(&self, actor: &UserId) -> Vec<Video> {
        self.videos
            .lock()
            .await
            .iter()
            .filter(|v| self.policy.visible(actor, *v))
            .cloned()
            .collect()
    }

    /// Record a downloaded file as a new video owned by the actor
    ///
    /// The file must already exist in the media storage area. A filename
    /// already held by any record, whoever owns it, is rejected.
    pub async fn add_video(&self, actor: &UserId, details: NewVideo) -> Result<Video, LibraryError> {
        let mut videos = self.videos.lock().await;
        if videos.iter().any(|v| v.filename == details.filename) {
            return Err(LibraryError::DuplicateFilename(details.filename));
        }

        let video = Video::new(actor.clone(), details);
        let mut next = videos.clone();
        next.push(video.clone());
        self.store.persist_videos(&next)?;
        *videos = next;

        info!(video_id = %video.id, owner = %actor, filename = %video.filename, "Added video");
        Ok(video)
    }

    /// Delete a video, its file, and every playlist reference to it
    pub async fn delete_video(&self, actor: &UserId, video_id: &VideoId) -> Result<(), LibraryError> {
        let mut videos = self.videos.lock().await;

        let Some(video) = videos
            .iter()
            .find(|v| &v.id == video_id && self.policy.mutable(actor, *v))
            .cloned()
        else {
            debug!(video_id = %video_id, actor = %actor, "Delete of invisible video ignored");
            return Ok(());
        };

        let mut playlists = self.playlists.lock().await;

        self.remove_media_file(&video).await;

        let next: Vec<Video> = videos.iter().filter(|v| &v.id != video_id).cloned().collect();
        self.store.persist_videos(&next)?;
        *videos = next;

        let mut next_playlists = playlists.clone();
        let mut pruned = 0;
        for playlist in &mut next_playlists {
            if playlist.remove_song(video_id) {
                pruned += 1;
            }
        }
        self.store.persist_playlists(&next_playlists)?;
        *playlists = next_playlists;

        info!(video_id = %video_id, actor = %actor, pruned_from = pruned, "Deleted video");
        Ok(())
    }

    /// Path of a visible video's file, for streaming
    pub async fn media_path(&self, actor: &UserId, video_id: &VideoId) -> Result<PathBuf, LibraryError> {
        let videos = self.videos.lock().await;
        let video = videos
            .iter()
            .find(|v| &v.id == video_id && self.policy.visible(actor, *v))
            .ok_or_else(|| LibraryError::not_found("Video", video_id))?;

        Ok(self.media.path_for(&video.filename)?)
    }

    // ------------------------------------------------------------------
    // Playlists
    // ------------------------------------------------------------------

    /// Playlists the actor can see, in creation order
    pub async fn list_playlists(&self, actor: &UserId) -> Vec<Playlist> {
        self.playlists
            .lock()
            .await
            .iter()
            .filter(|p| self.policy.visible(actor, *p))
            .cloned()
            .collect()
    }

    /// A single visible playlist
    pub async fn get_playlist(&self, actor: &UserId, playlist_id: &PlaylistId) -> Option<Playlist> {
        self.playlists
            .lock()
            .await
            .iter()
            .find(|p| &p.id == playlist_id && self.policy.visible(actor, *p))
            .cloned()
    }

    /// Create an empty playlist owned by the actor
    pub async fn create_playlist(&self, actor: &UserId, name: &str) -> Result<Playlist, LibraryError> {
        if name.trim().is_empty() {
            return Err(LibraryError::InvalidName(name.to_string()));
        }

        let playlist = Playlist::new(actor.clone(), name);

        let mut playlists = self.playlists.lock().await;
        let mut next = playlists.clone();
        next.push(playlist.clone());
        self.store.persist_playlists(&next)?;
        *playlists = next;

        info!(playlist_id = %playlist.id, owner = %actor, "Created playlist");
        Ok(playlist)
    }

    /// Rename a playlist. Any name is accepted, including an empty one.
    pub async fn rename_playlist(
        &self,
        actor: &UserId,
        playlist_id: &PlaylistId,
        new_name: &str,
    ) -> Result<(), LibraryError> {
        if new_name.trim().is_empty() {
            debug!(playlist_id = %playlist_id, "Renaming playlist to a blank name");
        }

        self.update_playlist(actor, playlist_id, |p| {
            p.name = new_name.to_string();
            true
        })
        .await
    }

    /// Delete a playlist the actor owns
    pub async fn delete_playlist(&self, actor: &UserId, playlist_id: &PlaylistId) -> Result<(), LibraryError> {
        let mut playlists = self.playlists.lock().await;

        if !playlists
            .iter()
            .any(|p| &p.id == playlist_id && self.policy.mutable(actor, p))
        {
            debug!(playlist_id = %playlist_id, actor = %actor, "Delete of invisible playlist ignored");
            return Ok(());
        }

        let next: Vec<Playlist> = playlists
            .iter()
            .filter(|p| &p.id != playlist_id)
            .cloned()
            .collect();
        self.store.persist_playlists(&next)?;
        *playlists = next;

        info!(playlist_id = %playlist_id, actor = %actor, "Deleted playlist");
        Ok(())
    }

    /// Append a video to a playlist unless it is already there
    ///
    /// The video id is not checked against the library.
    pub async fn add_song(
        &self,
        actor: &UserId,
        playlist_id: &PlaylistId,
        video_id: &VideoId,
    ) -> Result<(), LibraryError> {
        self.update_playlist(actor, playlist_id, |p| p.push_song(video_id.clone()))
            .await
    }

    /// Visible videos that belong to a playlist, in library order
    pub async fn playlist_videos(
        &self,
        actor: &UserId,
        playlist_id: &PlaylistId,
    ) -> Result<Vec<Video>, LibraryError> {
        let videos = self.videos.lock().await;
        let playlists = self.playlists.lock().await;

        let playlist = playlists
            .iter()
            .find(|p| &p.id == playlist_id && self.policy.visible(actor, *p))
            .ok_or_else(|| LibraryError::not_found("Playlist", playlist_id))?;

        Ok(videos
            .iter()
            .filter(|v| playlist.contains(&v.id) && self.policy.visible(actor, *v))
            .cloned()
            .collect())
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Remove everything `owner` owns: videos (with files) and playlists
    ///
    /// Deleted video ids are pruned from every remaining playlist.
    pub async fn purge_owner(&self, owner: &UserId) -> Result<(), LibraryError> {
        let mut videos = self.videos.lock().await;
        let mut playlists = self.playlists.lock().await;

        let (owned, kept): (Vec<Video>, Vec<Video>) = videos
            .iter()
            .cloned()
            .partition(|v| v.owner_id.as_ref() == Some(owner));

        for video in &owned {
            self.remove_media_file(video).await;
        }
        self.store.persist_videos(&kept)?;
        *videos = kept;

        let mut next_playlists: Vec<Playlist> = playlists
            .iter()
            .filter(|p| p.owner_id.as_ref() != Some(owner))
            .cloned()
            .collect();
        for playlist in &mut next_playlists {
            for video in &owned {
                playlist.remove_song(&video.id);
            }
        }
        let removed_playlists = playlists.len() - next_playlists.len();
        self.store.persist_playlists(&next_playlists)?;
        *playlists = next_playlists;

        info!(
            owner = %owner,
            videos = owned.len(),
            playlists = removed_playlists,
            "Purged owned content"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Apply `change` to a playlist the actor may modify; persist if it reports a change
    async fn update_playlist<F>(
        &self,
        actor: &UserId,
        playlist_id: &PlaylistId,
        change: F,
    ) -> Result<(), LibraryError>
    where
        F: FnOnce(&mut Playlist) -> bool,
    {
        let mut playlists = self.playlists.lock().await;
        let mut next = playlists.clone();

        let Some(playlist) = next
            .iter_mut()
            .find(|p| &p.id == playlist_id && self.policy.mutable(actor, &**p))
        else {
            debug!(playlist_id = %playlist_id, actor = %actor, "Update of invisible playlist ignored");
            return Ok(());
        };

        if change(playlist) {
            self.store.persist_playlists(&next)?;
            *playlists = next;
            debug!(playlist_id = %playlist_id, "Updated playlist");
        }

        Ok(())
    }

    /// Best-effort removal of a video's backing file
    async fn remove_media_file(&self, video: &Video) {
        match self.media.remove(&video.filename).await {
            Ok(true) => debug!(filename = %video.filename, "Removed media file"),
            Ok(false) => debug!(filename = %video.filename, "Media file already gone"),
            Err(e) => warn!(
                video_id = %video.id,
                filename = %video.filename,
                error = %e,
                "Failed to remove media file"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_library(temp: &TempDir, policy: OwnershipPolicy) -> LibraryService {
        let store = LibraryStore::open(temp.path().join("data")).unwrap();
        let media = MediaStorage::new(temp.path().join("media"));
        LibraryService::open(store, media, policy).unwrap()
    }

    fn clip(filename: &str) -> NewVideo {
        NewVideo {
            title: filename.trim_end_matches(".mp4").to_string(),
            thumbnail_url: None,
            filename: filename.to_string(),
            mime: "video/mp4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_playlist_rejects_blank_name() {
        let temp = TempDir::new().unwrap();
        let library = open_library(&temp, OwnershipPolicy::strict());
        let alice = UserId::new("alice");

        let result = library.create_playlist(&alice, "   ").await;
        assert!(matches!(result, Err(LibraryError::InvalidName(_))));
        assert!(library.list_playlists(&alice).await.is_empty());
    }

    #[tokio::test]
    async fn test_rename_accepts_empty_name() {
        let temp = TempDir::new().unwrap();
        let library = open_library(&temp, OwnershipPolicy::strict());
        let alice = UserId::new("alice");

        let playlist = library.create_playlist(&alice, "Road Trip").await.unwrap();
        library.rename_playlist(&alice, &playlist.id, "").await.unwrap();

        let renamed = library.get_playlist(&alice, &playlist.id).await.unwrap();
        assert_eq!(renamed.name, "");
    }

    #[tokio::test]
    async fn test_mutations_by_other_actor_are_noops() {
        let temp = TempDir::new().unwrap();
        let library = open_library(&temp, OwnershipPolicy::strict());
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        let playlist = library.create_playlist(&alice, "Mine").await.unwrap();
        let video = library.add_video(&alice, clip("a.mp4")).await.unwrap();

        library.rename_playlist(&bob, &playlist.id, "Stolen").await.unwrap();
        library.add_song(&bob, &playlist.id, &video.id).await.unwrap();
        library.delete_playlist(&bob, &playlist.id).await.unwrap();
        library.delete_video(&bob, &video.id).await.unwrap();

        let after = library.get_playlist(&alice, &playlist.id).await.unwrap();
        assert_eq!(after.name, "Mine");
        assert!(after.songs.is_empty());
        assert_eq!(library.list_videos(&alice).await.len(), 1);
    }

    #[tokio::test]
    async fn test_media_path_hidden_from_others() {
        let temp = TempDir::new().unwrap();
        let library = open_library(&temp, OwnershipPolicy::strict());
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        let video = library.add_video(&alice, clip("a.mp4")).await.unwrap();

        let path = library.media_path(&alice, &video.id).await.unwrap();
        assert_eq!(path, temp.path().join("media").join("a.mp4"));

        let result = library.media_path(&bob, &video.id).await;
        assert!(matches!(result, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_add_song_does_not_validate_video() {
        let temp = TempDir::new().unwrap();
        let library = open_library(&temp, OwnershipPolicy::strict());
        let alice = UserId::new("alice");

        let playlist = library.create_playlist(&alice, "Mix").await.unwrap();
        let ghost = VideoId::new("does-not-exist");
        library.add_song(&alice, &playlist.id, &ghost).await.unwrap();

        let stored = library.get_playlist(&alice, &playlist.id).await.unwrap();
        assert_eq!(stored.songs, vec![ghost]);
        // Unresolvable ids are skipped when listing
        assert!(library.playlist_videos(&alice, &playlist.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_owner() {
        let temp = TempDir::new().unwrap();
        let library = open_library(&temp, OwnershipPolicy::strict());
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        let media_dir = temp.path().join("media");
        tokio::fs::create_dir_all(&media_dir).await.unwrap();
        tokio::fs::write(media_dir.join("a.mp4"), b"a").await.unwrap();

        let alice_video = library.add_video(&alice, clip("a.mp4")).await.unwrap();
        library.create_playlist(&alice, "Alice's").await.unwrap();
        let bob_playlist = library.create_playlist(&bob, "Bob's").await.unwrap();
        library.add_song(&bob, &bob_playlist.id, &alice_video.id).await.unwrap();

        library.purge_owner(&alice).await.unwrap();

        assert!(library.list_videos(&alice).await.is_empty());
        assert!(library.list_playlists(&alice).await.is_empty());
        assert!(!media_dir.join("a.mp4").exists());

        let bob_after = library.get_playlist(&bob, &bob_playlist.id).await.unwrap();
        assert!(bob_after.songs.is_empty());
    }
}
