//! Playlist CLI subcommands.

use anyhow::{Context, Result};
use clap::Subcommand;

use super::{print_videos, Session};
use crate::domain::{PlaylistId, VideoId};
use crate::library::LibraryError;

/// Playlist-related subcommands
#[derive(Subcommand, Debug)]
pub enum PlaylistCommands {
    /// List your playlists
    List,

    /// Create an empty playlist
    Create {
        /// Playlist name
        name: String,
    },

    /// Rename a playlist
    Rename {
        /// Playlist ID
        playlist_id: String,

        /// New name
        new_name: String,
    },

    /// Delete a playlist (the videos stay in the library)
    Delete {
        /// Playlist ID
        playlist_id: String,
    },

    /// Add a video to a playlist
    Add {
        /// Playlist ID
        playlist_id: String,

        /// Video ID
        video_id: String,
    },

    /// Show the videos in a playlist
    Show {
        /// Playlist ID
        playlist_id: String,
    },
}

/// Execute a playlist subcommand for the logged-in user
pub async fn execute(session: &Session, command: PlaylistCommands) -> Result<()> {
    let actor = &session.actor;
    let library = &session.library;

    match command {
        PlaylistCommands::List => {
            let playlists = library.list_playlists(actor).await;
            if playlists.is_empty() {
                println!("No playlists");
                return Ok(());
            }

            println!("{:<38} {:<30} {:>6}", "PLAYLIST ID", "NAME", "VIDEOS");
            println!("{}", "-".repeat(76));
            for playlist in playlists {
                println!(
                    "{:<38} {:<30} {:>6}",
                    playlist.id,
                    truncate(&playlist.name, 30),
                    playlist.songs.len()
                );
            }
        }
        PlaylistCommands::Create { name } => {
            let playlist = library.create_playlist(actor, &name).await?;
            println!("Created playlist {} ({})", playlist.name, playlist.id);
        }
        PlaylistCommands::Rename {
            playlist_id,
            new_name,
        } => {
            library
                .rename_playlist(actor, &PlaylistId::new(playlist_id), &new_name)
                .await?;
        }
        PlaylistCommands::Delete { playlist_id } => {
            library
                .delete_playlist(actor, &PlaylistId::new(playlist_id))
                .await?;
        }
        PlaylistCommands::Add {
            playlist_id,
            video_id,
        } => {
            library
                .add_song(actor, &PlaylistId::new(playlist_id), &VideoId::new(video_id))
                .await?;
        }
        PlaylistCommands::Show { playlist_id } => {
            let id = PlaylistId::new(playlist_id);
            let videos = match library.playlist_videos(actor, &id).await {
                Ok(videos) => videos,
                Err(LibraryError::NotFound { .. }) => anyhow::bail!("Playlist not found: {}", id),
                Err(e) => return Err(e).context("Failed to read playlist"),
            };

            if let Some(playlist) = library.get_playlist(actor, &id).await {
                println!("{}\n", playlist.name);
            }
            print_videos(&videos);
        }
    }

    Ok(())
}

/// Shorten a string for table output
pub(super) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Road Trip", 30), "Road Trip");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }
}
