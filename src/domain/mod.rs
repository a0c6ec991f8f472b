//! Domain types for the video library.
//!
//! - Ids: opaque string tokens for users, videos and playlists
//! - Video: a downloaded media file and its metadata
//! - Playlist: an ordered set of video ids
//! - User: a registered account

pub mod ids;
pub mod playlist;
pub mod user;
pub mod video;

pub use ids::{PlaylistId, UserId, VideoId};
pub use playlist::Playlist;
pub use user::User;
pub use video::{mime_for_filename, NewVideo, Video, DEFAULT_MIME};

/// A record that may belong to a user
pub trait Owned {
    /// Owning user, or `None` for legacy shared records
    fn owner_id(&self) -> Option<&UserId>;
}
