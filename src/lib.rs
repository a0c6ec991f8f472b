//! vidshelf - personal video library
//!
//! Downloads videos from a URL into a local media directory and lets up to
//! three registered users organize them into playlists. State lives in flat
//! JSON files that are rewritten whole on every change.
//!
//! # Ownership
//!
//! Every video and playlist records the user who created it. All library
//! operations take the acting user and consult an [`OwnershipPolicy`]:
//! in strict mode a user sees only their own records, in legacy-open mode
//! records without an owner are shared with everyone.
//!
//! # Modules
//!
//! - `adapters`: Media download backends (yt-dlp)
//! - `core`: JSON file persistence primitives
//! - `domain`: Data structures (User, Video, Playlist)
//! - `library`: Store, ownership policy and the library service
//! - `users`: Capped user directory and password hashing
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! vidshelf -u alice -p secret register
//! vidshelf -u alice -p secret fetch https://www.youtube.com/watch?v=...
//! vidshelf -u alice -p secret playlist create "Road Trip"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;
pub mod users;

// Re-export main types at crate root for convenience
pub use adapters::{FetchError, FetchedMedia, MediaFetcher, YtDlpFetcher};
pub use domain::{NewVideo, Playlist, PlaylistId, User, UserId, Video, VideoId};
pub use library::{
    LibraryError, LibraryService, LibraryStore, MediaStorage, OwnershipMode, OwnershipPolicy,
};
pub use users::{DirectoryError, UserDirectory, MAX_USERS};
