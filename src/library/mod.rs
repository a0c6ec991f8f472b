//! The video library: storage, ownership rules and the service on top.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.vidshelf/
//! ├── .lock                  # held by the running process
//! ├── videos.json            # Video records, insertion order
//! ├── playlists.json         # Playlist records, creation order
//! ├── users.json             # Registered accounts
//! └── downloads/             # Media storage area
//!     └── <title>.mp4
//! ```

pub mod media;
pub mod policy;
pub mod service;
pub mod store;

pub use media::{MediaError, MediaStorage};
pub use policy::{OwnershipMode, OwnershipPolicy};
pub use service::{LibraryError, LibraryService};
pub use store::LibraryStore;
