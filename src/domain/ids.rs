//! Opaque identifiers for users, videos and playlists.
//!
//! Ids are stored as strings so that records written by older versions of
//! the library (which used bare UUID strings) load unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing id string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random id
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the raw string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

opaque_id!(
    /// Registered user identifier
    UserId
);

opaque_id!(
    /// Stored video identifier
    VideoId
);

opaque_id!(
    /// Playlist identifier
    PlaylistId
);
