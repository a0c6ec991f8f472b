//! Persistence primitives shared by the library store and the user directory.
//!
//! This module contains:
//! - json_file: missing-tolerant JSON loads, atomic whole-file writes,
//!   and the data directory lock

pub mod json_file;

// Re-export commonly used types
pub use json_file::{load_json, write_json_atomic, DirLock, StoreError};
