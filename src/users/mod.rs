//! Account management: the capped user directory and password hashing.

pub mod directory;
pub mod password;

pub use directory::{DirectoryError, UserDirectory, MAX_USERS};
pub use password::{hash_password, verify_password};
