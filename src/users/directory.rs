//! Capped user directory persisted to `users.json`.
//!
//! At most [`MAX_USERS`] accounts may exist. Usernames are unique ignoring
//! case; the casing typed at signup is kept as the canonical form.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::password::{hash_password, verify_password};
use crate::core::json_file::{load_json, write_json_atomic, StoreError};
use crate::domain::{User, UserId};

/// Maximum number of registered accounts
pub const MAX_USERS: usize = 3;

/// Errors from directory operations
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User limit reached ({limit} accounts)")]
    CapacityExceeded { limit: usize },

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("No such user: {0}")]
    NotFound(String),

    #[error("Wrong password")]
    BadCredential,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registered users, loaded at startup and rewritten on every change
pub struct UserDirectory {
    path: PathBuf,
    users: Mutex<Vec<User>>,
}

impl UserDirectory {
    /// Load the directory from `path` (a missing file means no users)
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DirectoryError> {
        let path = path.into();
        let users: Vec<User> = load_json(&path)?.unwrap_or_default();
        debug!(count = users.len(), path = %path.display(), "Loaded user directory");

        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }

    /// Register a new account and return its id
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, DirectoryError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DirectoryError::InvalidInput(
                "username must not be empty".to_string(),
            ));
        }

        let mut users = self.users.lock().await;

        if users.len() >= MAX_USERS {
            return Err(DirectoryError::CapacityExceeded { limit: MAX_USERS });
        }
        if users.iter().any(|u| u.has_username(username)) {
            return Err(DirectoryError::DuplicateUsername(username.to_string()));
        }

        let hash = hash_password(password).map_err(|e| DirectoryError::PasswordHash(e.to_string()))?;
        let user = User::new(username, hash);
        let id = user.id.clone();

        let mut next = users.clone();
        next.push(user);
        write_json_atomic(&self.path, &next)?;
        *users = next;

        info!(user_id = %id, username, "Registered user");
        Ok(id)
    }

    /// Check credentials; returns the user id and the stored username casing
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(UserId, String), DirectoryError> {
        let users = self.users.lock().await;

        let user = users
            .iter()
            .find(|u| u.has_username(username.trim()))
            .ok_or_else(|| DirectoryError::NotFound(username.to_string()))?;

        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok((user.id.clone(), user.username.clone())),
            Ok(false) => Err(DirectoryError::BadCredential),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                Err(DirectoryError::BadCredential)
            }
        }
    }

    /// Remove an account. Deleting an unknown id is not an error.
    pub async fn delete(&self, user_id: &UserId) -> Result<(), DirectoryError> {
        let mut users = self.users.lock().await;

        if !users.iter().any(|u| &u.id == user_id) {
            debug!(user_id = %user_id, "Delete of unknown user ignored");
            return Ok(());
        }

        let next: Vec<User> = users.iter().filter(|u| &u.id != user_id).cloned().collect();
        write_json_atomic(&self.path, &next)?;
        *users = next;

        info!(user_id = %user_id, "Deleted user");
        Ok(())
    }

    /// Look up a user by id
    pub async fn find(&self, user_id: &UserId) -> Option<User> {
        self.users.lock().await.iter().find(|u| &u.id == user_id).cloned()
    }

    /// All users in registration order
    pub async fn list(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }

    /// Number of registered users
    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    /// Check if no users are registered
    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_directory() -> (UserDirectory, TempDir) {
        let temp = TempDir::new().unwrap();
        let directory = UserDirectory::open(temp.path().join("users.json")).unwrap();
        (directory, temp)
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let (directory, _temp) = create_test_directory();

        let id = directory.register("Alice", "hunter2").await.unwrap();
        let (found, name) = directory.authenticate("alice", "hunter2").await.unwrap();

        assert_eq!(found, id);
        assert_eq!(name, "Alice");
    }

    #[tokio::test]
    async fn test_authenticate_failures() {
        let (directory, _temp) = create_test_directory();
        directory.register("alice", "hunter2").await.unwrap();

        let result = directory.authenticate("alice", "wrong").await;
        assert!(matches!(result, Err(DirectoryError::BadCredential)));

        let result = directory.authenticate("mallory", "hunter2").await;
        assert!(matches!(result, Err(DirectoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_username_rejected() {
        let (directory, _temp) = create_test_directory();
        let result = directory.register("   ", "pw").await;
        assert!(matches!(result, Err(DirectoryError::InvalidInput(_))));
        assert!(directory.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (directory, _temp) = create_test_directory();
        let id = directory.register("alice", "pw").await.unwrap();

        directory.delete(&id).await.unwrap();
        directory.delete(&id).await.unwrap();

        assert!(directory.find(&id).await.is_none());
        assert_eq!(directory.len().await, 0);
    }

    #[tokio::test]
    async fn test_changes_are_persisted() {
        let (directory, temp) = create_test_directory();
        let id = directory.register("alice", "pw").await.unwrap();

        let reopened = UserDirectory::open(temp.path().join("users.json")).unwrap();
        let user = reopened.find(&id).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "pw");
    }
}
