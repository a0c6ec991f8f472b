//! Registered accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// A registered user with a salted password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Login name as typed at signup (matched case-insensitively)
    pub username: String,

    /// Argon2 PHC string
    pub password_hash: String,

    /// When the account was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new user record
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Some(Utc::now()),
        }
    }

    /// Case-insensitive username comparison
    pub fn has_username(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.to_lowercase()
    }
}
