use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::UserId;

/// A stored user profile.
///
/// The password is only ever held as a one-way hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub interests: String,
    /// Missing for profiles created before timestamps were recorded.
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub created_at: Option<OffsetDateTime>,
}

impl UserProfile {
    /// Returns true if `hash` matches the stored password hash.
    pub fn password_matches(&self, hash: &str) -> bool {
        self.password_hash == hash
    }
}

/// Fields required to create a profile. The store assigns the ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserProfile {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub interests: String,
}

impl NewUserProfile {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        interests: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            interests: interests.into(),
        }
    }
}
