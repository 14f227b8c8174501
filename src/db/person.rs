//! Person model.
//!
//! A person is the identity anchor: every session points at one.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::{hash_password_blocking, verify_password_blocking, PasswordError};
use crate::id::Identifier;

/// Registered user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    /// Unique identifier.
    pub id: Identifier,
    /// Unique username (unique case-insensitively).
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Argon2 PHC hash. Never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    /// Last successful login.
    pub last_seen: DateTime<Utc>,
}

impl Person {
    /// Create a person without a password set.
    pub fn new(id: Identifier, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            password: String::new(),
            last_seen: Utc::now(),
        }
    }

    /// Hash `password` and store the hash on this person.
    pub async fn set_password(&mut self, password: &str) -> Result<(), PasswordError> {
        self.password = hash_password_blocking(password.to_string()).await?;
        Ok(())
    }

    /// Check `password` against the stored hash.
    pub async fn check_password(&self, password: &str) -> Result<(), PasswordError> {
        verify_password_blocking(password.to_string(), self.password.clone()).await
    }

    /// Record a login now.
    pub fn touch(&mut self) {
        self.last_seen = Utc::now();
    }
}
