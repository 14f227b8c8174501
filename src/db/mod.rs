//! Person storage.
//!
//! The [`Backend`] trait is what the handlers see. [`SqliteBackend`] is the
//! sqlx implementation used by the server binary and the tests.

mod person;
mod repository;
mod schema;

pub use person::Person;
pub use repository::SqliteBackend;
pub use schema::MIGRATIONS;

use async_trait::async_trait;
use thiserror::Error;

use crate::id::Identifier;

/// Backend errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No person matches.
    #[error("person not found")]
    NotFound,

    /// Another person already holds the username.
    #[error("username is already in use")]
    UsernameInUse,

    /// The database failed.
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for BackendError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => BackendError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                BackendError::UsernameInUse
            }
            other => BackendError::Database(other.to_string()),
        }
    }
}

/// Persists person records.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Look up a person by username (case-insensitive).
    async fn user_by_username(&self, username: &str) -> Result<Person, BackendError>;

    /// Look up a person by id.
    async fn person(&self, id: &Identifier) -> Result<Person, BackendError>;

    /// Insert a new person. Fails with [`BackendError::UsernameInUse`] on a
    /// username conflict.
    async fn add_person(&self, person: &Person) -> Result<(), BackendError>;

    /// Insert or update a person by id.
    async fn upsert_person(&self, person: &Person) -> Result<(), BackendError>;
}
