//! Session store capability.
//!
//! Session records live outside the request handlers, in a store that
//! enforces the TTL and the per-user session cap. [`MemorySessionStore`] is
//! the in-process implementation.

mod memory;

pub use memory::MemorySessionStore;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::Session;
use crate::id::Identifier;

/// Session store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No session under this identifier, or it has expired.
    #[error("session not found")]
    NotFound,

    /// The store could not be reached or refused the operation.
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    /// The TTL cannot be represented as a deadline.
    #[error("session TTL out of range: {0:?}")]
    TtlOutOfRange(Duration),

    /// A stored record could not be encoded or decoded.
    #[error("session record serialization failed: {0}")]
    Serialization(String),
}

/// Persists session records with expiration.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a session under `session_id` for `ttl`.
    ///
    /// Evicts the owner's oldest sessions when the store's per-user cap
    /// would be exceeded.
    async fn set_session(
        &self,
        session_id: &Identifier,
        session: &Session,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Fetch a live session.
    async fn get_session(&self, session_id: &Identifier) -> Result<Session, StoreError>;

    /// Remove a session. Removing an absent session succeeds.
    async fn delete_session(&self, session_id: &Identifier) -> Result<(), StoreError>;
}
