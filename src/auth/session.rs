//! Session lifecycle management.
//!
//! A session moves from absent to active on login, and from active to
//! expired (its deadline passes) or revoked (logout, or evicted by the
//! store's per-user cap). Only active sessions validate.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::id::{Identifier, IdentifierError};
use crate::store::{SessionStore, StoreError};

/// Default session duration (365 days).
pub const DEFAULT_SESSION_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Default per-user session cap.
pub const DEFAULT_MAX_SESSIONS: usize = 100;

/// Session-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session is missing, expired, revoked, or its identifier is malformed.
    #[error("invalid session")]
    Invalid,

    /// A new session identifier could not be generated.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// The session store failed.
    #[error(transparent)]
    Store(StoreError),

    /// The configured lifetime cannot be represented as an expiry time.
    #[error("session duration out of range: {0:?}")]
    DurationOutOfRange(Duration),
}

impl SessionError {
    /// True when the request simply has no valid session.
    pub fn is_invalid(&self) -> bool {
        matches!(self, SessionError::Invalid)
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => SessionError::Invalid,
            other => SessionError::Store(other),
        }
    }
}

/// Server-side session record binding a session id to a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Person this session authenticates.
    pub user_id: Identifier,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session stops validating.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session record starting at `created_at`.
    ///
    /// Fails when `created_at + duration` is not a representable time.
    pub fn new(
        user_id: Identifier,
        created_at: DateTime<Utc>,
        duration: Duration,
    ) -> Result<Self, SessionError> {
        let expires_at = chrono::Duration::from_std(duration)
            .ok()
            .and_then(|duration| created_at.checked_add_signed(duration))
            .ok_or(SessionError::DurationOutOfRange(duration))?;

        Ok(Self {
            user_id,
            created_at,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against a given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, if any.
    pub fn remaining_time(&self) -> Option<chrono::Duration> {
        let remaining = self.expires_at - Utc::now();
        if remaining > chrono::Duration::zero() {
            Some(remaining)
        } else {
            None
        }
    }
}

/// Creates, validates and revokes sessions against a [`SessionStore`].
///
/// The manager holds no mutable state; all coordination happens in the store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    duration: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager issuing sessions that last `duration`.
    pub fn new(store: Arc<dyn SessionStore>, duration: Duration) -> Self {
        Self { store, duration }
    }

    /// Lifetime applied to every new session.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Mint and persist a new session for a person.
    pub async fn create_session(
        &self,
        user_id: Identifier,
    ) -> Result<(Identifier, Session), SessionError> {
        let session_id = Identifier::new()?;
        let session = Session::new(user_id, Utc::now(), self.duration)?;

        self.store
            .set_session(&session_id, &session, self.duration)
            .await
            .map_err(SessionError::Store)?;

        info!(user_id = %user_id, "Session created");
        Ok((session_id, session))
    }

    /// Resolve a session id to its active session. Never writes to the store.
    pub async fn validate(&self, session_id: &Identifier) -> Result<Session, SessionError> {
        let session = self.store.get_session(session_id).await?;
        if session.is_expired() {
            debug!("Stored session is past its expiry");
            return Err(SessionError::Invalid);
        }
        Ok(session)
    }

    /// Validate the text form of a session id, as found in a cookie.
    ///
    /// Malformed text is reported as [`SessionError::Invalid`], the same as a
    /// missing session.
    pub async fn validate_cookie(
        &self,
        value: &str,
    ) -> Result<(Identifier, Session), SessionError> {
        let session_id = Identifier::parse(value).map_err(|_| SessionError::Invalid)?;
        let session = self.validate(&session_id).await?;
        Ok((session_id, session))
    }

    /// Delete a session. Revoking an unknown session succeeds.
    pub async fn revoke(&self, session_id: &Identifier) -> Result<(), SessionError> {
        match self.store.delete_session(session_id).await {
            Ok(()) | Err(StoreError::NotFound) => {
                debug!("Session revoked");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to revoke session");
                Err(SessionError::Store(e))
            }
        }
    }
}
