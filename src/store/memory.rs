//! In-process session store.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{SessionStore, StoreError};
use crate::auth::Session;
use crate::id::Identifier;

#[derive(Debug)]
struct Entry {
    session: Session,
    deadline: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<Identifier, Entry>,
    /// Session ids per user, oldest first.
    by_user: HashMap<Identifier, VecDeque<Identifier>>,
}

impl Inner {
    fn remove(&mut self, session_id: &Identifier) -> Option<Entry> {
        let entry = self.sessions.remove(session_id)?;
        let user_id = entry.session.user_id;
        if let Some(ids) = self.by_user.get_mut(&user_id) {
            ids.retain(|id| id != session_id);
            if ids.is_empty() {
                self.by_user.remove(&user_id);
            }
        }
        Some(entry)
    }

    /// Drop one user's expired sessions so they do not count toward the cap.
    fn purge_user_expired(&mut self, user_id: &Identifier, now: Instant) {
        let expired: Vec<Identifier> = match self.by_user.get(user_id) {
            Some(ids) => ids
                .iter()
                .filter(|id| {
                    self.sessions
                        .get(id)
                        .map_or(true, |entry| entry.deadline <= now)
                })
                .copied()
                .collect(),
            None => return,
        };

        for id in &expired {
            self.remove(id);
        }
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<Identifier> = self
            .sessions
            .iter()
            .filter(|(_, entry)| entry.deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            self.remove(id);
        }
        expired.len()
    }
}

/// Session store held in process memory.
///
/// Entries expire after their TTL. Each user keeps at most `max_sessions`
/// live sessions; storing one more evicts that user's oldest.
#[derive(Debug)]
pub struct MemorySessionStore {
    inner: Mutex<Inner>,
    max_sessions: usize,
}

impl MemorySessionStore {
    /// Create a store with a per-user session cap.
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Per-user session cap.
    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Number of stored sessions, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of live sessions held for a user.
    pub async fn user_session_count(&self, user_id: &Identifier) -> usize {
        let now = Instant::now();
        let inner = self.inner.lock().await;
        inner
            .by_user
            .get(user_id)
            .map(|ids| {
                ids.iter()
                    .filter(|id| {
                        inner
                            .sessions
                            .get(id)
                            .is_some_and(|entry| entry.deadline > now)
                    })
                    .count()
            })
            .unwrap_or(0)
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let removed = self.inner.lock().await.purge_expired(Instant::now());
        if removed > 0 {
            debug!(removed, "Purged expired sessions");
        }
        removed
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set_session(
        &self,
        session_id: &Identifier,
        session: &Session,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        let deadline = now
            .checked_add(ttl)
            .ok_or(StoreError::TtlOutOfRange(ttl))?;
        let user_id = session.user_id;

        let mut inner = self.inner.lock().await;
        inner.purge_user_expired(&user_id, now);
        inner.remove(session_id);

        inner.sessions.insert(
            *session_id,
            Entry {
                session: session.clone(),
                deadline,
            },
        );
        inner.by_user.entry(user_id).or_default().push_back(*session_id);

        loop {
            let oldest = match inner.by_user.get(&user_id) {
                Some(ids) if ids.len() > self.max_sessions => ids.front().copied(),
                _ => None,
            };
            let Some(oldest) = oldest else { break };
            inner.remove(&oldest);
            debug!(
                user_id = %user_id,
                evicted = %oldest,
                "Evicted oldest session over per-user cap"
            );
        }

        Ok(())
    }

    async fn get_session(&self, session_id: &Identifier) -> Result<Session, StoreError> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;

        match inner.sessions.get(session_id) {
            Some(entry) if entry.deadline > now => Ok(entry.session.clone()),
            Some(_) => {
                inner.remove(session_id);
                Err(StoreError::NotFound)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_session(&self, session_id: &Identifier) -> Result<(), StoreError> {
        self.inner.lock().await.remove(session_id);
        Ok(())
    }
}
