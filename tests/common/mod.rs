//! Test helpers for the HTTP integration tests.
//!
//! Builds the full router over an in-memory SQLite backend and a session
//! store, and provides store and backend doubles for counting and failure
//! injection.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;

use floodwatch_auth::auth::Session;
use floodwatch_auth::config::Config;
use floodwatch_auth::db::{Backend, BackendError, Person};
use floodwatch_auth::store::{MemorySessionStore, SessionStore, StoreError};
use floodwatch_auth::web::{create_router, AppState, SESSION_COOKIE_NAME};
use floodwatch_auth::{Identifier, SqliteBackend};

pub const ALICE: &str = "alice123";
pub const ALICE_PASSWORD: &str = "correcthorsebattery";

/// Create a test configuration with a small session cap.
pub fn create_test_config(max_sessions: usize) -> Config {
    let mut config = Config::default();
    config.server.port = 0;
    config.session.duration_secs = 3600;
    config.session.max_sessions = max_sessions;
    config
}

/// Create a test server over `store`.
pub async fn create_test_server_with(
    config: &Config,
    store: Arc<dyn SessionStore>,
) -> (TestServer, Arc<SqliteBackend>) {
    let backend = Arc::new(
        SqliteBackend::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let app_state = Arc::new(AppState::new(config, backend.clone(), store));
    let router = create_router(app_state);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, backend)
}

/// Create a test server over `backend` and a fresh in-memory session store.
///
/// Returns the shared state so tests can create sessions directly.
pub fn create_test_app(backend: Arc<dyn Backend>) -> (TestServer, Arc<AppState>) {
    let config = create_test_config(3);
    let store = Arc::new(MemorySessionStore::new(config.session.max_sessions));
    let app_state = Arc::new(AppState::new(&config, backend, store));
    let server =
        TestServer::new(create_router(app_state.clone())).expect("Failed to create test server");

    (server, app_state)
}

/// Create a test server over a fresh in-memory session store.
pub async fn create_test_server() -> (TestServer, Arc<SqliteBackend>) {
    let config = create_test_config(3);
    let store = Arc::new(MemorySessionStore::new(config.session.max_sessions));
    create_test_server_with(&config, store).await
}

/// Register a person through the API, asserting success.
pub async fn register_person(server: &TestServer, username: &str, password: &str) {
    server
        .post("/api/register")
        .form(&[
            ("username", username),
            ("password", password),
            ("email", "a@x.com"),
        ])
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

/// Log in through the API and return the issued session cookie.
pub async fn login(server: &TestServer, username: &str, password: &str) -> Cookie<'static> {
    let response = server
        .post("/api/login")
        .form(&[("username", username), ("password", password)])
        .await;
    response.assert_status(StatusCode::NO_CONTENT);
    response.cookie(SESSION_COOKIE_NAME)
}

/// Cookie carrying an arbitrary session value.
pub fn session_cookie(value: impl Into<String>) -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE_NAME, value.into())
}

/// Memory store that counts every call made to it.
pub struct CountingStore {
    inner: MemorySessionStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: MemorySessionStore::new(max_sessions),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for CountingStore {
    async fn set_session(
        &self,
        session_id: &Identifier,
        session: &Session,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.record();
        self.inner.set_session(session_id, session, ttl).await
    }

    async fn get_session(&self, session_id: &Identifier) -> Result<Session, StoreError> {
        self.record();
        self.inner.get_session(session_id).await
    }

    async fn delete_session(&self, session_id: &Identifier) -> Result<(), StoreError> {
        self.record();
        self.inner.delete_session(session_id).await
    }
}

/// Store that is always unreachable.
pub struct UnavailableStore;

#[async_trait]
impl SessionStore for UnavailableStore {
    async fn set_session(
        &self,
        _session_id: &Identifier,
        _session: &Session,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get_session(&self, _session_id: &Identifier) -> Result<Session, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn delete_session(&self, _session_id: &Identifier) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Backend whose database always fails.
pub struct FailingBackend;

impl FailingBackend {
    fn error() -> BackendError {
        BackendError::Database("disk I/O error".to_string())
    }
}

#[async_trait]
impl Backend for FailingBackend {
    async fn user_by_username(&self, _username: &str) -> Result<Person, BackendError> {
        Err(Self::error())
    }

    async fn person(&self, _id: &Identifier) -> Result<Person, BackendError> {
        Err(Self::error())
    }

    async fn add_person(&self, _person: &Person) -> Result<(), BackendError> {
        Err(Self::error())
    }

    async fn upsert_person(&self, _person: &Person) -> Result<(), BackendError> {
        Err(Self::error())
    }
}
