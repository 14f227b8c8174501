//! Middleware for Web API.

pub mod auth;

pub use auth::{require_session, resolve_session, session_auth, AuthContext, CurrentSession};
