//! floodwatch-auth - session and credential service for Floodwatch.
//!
//! People sign in with a username and password and receive an HTTP-only
//! session cookie. Each request is resolved to a live session through a
//! [`store::SessionStore`], and person records live behind a
//! [`db::Backend`].
//!
//! ```
//! use floodwatch_auth::Identifier;
//!
//! let id = Identifier::new().unwrap();
//! let text = id.to_string();
//! assert_eq!(text.len(), 22);
//! assert_eq!(Identifier::parse(&text).unwrap(), id);
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod id;
pub mod logging;
pub mod store;
pub mod web;

pub use auth::{
    authenticate, hash_password, register, verify_password, FieldErrors, LoginError,
    PasswordError, RegistrationError, RegistrationRequest, Session, SessionError, SessionManager,
};
pub use config::Config;
pub use db::{Backend, BackendError, Person, SqliteBackend};
pub use error::{Error, ErrorKind, Result};
pub use id::{Identifier, IdentifierError};
pub use store::{MemorySessionStore, SessionStore, StoreError};
pub use web::{create_router, AppState, WebServer};
