//! Authentication module.
//!
//! This module provides password hashing, the registration policy,
//! login credential checks and the session lifecycle.

mod login;
mod password;
mod registration;
mod session;
pub mod validation;

pub use login::{authenticate, LoginError};
pub use password::{
    dummy_verify, hash_password, hash_password_blocking, verify_password,
    verify_password_blocking, PasswordError,
};
pub use registration::{register, RegistrationError, RegistrationRequest};
pub use session::{
    Session, SessionError, SessionManager, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_DURATION_SECS,
};
pub use validation::{validate_registration, FieldErrors};
