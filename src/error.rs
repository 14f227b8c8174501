//! Error types for floodwatch-auth.

use thiserror::Error;

use crate::auth::{FieldErrors, LoginError, PasswordError, RegistrationError, SessionError};
use crate::db::BackendError;
use crate::id::IdentifierError;
use crate::store::StoreError;

/// Error categories, compared structurally to decide how to respond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// User-correctable, field-scoped input problem.
    Validation,
    /// Bad credentials.
    Authentication,
    /// Malformed identifier from a client.
    Format,
    /// Record absent from a store or backend.
    NotFound,
    /// Uniqueness conflict.
    Conflict,
    /// Session store failure.
    Store,
    /// Person backend failure.
    Backend,
    /// Any other server-side failure.
    Internal,
    /// Bad configuration.
    Config,
}

/// Common error type for floodwatch-auth.
#[derive(Error, Debug)]
pub enum Error {
    /// Field-scoped validation failure.
    #[error(transparent)]
    Validation(#[from] FieldErrors),

    /// Credentials rejected.
    #[error("authentication failed")]
    Authentication,

    /// Identifier generation or parsing failed.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Session store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Person backend failure.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Authentication => ErrorKind::Authentication,
            Error::Identifier(IdentifierError::Format) => ErrorKind::Format,
            Error::Identifier(IdentifierError::Generation(_)) => ErrorKind::Internal,
            Error::Password(PasswordError::Mismatch) => ErrorKind::Authentication,
            Error::Password(_) => ErrorKind::Internal,
            Error::Store(StoreError::NotFound) => ErrorKind::NotFound,
            Error::Store(_) => ErrorKind::Store,
            Error::Backend(BackendError::NotFound) => ErrorKind::NotFound,
            Error::Backend(BackendError::UsernameInUse) => ErrorKind::Conflict,
            Error::Backend(BackendError::Database(_)) => ErrorKind::Backend,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Internal,
        }
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Invalid => Error::Store(StoreError::NotFound),
            SessionError::Identifier(e) => Error::Identifier(e),
            SessionError::Store(e) => Error::Store(e),
            e @ SessionError::DurationOutOfRange(_) => Error::Config(e.to_string()),
        }
    }
}

impl From<LoginError> for Error {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials => Error::Authentication,
            LoginError::Backend(e) => Error::Backend(e),
        }
    }
}

impl From<RegistrationError> for Error {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(e) => Error::Validation(e),
            RegistrationError::Identifier(e) => Error::Identifier(e),
            RegistrationError::Password(e) => Error::Password(e),
            RegistrationError::Backend(e) => Error::Backend(e),
        }
    }
}

/// Result type alias for floodwatch-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            Error::from(FieldErrors::single("username", "bad")).kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::Authentication.kind(), ErrorKind::Authentication);
        assert_eq!(
            Error::from(IdentifierError::Format).kind(),
            ErrorKind::Format
        );
        assert_eq!(
            Error::from(IdentifierError::Generation("no entropy".into())).kind(),
            ErrorKind::Internal
        );
        assert_eq!(Error::from(StoreError::NotFound).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::from(StoreError::Unavailable("down".into())).kind(),
            ErrorKind::Store
        );
        assert_eq!(Error::from(BackendError::NotFound).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::from(BackendError::UsernameInUse).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            Error::from(BackendError::Database("locked".into())).kind(),
            ErrorKind::Backend
        );
        assert_eq!(Error::Config("bad".into()).kind(), ErrorKind::Config);
    }

    #[test]
    fn test_from_module_errors() {
        assert_eq!(
            Error::from(SessionError::Invalid).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::from(SessionError::DurationOutOfRange(std::time::Duration::MAX)).kind(),
            ErrorKind::Config
        );
        assert_eq!(
            Error::from(LoginError::InvalidCredentials).kind(),
            ErrorKind::Authentication
        );
        assert_eq!(
            Error::from(RegistrationError::Backend(BackendError::UsernameInUse)).kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::Config("missing url".into()).to_string(),
            "configuration error: missing url"
        );
        assert_eq!(
            Error::from(BackendError::Database("disk full".into())).to_string(),
            "database error: disk full"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
