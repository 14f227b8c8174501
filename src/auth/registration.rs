//! Account registration.

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::validation::{validate_registration, FieldErrors, USERNAME_IN_USE};
use crate::auth::PasswordError;
use crate::db::{Backend, BackendError, Person};
use crate::id::{Identifier, IdentifierError};

/// Registration-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Policy violations or a username conflict, keyed by field.
    #[error(transparent)]
    Validation(#[from] FieldErrors),

    /// A person identifier could not be generated.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// The backend failed.
    #[error(transparent)]
    Backend(BackendError),
}

/// Registration form data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
        }
    }
}

/// Register a new person.
///
/// 1. Validates the whole form; on failure the backend is never touched
/// 2. Generates the person's identifier
/// 3. Hashes the password
/// 4. Adds the person; a username conflict comes back as a `username`
///    field error, shaped like the policy failures
pub async fn register(
    backend: &dyn Backend,
    request: RegistrationRequest,
) -> Result<Person, RegistrationError> {
    validate_registration(&request.username, &request.password)?;

    let mut person = Person::new(Identifier::new()?, request.username, request.email);
    person.set_password(&request.password).await?;

    match backend.add_person(&person).await {
        Ok(()) => {
            info!(person_id = %person.id, username = %person.username, "Person registered");
            Ok(person)
        }
        Err(BackendError::UsernameInUse) => {
            warn!(username = %person.username, "Registration rejected: username in use");
            Err(FieldErrors::single("username", USERNAME_IN_USE).into())
        }
        Err(e) => Err(RegistrationError::Backend(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::validation::{PASSWORD_TOO_SHORT, USERNAME_TOO_SHORT};
    use crate::db::SqliteBackend;

    #[tokio::test]
    async fn test_register_success() {
        let backend = SqliteBackend::open_in_memory().await.unwrap();
        let request = RegistrationRequest::new("alice123", "correcthorsebattery", "a@x.com");

        let person = register(&backend, request).await.unwrap();

        let stored = backend.user_by_username("alice123").await.unwrap();
        assert_eq!(stored.id, person.id);
        assert_eq!(stored.email, "a@x.com");
        assert!(stored.check_password("correcthorsebattery").await.is_ok());
    }

    #[tokio::test]
    async fn test_register_invalid_reports_all_fields() {
        let backend = SqliteBackend::open_in_memory().await.unwrap();
        let request = RegistrationRequest::new("ab", "short", "");

        let err = register(&backend, request).await.unwrap_err();
        let RegistrationError::Validation(fields) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(fields.get("username"), Some(USERNAME_TOO_SHORT));
        assert_eq!(fields.get("password"), Some(PASSWORD_TOO_SHORT));

        assert_eq!(
            backend.user_by_username("ab").await,
            Err(BackendError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_is_field_error() {
        let backend = SqliteBackend::open_in_memory().await.unwrap();
        register(
            &backend,
            RegistrationRequest::new("alice123", "correcthorsebattery", ""),
        )
        .await
        .unwrap();

        for username in ["alice123", "ALICE123"] {
            let err = register(
                &backend,
                RegistrationRequest::new(username, "anotherpassword", ""),
            )
            .await
            .unwrap_err();

            assert_eq!(
                err,
                RegistrationError::Validation(FieldErrors::single("username", USERNAME_IN_USE))
            );
        }
    }
}
