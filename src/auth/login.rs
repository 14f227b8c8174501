//! Credential checks for login.

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{dummy_verify, PasswordError};
use crate::db::{Backend, BackendError, Person};

/// Login errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Unknown username or wrong password. Callers must not tell them apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backend failed.
    #[error(transparent)]
    Backend(BackendError),
}

/// Check a username and password, recording the login on success.
///
/// An unknown username still costs one password verification so both
/// failure paths take comparable time.
pub async fn authenticate(
    backend: &dyn Backend,
    username: &str,
    password: &str,
) -> Result<Person, LoginError> {
    let mut person = match backend.user_by_username(username).await {
        Ok(person) => person,
        Err(BackendError::NotFound) => {
            dummy_verify(password.to_string()).await;
            info!(username = %username, "Login failed: unknown user");
            return Err(LoginError::InvalidCredentials);
        }
        Err(e) => return Err(LoginError::Backend(e)),
    };

    match person.check_password(password).await {
        Ok(()) => {}
        Err(PasswordError::Mismatch) => {
            info!(username = %username, "Login failed: wrong password");
            return Err(LoginError::InvalidCredentials);
        }
        Err(e) => {
            warn!(username = %username, error = %e, "Login failed: stored hash unusable");
            return Err(LoginError::InvalidCredentials);
        }
    }

    person.touch();
    backend
        .upsert_person(&person)
        .await
        .map_err(LoginError::Backend)?;

    Ok(person)
}
