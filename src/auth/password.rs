//! Password hashing and verification.
//!
//! Uses Argon2id. Hashes are PHC strings carrying their own salt and
//! parameters, so verification keeps working if the cost is retuned.

use std::sync::OnceLock;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;
use thiserror::Error;

/// Argon2 memory cost in KiB (19 MiB).
pub const ARGON2_M_COST: u32 = 19 * 1024;

/// Argon2 time cost (iterations).
pub const ARGON2_T_COST: u32 = 2;

/// Argon2 parallelism.
pub const ARGON2_P_COST: u32 = 1;

/// Password-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Stored hash is not a valid PHC string.
    #[error("invalid password hash format")]
    InvalidHash,

    /// The password does not match the stored hash.
    #[error("password verification failed")]
    Mismatch,
}

/// Create the Argon2id hasher.
///
/// Parameters:
/// - Memory cost: 19 MiB
/// - Time cost: 2 iterations
/// - Parallelism: 1 lane
fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hash a password using Argon2id with a fresh random salt.
///
/// # Examples
///
/// ```
/// use floodwatch_auth::auth::hash_password;
///
/// let hash = hash_password("correcthorsebattery").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// # Examples
///
/// ```
/// use floodwatch_auth::auth::{hash_password, verify_password};
///
/// let hash = hash_password("correcthorsebattery").unwrap();
/// assert!(verify_password("correcthorsebattery", &hash).is_ok());
/// assert!(verify_password("wrong", &hash).is_err());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    // Parameters come from the parsed hash.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::Mismatch)
}

/// Hash a password on the blocking thread pool.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
}

/// Verify a password on the blocking thread pool.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<(), PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("floodwatch-dummy-password").ok())
        .as_deref()
}

/// Spend the same work as a real verification when there is no user to check.
///
/// Always fails with [`PasswordError::Mismatch`].
pub async fn dummy_verify(password: String) -> PasswordError {
    let result = tokio::task::spawn_blocking(move || match dummy_hash() {
        Some(hash) => verify_password(&password, hash),
        None => Err(PasswordError::Mismatch),
    })
    .await;

    match result {
        Ok(Err(e)) => e,
        _ => PasswordError::Mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$"));
        assert!(hash.contains("m=19456"));
        assert!(hash.contains("t=2"));
        assert!(hash.contains("p=1"));
    }

    #[test]
    fn test_hash_password_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hash).is_ok());
    }

    #[test]
    fn test_verify_password_wrong() {
        let hash = hash_password("correct_password").unwrap();

        assert_eq!(
            verify_password("correct_passwore", &hash),
            Err(PasswordError::Mismatch)
        );
        assert_eq!(verify_password("", &hash), Err(PasswordError::Mismatch));
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert_eq!(
            verify_password("any_password", "not_a_valid_hash"),
            Err(PasswordError::InvalidHash)
        );
    }

    #[test]
    fn test_password_with_unicode_and_empty() {
        for password in ["パスワード123", "p@$$w0rd!#$%^&*()", ""] {
            let hash = hash_password(password).unwrap();
            assert!(verify_password(password, &hash).is_ok());
        }
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hash = hash_password_blocking("correcthorsebattery".to_string())
            .await
            .unwrap();

        assert!(
            verify_password_blocking("correcthorsebattery".to_string(), hash.clone())
                .await
                .is_ok()
        );
        assert_eq!(
            verify_password_blocking("correcthorsebatterx".to_string(), hash).await,
            Err(PasswordError::Mismatch)
        );
    }

    #[tokio::test]
    async fn test_dummy_verify_always_mismatches() {
        assert_eq!(
            dummy_verify("floodwatch-dummy-password-no".to_string()).await,
            PasswordError::Mismatch
        );
        assert_eq!(dummy_verify(String::new()).await, PasswordError::Mismatch);
    }

    #[test]
    fn test_password_error_display() {
        assert_eq!(
            PasswordError::Mismatch.to_string(),
            "password verification failed"
        );
        assert_eq!(
            PasswordError::InvalidHash.to_string(),
            "invalid password hash format"
        );
    }
}
