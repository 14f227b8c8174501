//! Registration policy for usernames and passwords.
//!
//! Validation is pure: it never touches storage. Every field is checked and
//! all violations are returned together so a client can show them at once.
//! Lengths are byte lengths.

use std::collections::BTreeMap;
use std::fmt;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 120;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 120;

pub const USERNAME_TOO_SHORT: &str = "Usernames must be at least 3 characters long.";
pub const USERNAME_TOO_LONG: &str = "Usernames cannot be longer than 120 characters.";
pub const USERNAME_HAS_SPACES: &str = "Usernames cannot include spaces.";
pub const USERNAME_IN_USE: &str = "Username is already in use.";
pub const PASSWORD_TOO_SHORT: &str = "Passwords must be at least 10 characters long.";
pub const PASSWORD_TOO_LONG: &str = "Passwords cannot be longer than 120 characters.";

/// Field-scoped validation failures, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Create an empty set of field errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single failure on one field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Record a failure for a field, replacing any earlier one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Message recorded for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Consume into the underlying field map.
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        write!(f, "validation failed ({})", fields.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Check a username against the policy, returning the first violation.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(USERNAME_TOO_SHORT);
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(USERNAME_TOO_LONG);
    }
    if username.chars().any(char::is_whitespace) {
        return Err(USERNAME_HAS_SPACES);
    }
    Ok(())
}

/// Check a password against the policy, returning the first violation.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(PASSWORD_TOO_SHORT);
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PASSWORD_TOO_LONG);
    }
    Ok(())
}

/// Validate a registration form.
///
/// # Examples
///
/// ```
/// use floodwatch_auth::auth::validation::validate_registration;
///
/// assert!(validate_registration("alice123", "correcthorsebattery").is_ok());
///
/// let errors = validate_registration("ab", "short").unwrap_err();
/// assert_eq!(errors.len(), 2);
/// ```
pub fn validate_registration(username: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Err(message) = validate_username(username) {
        errors.insert("username", message);
    }
    if let Err(message) = validate_password(password) {
        errors.insert("password", message);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration("alice123", "correcthorsebattery").is_ok());
        assert!(validate_registration("abc", "0123456789").is_ok());
        assert!(validate_registration(&"a".repeat(120), &"p".repeat(120)).is_ok());
    }

    #[test]
    fn test_username_too_short() {
        let errors = validate_registration("ab", "longenoughpw1").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("username"), Some(USERNAME_TOO_SHORT));
    }

    #[test]
    fn test_username_too_long() {
        let errors = validate_registration(&"a".repeat(121), "longenoughpw1").unwrap_err();
        assert_eq!(errors.get("username"), Some(USERNAME_TOO_LONG));
    }

    #[test]
    fn test_username_whitespace() {
        for name in ["has space", "tab\there", "new\nline", "cr\rx", "ff\u{0C}x", "nb\u{00A0}sp"] {
            assert_eq!(
                validate_username(name),
                Err(USERNAME_HAS_SPACES),
                "{name:?}"
            );
        }
    }

    #[test]
    fn test_username_first_violation_wins() {
        // Too short and contains a space: only the length message is reported.
        assert_eq!(validate_username("a "), Err(USERNAME_TOO_SHORT));
    }

    #[test]
    fn test_username_length_is_bytes() {
        // Two characters, six bytes.
        assert!(validate_username("日本").is_ok());
        assert_eq!(validate_username(&"é".repeat(61)), Err(USERNAME_TOO_LONG));
    }

    #[test]
    fn test_password_bounds() {
        assert_eq!(validate_password("123456789"), Err(PASSWORD_TOO_SHORT));
        assert!(validate_password("1234567890").is_ok());
        assert_eq!(
            validate_password(&"p".repeat(121)),
            Err(PASSWORD_TOO_LONG)
        );
    }

    #[test]
    fn test_all_violations_reported() {
        let errors = validate_registration("a b", "short").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("username"), Some(USERNAME_HAS_SPACES));
        assert_eq!(errors.get("password"), Some(PASSWORD_TOO_SHORT));
    }

    #[test]
    fn test_field_errors_helpers() {
        let errors = FieldErrors::single("username", USERNAME_IN_USE);
        assert!(!errors.is_empty());
        assert_eq!(
            errors.to_string(),
            "validation failed (username: Username is already in use.)"
        );

        let map = errors.into_map();
        assert_eq!(map.get("username").map(String::as_str), Some(USERNAME_IN_USE));
    }
}
