//! Request DTOs for the auth endpoints.
//!
//! Missing fields deserialize as empty strings, so an absent username fails
//! the same way as an unknown one.

use serde::Deserialize;

/// Login form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}
