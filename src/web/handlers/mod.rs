//! API handlers.

pub mod auth;

pub use auth::*;
