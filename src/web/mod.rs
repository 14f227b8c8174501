//! HTTP surface for floodwatch-auth.
//!
//! Login, logout, registration and current-person endpoints, plus the
//! middleware that resolves the session cookie on every request.

pub mod cookie;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use cookie::{CookieSettings, SESSION_COOKIE_NAME};
pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
