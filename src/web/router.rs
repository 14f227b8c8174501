//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{current_person, login, logout, register, AppState};
use super::middleware::{require_session, session_auth};

/// Create the main API router.
///
/// Every route passes through [`session_auth`]; routes that need a
/// signed-in person additionally sit behind [`require_session`].
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout).post(logout))
        .route("/register", post(register));

    // Session required
    let protected_routes = Router::new()
        .route("/person/current", get(current_person))
        .route_layer(middleware::from_fn(require_session));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    app_state.clone(),
                    session_auth,
                )),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
