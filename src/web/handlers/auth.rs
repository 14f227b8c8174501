//! Authentication handlers.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::auth::{self, RegistrationRequest, SessionManager};
use crate::config::Config;
use crate::db::{Backend, BackendError, Person};
use crate::id::Identifier;
use crate::store::SessionStore;
use crate::web::cookie::{CookieSettings, SESSION_COOKIE_NAME};
use crate::web::dto::{FormData, LoginForm, RegisterForm};
use crate::web::error::ApiError;
use crate::web::middleware::CurrentSession;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Person backend.
    pub backend: Arc<dyn Backend>,
    /// Session lifecycle.
    pub sessions: SessionManager,
    /// Session cookie attributes.
    pub cookies: CookieSettings,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: &Config, backend: Arc<dyn Backend>, store: Arc<dyn SessionStore>) -> Self {
        let duration = config.session.duration();
        Self {
            backend,
            sessions: SessionManager::new(store, duration),
            cookies: CookieSettings::new(duration, config.server.trust_forwarded_proto),
        }
    }
}

/// POST /api/login - Start a session.
///
/// Answers 204 with the session cookie set.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    jar: CookieJar,
    FormData(form): FormData<LoginForm>,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let person = auth::authenticate(state.backend.as_ref(), &form.username, &form.password)
        .await
        .map_err(|e| ApiError::from_error("login", e))?;

    let (session_id, _) = state
        .sessions
        .create_session(person.id)
        .await
        .map_err(|e| ApiError::from_error("login", e))?;

    let cookie = state.cookies.session_cookie(&session_id, &headers, &uri);
    Ok((jar.add(cookie), StatusCode::NO_CONTENT))
}

/// GET|POST /api/logout - End the current session.
///
/// The cookie is cleared whenever one was sent, even if revocation fails.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let Some(value) = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_owned()) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let jar = jar.remove(state.cookies.removal_cookie(&headers));

    let session_id = match Identifier::parse(&value) {
        Ok(id) => id,
        Err(e) => return (jar, ApiError::from_error("logout", e)).into_response(),
    };

    match state.sessions.revoke(&session_id).await {
        Ok(()) => (jar, StatusCode::NO_CONTENT).into_response(),
        Err(e) => (jar, ApiError::from_error("logout", e)).into_response(),
    }
}

/// POST /api/register - Create a person.
///
/// Answers 204 on success and 422 with every field failure otherwise.
/// Does not start a session.
pub async fn register(
    State(state): State<Arc<AppState>>,
    FormData(form): FormData<RegisterForm>,
) -> Result<StatusCode, ApiError> {
    let request = RegistrationRequest::new(form.username, form.password, form.email);
    auth::register(state.backend.as_ref(), request)
        .await
        .map_err(|e| ApiError::from_error("register", e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/person/current - The signed-in person.
pub async fn current_person(
    State(state): State<Arc<AppState>>,
    CurrentSession { session, .. }: CurrentSession,
) -> Result<Json<Person>, ApiError> {
    let person = state.backend.person(&session.user_id).await.map_err(|e| {
        if e == BackendError::NotFound {
            tracing::error!(
                user_id = %session.user_id,
                "Live session refers to a person that does not exist"
            );
        }
        ApiError::from_error("current_person", e)
    })?;

    Ok(Json(person))
}
