//! Session authentication middleware.
//!
//! [`session_auth`] runs on every request and attaches an [`AuthContext`]
//! to the request extensions. It never rejects a request; handlers and
//! [`require_session`] decide whether anonymity is acceptable. A store
//! outage is recorded as [`AuthContext::Unavailable`] so protected routes
//! answer 500 rather than 401.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{debug, error, trace};

use crate::auth::{Session, SessionError, SessionManager};
use crate::id::Identifier;
use crate::web::cookie::SESSION_COOKIE_NAME;
use crate::web::error::{ApiError, INTERNAL_ERROR};
use crate::web::handlers::AppState;

/// Authentication outcome attached to each request.
///
/// A request without this extension was not routed through
/// [`session_auth`], which is distinct from an anonymous request.
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// No valid session.
    Anonymous,
    /// The session store could not be reached.
    Unavailable,
    /// A live session was found for the request's cookie.
    Authenticated {
        session_id: Identifier,
        session: Session,
    },
}

impl AuthContext {
    /// Whether the request carries a live session.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated { .. })
    }

    /// The session, if any.
    pub fn session(&self) -> Option<(&Identifier, &Session)> {
        match self {
            AuthContext::Anonymous | AuthContext::Unavailable => None,
            AuthContext::Authenticated {
                session_id,
                session,
            } => Some((session_id, session)),
        }
    }
}

/// Resolve the session cookie in `jar` into an [`AuthContext`].
///
/// Missing, malformed, unknown and expired cookies yield
/// [`AuthContext::Anonymous`]. Store failures are logged and yield
/// [`AuthContext::Unavailable`].
pub async fn resolve_session(sessions: &SessionManager, jar: &CookieJar) -> AuthContext {
    let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
        trace!("No session cookie");
        return AuthContext::Anonymous;
    };

    match sessions.validate_cookie(cookie.value()).await {
        Ok((session_id, session)) => AuthContext::Authenticated {
            session_id,
            session,
        },
        Err(SessionError::Invalid) => {
            debug!("Session cookie does not name a live session");
            AuthContext::Anonymous
        }
        Err(e) => {
            error!(error = %e, "Session lookup failed");
            AuthContext::Unavailable
        }
    }
}

/// Session authentication middleware.
///
/// Attaches an [`AuthContext`] to the request and always forwards it.
pub async fn session_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let context = resolve_session(&state.sessions, &jar).await;
    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Reject anonymous requests with 401.
///
/// Must be layered inside [`session_auth`]. A request that skipped it, or
/// whose session could not be looked up, is answered with 500.
pub async fn require_session(request: Request, next: Next) -> Response {
    match request.extensions().get::<AuthContext>() {
        Some(AuthContext::Authenticated { .. }) => next.run(request).await,
        Some(AuthContext::Anonymous) => {
            ApiError::unauthorized("Authentication required").into_response()
        }
        Some(AuthContext::Unavailable) => ApiError::internal(INTERNAL_ERROR).into_response(),
        None => {
            error!("Route requires a session but session_auth is not installed");
            ApiError::internal(INTERNAL_ERROR).into_response()
        }
    }
}

/// Extractor for the authenticated session.
///
/// Rejects with 500 when no session is attached, since routes using it
/// are expected to sit behind [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub session_id: Identifier,
    pub session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthContext>() {
            Some(AuthContext::Authenticated {
                session_id,
                session,
            }) => Ok(CurrentSession {
                session_id: *session_id,
                session: session.clone(),
            }),
            Some(AuthContext::Anonymous) => {
                error!("Handler expected a session but the request is anonymous");
                Err(ApiError::internal(INTERNAL_ERROR))
            }
            Some(AuthContext::Unavailable) => Err(ApiError::internal(INTERNAL_ERROR)),
            None => {
                error!("Handler expected a session but session_auth is not installed");
                Err(ApiError::internal(INTERNAL_ERROR))
            }
        }
    }
}
