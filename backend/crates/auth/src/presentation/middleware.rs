//! Auth Middleware Pipeline
//!
//! - [`attach_session`]: load the session before the handler, commit it after
//! - [`require_auth`]: anonymous requests are redirected to the login page
//! - [`redirect_if_authenticated`]: logged-in users are kept off login/register
//!
//! `attach_session` must wrap both guards; they read the [`Session`] it
//! inserts into request extensions.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use platform::cookie::{extract_cookie, to_header_value};

use crate::application::config::AuthConfig;
use crate::application::session_manager::{Session, SessionManager};
use crate::domain::repository::SessionStore;
use crate::error::AuthError;
use kernel::id::UserId;

/// Authenticated user for the current request
///
/// Inserted by [`require_auth`]; handlers behind it extract this instead of
/// re-reading the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Load the session for this request and persist it once the response exists
///
/// The commit runs for every response the inner service produces, including
/// redirects, errors and caught panics. A failed load or commit replaces the
/// response with the store error.
pub async fn attach_session<S>(
    State(manager): State<Arc<SessionManager<S>>>,
    mut req: Request,
    next: Next,
) -> Response
where
    S: SessionStore + Send + Sync + 'static,
{
    let token = extract_cookie(req.headers(), &manager.config().session_cookie_name);
    let session = match manager.load(token.as_deref()).await {
        Ok(session) => session,
        // The handler never runs and the client keeps its cookie
        Err(e) => return e.into_response(),
    };
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    let set_cookie = match manager.commit(&session).await {
        Ok(set_cookie) => set_cookie,
        Err(e) => return e.into_response(),
    };

    let headers = response.headers_mut();
    headers.append(header::VARY, HeaderValue::from_static("Cookie"));
    if let Some(value) = set_cookie.as_deref().and_then(to_header_value) {
        headers.append(header::SET_COOKIE, value);
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(r#"no-cache="Set-Cookie""#),
        );
    }

    response
}

/// Let authenticated requests through, redirect the rest to the login page
pub async fn require_auth(
    State(config): State<Arc<AuthConfig>>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Response {
    match session.user_id().await {
        Some(user_id) => {
            req.extensions_mut().insert(AuthenticatedUser(user_id));
            next.run(req).await
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "Anonymous request to protected route");
            Redirect::to(&config.login_path).into_response()
        }
    }
}

/// Redirect authenticated requests to the dashboard, let anonymous ones through
pub async fn redirect_if_authenticated(
    State(config): State<Arc<AuthConfig>>,
    session: Session,
    req: Request,
    next: Next,
) -> Response {
    if session.is_authenticated().await {
        return Redirect::to(&config.dashboard_path).into_response();
    }

    next.run(req).await
}
