//! Auth Router

use std::any::Any;
use std::sync::Arc;

use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kernel::error::app_error::AppError;
use tower_http::catch_panic::CatchPanicLayer;

use crate::application::session_manager::SessionManager;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{attach_session, redirect_if_authenticated, require_auth};

/// Create the auth router for any repository implementation
///
/// Layer order, outermost first: `attach_session`, panic recovery (see
/// [`with_sessions`]), then the per-group guard.
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let config = state.config.clone();
    let session_manager = state.session_manager.clone();

    let public = Router::new()
        .route(
            "/login",
            get(handlers::show_login).post(handlers::login::<R>),
        )
        .route(
            "/register",
            get(handlers::show_register).post(handlers::register::<R>),
        )
        .route_layer(middleware::from_fn_with_state(
            config.clone(),
            redirect_if_authenticated,
        ));

    let protected = Router::new()
        .route("/dashboard", get(handlers::dashboard::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .route_layer(middleware::from_fn_with_state(config, require_auth));

    let routes = Router::new()
        .route("/", get(handlers::root::<R>))
        .route("/health", get(handlers::health))
        .merge(public)
        .merge(protected)
        .with_state(state);

    with_sessions(routes, session_manager)
}

/// Wrap `routes` in panic recovery and, outside it, `attach_session`
///
/// A panicking handler therefore still gets its session committed.
pub fn with_sessions<S>(routes: Router, session_manager: Arc<SessionManager<S>>) -> Router
where
    S: SessionStore + Send + Sync + 'static,
{
    routes
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(
            session_manager,
            attach_session::<S>,
        ))
}

/// Turn a handler panic into a generic 500
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "Handler panicked");

    AppError::internal("Internal server error").into_response()
}
