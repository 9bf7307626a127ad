//! HTTP Handlers
//!
//! Thin adapters from forms to [`UserService`] and the request [`Session`].

use axum::Json;
use axum::extract::{Form, State};
use axum::response::{Html, Redirect};
use kernel::error::field::FieldErrors;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{CreateUserInput, LoginInput, Session, SessionManager, UserService};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{DashboardResponse, HealthResponse, LoginForm, RegisterForm};
use crate::presentation::middleware::AuthenticatedUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    pub user_service: Arc<UserService<R>>,
    pub session_manager: Arc<SessionManager<R>>,
    pub config: Arc<AuthConfig>,
}

impl<R> AuthAppState<R>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    /// Build services over one repository acting as both user and session store
    pub fn new(repo: R, config: AuthConfig) -> Self {
        let repo = Arc::new(repo);
        let config = Arc::new(config);

        Self {
            user_service: Arc::new(UserService::new(repo.clone(), config.clone())),
            session_manager: Arc::new(SessionManager::new(repo, config.clone())),
            config,
        }
    }
}

// ============================================================================
// Pages
// ============================================================================

const LOGIN_PAGE: &str = r#"<!doctype html>
<title>Login</title>
<form method="post" action="/login">
  <input type="email" name="email" required>
  <input type="password" name="password" required>
  <button type="submit">Log in</button>
</form>
<a href="/register">Register</a>
"#;

const REGISTER_PAGE: &str = r#"<!doctype html>
<title>Register</title>
<form method="post" action="/register">
  <input type="email" name="email" required>
  <input type="password" name="password" required>
  <input type="password" name="confirm_password" required>
  <button type="submit">Register</button>
</form>
<a href="/login">Log in</a>
"#;

/// GET /login
pub async fn show_login() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// GET /register
pub async fn show_register() -> Html<&'static str> {
    Html(REGISTER_PAGE)
}

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> AuthResult<Redirect>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    if form.password != form.confirm_password {
        return Err(AuthError::Validation(FieldErrors::single(
            "confirm_password",
            "Passwords do not match",
        )));
    }

    let user = state
        .user_service
        .create_user(CreateUserInput {
            email: form.email,
            password: form.password,
        })
        .await?;

    session.create_session(&user.user_id).await;

    Ok(Redirect::to(&state.config.dashboard_path))
}

// ============================================================================
// Login / Logout
// ============================================================================

/// POST /login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AuthResult<Redirect>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let user = state
        .user_service
        .validate_login(LoginInput {
            email: form.email,
            password: form.password,
        })
        .await?;

    session.create_session(&user.user_id).await;

    Ok(Redirect::to(&state.config.dashboard_path))
}

/// POST /logout
pub async fn logout<R>(State(state): State<AuthAppState<R>>, session: Session) -> Redirect
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    if let Some(user_id) = session.user_id().await {
        tracing::info!(user_id = %user_id, "User logged out");
    }
    session.destroy_session().await;

    Redirect::to(&state.config.login_path)
}

// ============================================================================
// Dashboard
// ============================================================================

/// GET /dashboard
pub async fn dashboard<R>(
    State(state): State<AuthAppState<R>>,
    session: Session,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> AuthResult<Json<DashboardResponse>>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    match state.user_service.get_user_by_id(&user_id).await {
        Ok(user) => Ok(Json(DashboardResponse {
            user: user.public_view(),
        })),
        Err(AuthError::NotFound) => {
            // Session outlived its user
            tracing::warn!(user_id = %user_id, "Session references unknown user");
            session.destroy_session().await;
            Err(AuthError::NotFound)
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// Misc
// ============================================================================

/// GET /
pub async fn root<R>(State(state): State<AuthAppState<R>>) -> Redirect
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    Redirect::to(&state.config.dashboard_path)
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
