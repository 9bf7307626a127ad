//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository / session store traits
//! - `application/` - `UserService`, `SessionManager` and configuration
//! - `infra/` - SQLite and in-memory store implementations
//! - `presentation/` - Middleware pipeline, HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration and login with email + password
//! - Server-side sessions referenced by an opaque cookie token
//! - Middleware gating: session attach, require-auth, redirect-if-authenticated
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, salted per hash, never returned to callers
//! - Login failures are indistinguishable between unknown email and wrong password
//! - Session token is renewed on login and invalidated server-side on logout
//! - Cookies are HttpOnly + SameSite=Lax, `Secure` configurable

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::session_manager::{Session, SessionManager};
pub use application::user_service::UserService;
pub use error::{AuthError, AuthResult};
pub use infra::memory::MemoryAuthRepository;
pub use infra::sqlite::SqliteAuthRepository;
pub use presentation::handlers::AuthAppState;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
