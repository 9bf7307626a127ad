//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. The `Display` text is for logs; what a
//! client sees is the generic message from [`AuthError::public_message`].

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, field::FieldErrors, kind::ErrorKind};
use platform::password::PasswordHashError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input, with per-field detail
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Email already registered (pre-check or unique index)
    #[error("Email already registered")]
    DuplicateEmail,

    /// Unknown email or wrong password. Deliberately one variant.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User does not exist
    #[error("User not found")]
    NotFound,

    /// Request reached a protected handler without an authenticated user
    #[error("Authentication required")]
    Unauthenticated,

    /// Session handle missing from the request (attach middleware not installed)
    #[error("Session middleware not installed")]
    SessionMissing,

    /// Password hashing failed
    #[error("Credential error: {0}")]
    Credential(#[from] PasswordHashError),

    /// Backing store failed (I/O, pool, driver)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::UnprocessableEntity,
            AuthError::DuplicateEmail => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::NotFound | AuthError::Unauthenticated => {
                ErrorKind::Unauthorized
            }
            AuthError::StoreUnavailable(_) => ErrorKind::ServiceUnavailable,
            AuthError::SessionMissing | AuthError::Credential(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Message safe to show to a client
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "Validation failed",
            AuthError::DuplicateEmail => "Email already registered",
            AuthError::InvalidCredentials => "Invalid credentials",
            // Missing user behind a live session is reported like any other unauthenticated request
            AuthError::NotFound | AuthError::Unauthenticated => "Authentication required",
            AuthError::StoreUnavailable(_) => "Service temporarily unavailable",
            AuthError::SessionMissing | AuthError::Credential(_) | AuthError::Internal(_) => {
                "Internal server error"
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.public_message());
        match self {
            AuthError::Validation(fields) => err.with_fields(fields.clone()),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Auth store unavailable");
            }
            AuthError::Credential(e) => {
                tracing::error!(error = %e, "Password hashing failed");
            }
            AuthError::SessionMissing => {
                tracing::error!("Session handle missing; is attach_session installed?");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::StoreUnavailable(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::DuplicateEmail.kind().status_code(), 409);
        assert_eq!(AuthError::InvalidCredentials.kind().status_code(), 401);
        assert_eq!(AuthError::NotFound.kind().status_code(), 401);
        assert_eq!(
            AuthError::Validation(FieldErrors::new()).kind().status_code(),
            422
        );
        assert_eq!(
            AuthError::StoreUnavailable("disk".into()).kind().status_code(),
            503
        );
    }

    #[test]
    fn test_store_details_never_reach_the_client() {
        let err = AuthError::StoreUnavailable("UNIQUE constraint failed: users.email".into());
        let app = err.to_app_error();
        assert_eq!(app.message(), "Service temporarily unavailable");
        assert!(!app.to_string().contains("users.email"));
    }

    #[test]
    fn test_validation_keeps_field_detail() {
        let err = AuthError::Validation(FieldErrors::single("email", "Invalid email format"));
        let app = err.to_app_error();
        assert!(app.fields().contains("email"));
    }

    #[test]
    fn test_not_found_looks_like_unauthenticated() {
        assert_eq!(
            AuthError::NotFound.public_message(),
            AuthError::Unauthenticated.public_message()
        );
    }
}
