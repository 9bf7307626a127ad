//! User Service
//!
//! Registration, credential validation and user lookup. Orchestrates the
//! password value objects and the [`UserRepository`].
//!
//! Argon2 work runs on tokio's blocking pool so a burst of logins cannot
//! starve unrelated requests.

use std::sync::{Arc, OnceLock};

use kernel::error::field::FieldErrors;
use kernel::id::UserId;
use platform::password::PasswordPolicy;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Registration input
///
/// `confirm_password` is checked by the caller before this point.
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
}

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// User service
pub struct UserService<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> UserService<R>
where
    R: UserRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Register a new user
    ///
    /// The email pre-check and the insert are not atomic; a concurrent
    /// registration that slips between them is caught by the store's unique
    /// index and still reported as `DuplicateEmail`.
    pub async fn create_user(&self, input: CreateUserInput) -> AuthResult<User> {
        let (email, password) = validate(
            Email::new(&input.email),
            RawPassword::new(input.password, &self.config.password_policy),
        )?;

        if self.repo.find_by_email(&email).await?.is_some() {
            tracing::debug!("Registration rejected: email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let pepper = self.config.password_pepper.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || UserPassword::from_raw(&password, pepper.as_deref()))
                .await??;

        let user = User::new(email, password_hash);
        self.repo.create(&user).await?;

        tracing::info!(user_id = %user.user_id, "User registered");

        Ok(user)
    }

    /// Check login credentials
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`, and
    /// both cost one Argon2 verification.
    pub async fn validate_login(&self, input: LoginInput) -> AuthResult<User> {
        // Registration policy may have changed since; login only needs non-empty
        let (email, password) = validate(
            Email::new(&input.email),
            RawPassword::new(input.password, &PasswordPolicy::default()),
        )?;

        let user = self.repo.find_by_email(&email).await?;

        let pepper = self.config.password_pepper.clone();
        let result = tokio::task::spawn_blocking(move || match user {
            Some(user) => user
                .check_password(&password, pepper.as_deref())
                .map(|()| user),
            None => {
                burn_verification(&password, pepper.as_deref());
                Err(AuthError::InvalidCredentials)
            }
        })
        .await?;

        match &result {
            Ok(user) => tracing::info!(user_id = %user.user_id, "User logged in"),
            Err(AuthError::InvalidCredentials) => tracing::warn!("Failed login attempt"),
            Err(_) => {}
        }

        result
    }

    /// Resolve a user by id (e.g. the id stored in the session)
    pub async fn get_user_by_id(&self, user_id: &UserId) -> AuthResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)
    }
}

/// Collect field errors from both inputs before failing
fn validate(
    email: Result<Email, FieldErrors>,
    password: Result<RawPassword, FieldErrors>,
) -> AuthResult<(Email, RawPassword)> {
    match (email, password) {
        (Ok(email), Ok(password)) => Ok((email, password)),
        (email, password) => {
            let mut errors = FieldErrors::new();
            if let Err(e) = email {
                errors.merge(e);
            }
            if let Err(e) = password {
                errors.merge(e);
            }
            Err(AuthError::Validation(errors))
        }
    }
}

/// Spend the same work as a real verification when the email is unknown
fn burn_verification(password: &RawPassword, pepper: Option<&[u8]>) {
    static DUMMY: OnceLock<Option<UserPassword>> = OnceLock::new();

    let dummy = DUMMY.get_or_init(|| {
        RawPassword::new(
            "timing-equalization-placeholder".to_string(),
            &PasswordPolicy::default(),
        )
        .ok()
        .and_then(|raw| UserPassword::from_raw(&raw, None).ok())
    });

    if let Some(dummy) = dummy {
        let _ = dummy.verify(password, pepper);
    }
}
