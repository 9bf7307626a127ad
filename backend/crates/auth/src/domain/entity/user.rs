//! User Entity
//!
//! A registered account. The password hash lives on the entity but never
//! leaves the crate through [`PublicUser`], which is the only user shape
//! handlers serialize.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};
use kernel::id::UserId;

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Random UUID v4, stored as its string form
    pub user_id: UserId,
    /// Unique, case-sensitive as stored
    pub email: Email,
    /// Argon2id hash
    pub password: UserPassword,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id
    pub fn new(email: Email, password: UserPassword) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            password,
            created_at: now,
            updated_at: now,
        }
    }

    /// Verify a password against the stored hash
    ///
    /// Blocking (Argon2); run off the async executor.
    pub fn check_password(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<()> {
        if self.password.verify(raw, pepper) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Non-sensitive projection for responses
    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.user_id,
            email: self.email.as_str().to_string(),
            created_at: self.created_at,
        }
    }
}

/// User as exposed to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
