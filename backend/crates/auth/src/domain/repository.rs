//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.
//!
//! Every method is async and must be safe to call from many in-flight
//! requests at once. Dropping the returned future cancels the call.

use crate::domain::entity::{session::SessionRecord, user::User};
use crate::domain::value_object::{email::Email, session_token::SessionToken};
use crate::error::AuthResult;
use kernel::id::UserId;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    ///
    /// ## Errors
    /// - `DuplicateEmail` when the email is already taken, including when
    ///   the unique index catches a concurrent registration
    /// - `StoreUnavailable` on any lower-level failure
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by exact (case-sensitive) email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;
}

/// Session store trait
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Load a live session; expired records are reported as absent
    async fn load(&self, token: &SessionToken) -> AuthResult<Option<SessionRecord>>;

    /// Insert or replace the record under its token
    async fn save(&self, record: &SessionRecord) -> AuthResult<()>;

    /// Move the expiry of an existing record, never inserting one
    ///
    /// Returns `false` when no record exists under `token` (e.g. a logout
    /// removed it while this request was in flight).
    async fn touch(&self, token: &SessionToken, expires_at_ms: i64) -> AuthResult<bool>;

    /// Remove a session (no-op when absent)
    async fn destroy(&self, token: &SessionToken) -> AuthResult<()>;

    /// Remove every expired session, returning how many were removed
    async fn delete_expired(&self) -> AuthResult<u64>;
}
