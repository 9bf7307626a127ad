//! In-Memory Repository Implementations
//!
//! Process-local stores for tests and single-instance development runs.
//! Nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entity::{session::SessionRecord, user::User};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::{email::Email, session_token::SessionToken};
use crate::error::{AuthError, AuthResult};
use kernel::id::UserId;

/// In-memory user repository and session store
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    sessions: Arc<RwLock<HashMap<SessionToken, SessionRecord>>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        // Uniqueness is checked under the write lock, like a unique index
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::DuplicateEmail);
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}

impl SessionStore for MemoryAuthRepository {
    async fn load(&self, token: &SessionToken) -> AuthResult<Option<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(token)
            .filter(|record| !record.is_expired())
            .cloned())
    }

    async fn save(&self, record: &SessionRecord) -> AuthResult<()> {
        self.sessions
            .write()
            .await
            .insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn touch(&self, token: &SessionToken, expires_at_ms: i64) -> AuthResult<bool> {
        let mut sessions = self.sessions.write().await;
        Ok(match sessions.get_mut(token) {
            Some(record) => {
                record.expires_at_ms = expires_at_ms;
                true
            }
            None => false,
        })
    }

    async fn destroy(&self, token: &SessionToken) -> AuthResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| record.expires_at_ms > now_ms);
        Ok((before - sessions.len()) as u64)
    }
}
