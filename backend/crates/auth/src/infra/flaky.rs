//! Store wrapper with switchable session failures, for tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::entity::{session::SessionRecord, user::User};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::{email::Email, session_token::SessionToken};
use crate::error::{AuthError, AuthResult};
use crate::infra::memory::MemoryAuthRepository;
use kernel::id::UserId;

/// In-memory store whose session reads or writes can be made to fail
#[derive(Clone, Default)]
pub(crate) struct FlakyAuthRepository {
    pub inner: MemoryAuthRepository,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> AuthResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(AuthError::StoreUnavailable("database is locked".into()))
        } else {
            Ok(())
        }
    }
}

impl UserRepository for FlakyAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.inner.create(user).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        self.inner.find_by_id(user_id).await
    }
}

impl SessionStore for FlakyAuthRepository {
    async fn load(&self, token: &SessionToken) -> AuthResult<Option<SessionRecord>> {
        Self::check(&self.fail_reads)?;
        self.inner.load(token).await
    }

    async fn save(&self, record: &SessionRecord) -> AuthResult<()> {
        Self::check(&self.fail_writes)?;
        self.inner.save(record).await
    }

    async fn touch(&self, token: &SessionToken, expires_at_ms: i64) -> AuthResult<bool> {
        Self::check(&self.fail_writes)?;
        self.inner.touch(token, expires_at_ms).await
    }

    async fn destroy(&self, token: &SessionToken) -> AuthResult<()> {
        Self::check(&self.fail_writes)?;
        self.inner.destroy(token).await
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        Self::check(&self.fail_writes)?;
        self.inner.delete_expired().await
    }
}
