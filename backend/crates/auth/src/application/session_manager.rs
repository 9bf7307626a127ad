//! Session Manager
//!
//! Loads the session named by the request cookie, hands a [`Session`] to the
//! rest of the request, and writes changes back once the response is built.
//!
//! ## Lifecycle
//! ```text
//! Anonymous --create_session(uid)--> Authenticated(uid) --destroy_session--> Anonymous
//! ```
//! Authenticated sessions also fall back to anonymous when they expire.
//!
//! Anonymous sessions that nobody writes to are never stored and never get
//! a cookie.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::sync::Mutex;

use crate::application::config::AuthConfig;
use crate::domain::entity::session::SessionRecord;
use crate::domain::repository::SessionStore;
use crate::domain::value_object::session_token::SessionToken;
use crate::error::{AuthError, AuthResult};
use kernel::id::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Unmodified,
    /// Only the idle expiry moved; written back update-only
    Touched,
    Modified,
    Destroyed,
}

#[derive(Debug)]
struct SessionState {
    record: SessionRecord,
    status: Status,
    /// Whether `record.token` exists in the store
    persisted: bool,
    /// Tokens to remove from the store on commit
    stale: Vec<SessionToken>,
    /// The client sent a cookie that did not resolve to a live session
    clear_cookie: bool,
}

/// Request-scoped session handle
///
/// Cheap to clone; all clones see the same state. Inserted into request
/// extensions by `attach_session`.
#[derive(Debug, Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    lifetime: chrono::Duration,
}

impl Session {
    fn new(state: SessionState, lifetime: chrono::Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            lifetime,
        }
    }

    /// Authenticated user id, `None` for anonymous sessions
    pub async fn user_id(&self) -> Option<UserId> {
        self.state.lock().await.record.data.user_id()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user_id().await.is_some()
    }

    /// Mark this session as authenticated for `user_id`
    ///
    /// The token is renewed and the lifetime restarts, so a token the client
    /// held before login is useless afterwards.
    pub async fn create_session(&self, user_id: &UserId) {
        let mut state = self.state.lock().await;
        let mut record = SessionRecord::new(self.lifetime);
        record.data = std::mem::take(&mut state.record.data);
        record.data.set_user_id(user_id);
        renew(&mut state, record);
        state.status = Status::Modified;
    }

    /// Invalidate this session server-side and clear the client cookie
    pub async fn destroy_session(&self) {
        let mut state = self.state.lock().await;
        renew(&mut state, SessionRecord::new(self.lifetime));
        state.status = Status::Destroyed;
    }

    /// Current token (for diagnostics and tests)
    pub async fn token(&self) -> SessionToken {
        self.state.lock().await.record.token.clone()
    }
}

fn renew(state: &mut SessionState, record: SessionRecord) {
    let old = std::mem::replace(&mut state.record, record);
    if state.persisted {
        state.stale.push(old.token);
    }
    state.persisted = false;
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthError::SessionMissing)
    }
}

/// Session manager
pub struct SessionManager<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SessionManager<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Resolve the cookie token to a session
    ///
    /// A missing, malformed, unknown or expired token yields a fresh anonymous
    /// session. A store failure is returned as is; the cookie is left alone.
    pub async fn load(&self, cookie_token: Option<&str>) -> AuthResult<Session> {
        let lifetime = self.config.session_lifetime_chrono();
        let presented = cookie_token.is_some();

        let loaded = match cookie_token.and_then(SessionToken::parse) {
            Some(token) => self.load_live(&token).await?,
            None => None,
        };

        let state = match loaded {
            Some(mut record) => {
                let status = match self.config.session_idle_timeout_chrono() {
                    Some(idle) => {
                        record.touch(idle);
                        Status::Touched
                    }
                    None => Status::Unmodified,
                };
                SessionState {
                    record,
                    status,
                    persisted: true,
                    stale: Vec::new(),
                    clear_cookie: false,
                }
            }
            None => SessionState {
                record: SessionRecord::new(lifetime),
                status: Status::Unmodified,
                persisted: false,
                stale: Vec::new(),
                clear_cookie: presented,
            },
        };

        Ok(Session::new(state, lifetime))
    }

    async fn load_live(&self, token: &SessionToken) -> AuthResult<Option<SessionRecord>> {
        match self.store.load(token).await? {
            Some(record) if record.is_expired() => {
                // Already unusable; the periodic purge retries a failed delete
                if let Err(e) = self.store.destroy(token).await {
                    tracing::warn!(error = %e, "Failed to remove expired session");
                }
                Ok(None)
            }
            record => Ok(record),
        }
    }

    /// Persist pending changes and return the `Set-Cookie` value to emit
    ///
    /// Stale tokens are removed after the new record is saved so a failed
    /// save leaves the old session intact. A touch never re-creates a record
    /// that a concurrent logout removed.
    pub async fn commit(&self, session: &Session) -> AuthResult<Option<String>> {
        let cookie = self.config.cookie_config();
        let mut state = session.state.lock().await;

        let header = match state.status {
            Status::Modified => {
                self.store.save(&state.record).await?;
                state.persisted = true;
                Some(cookie.build_set_cookie(
                    state.record.token.as_str(),
                    Some(state.record.remaining_secs()),
                ))
            }
            Status::Touched => {
                let still_live = self
                    .store
                    .touch(&state.record.token, state.record.expires_at_ms)
                    .await?;
                if still_live {
                    Some(cookie.build_set_cookie(
                        state.record.token.as_str(),
                        Some(state.record.remaining_secs()),
                    ))
                } else {
                    tracing::debug!("Session removed during request; clearing cookie");
                    Some(cookie.build_delete_cookie())
                }
            }
            Status::Destroyed => Some(cookie.build_delete_cookie()),
            Status::Unmodified if state.clear_cookie => Some(cookie.build_delete_cookie()),
            Status::Unmodified => None,
        };

        for token in std::mem::take(&mut state.stale) {
            self.store.destroy(&token).await?;
        }

        state.status = Status::Unmodified;
        state.clear_cookie = false;

        Ok(header)
    }

    /// Remove expired sessions from the store
    pub async fn purge_expired(&self) -> AuthResult<u64> {
        let removed = self.store.delete_expired().await?;
        if removed > 0 {
            tracing::info!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::SessionStore;
    use crate::infra::flaky::FlakyAuthRepository;
    use crate::infra::memory::MemoryAuthRepository;
    use std::time::Duration;

    type Fixture = (
        SessionManager<MemoryAuthRepository>,
        Arc<MemoryAuthRepository>,
    );

    fn manager_with(config: AuthConfig) -> Fixture {
        let store = Arc::new(MemoryAuthRepository::new());
        (SessionManager::new(store.clone(), Arc::new(config)), store)
    }

    fn manager() -> Fixture {
        manager_with(AuthConfig::default())
    }

    /// Pull the token out of `session_id=<token>; ...`
    fn cookie_token(set_cookie: &str) -> String {
        set_cookie
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .map(|(_, value)| value.to_string())
            .unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_session_is_not_persisted() {
        let (manager, store) = manager();
        let session = manager.load(None).await.unwrap();

        assert!(!session.is_authenticated().await);
        assert_eq!(manager.commit(&session).await.unwrap(), None);
        assert!(store.load(&session.token().await).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_session_round_trip() {
        let (manager, _) = manager();
        let user_id = UserId::new();

        let session = manager.load(None).await.unwrap();
        session.create_session(&user_id).await;
        assert_eq!(session.user_id().await, Some(user_id));

        let set_cookie = manager.commit(&session).await.unwrap().unwrap();
        assert!(set_cookie.starts_with("session_id="));
        assert!(set_cookie.contains("HttpOnly"));

        let next = manager.load(Some(&cookie_token(&set_cookie))).await.unwrap();
        assert_eq!(next.user_id().await, Some(user_id));
        // No idle timeout configured: nothing to rewrite
        assert_eq!(manager.commit(&next).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_destroy_session_round_trip() {
        let (manager, store) = manager();
        let user_id = UserId::new();

        let session = manager.load(None).await.unwrap();
        session.create_session(&user_id).await;
        let token = cookie_token(&manager.commit(&session).await.unwrap().unwrap());

        let session = manager.load(Some(&token)).await.unwrap();
        session.destroy_session().await;
        assert_eq!(session.user_id().await, None);

        let set_cookie = manager.commit(&session).await.unwrap().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));

        let parsed = SessionToken::parse(&token).unwrap();
        assert!(store.load(&parsed).await.unwrap().is_none());
        assert!(!manager.load(Some(&token)).await.unwrap().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_renews_token() {
        let (manager, store) = manager();

        let session = manager.load(None).await.unwrap();
        session.create_session(&UserId::new()).await;
        let first = cookie_token(&manager.commit(&session).await.unwrap().unwrap());

        let session = manager.load(Some(&first)).await.unwrap();
        session.create_session(&UserId::new()).await;
        let second = cookie_token(&manager.commit(&session).await.unwrap().unwrap());

        assert_ne!(first, second);
        let old = SessionToken::parse(&first).unwrap();
        assert!(store.load(&old).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_token_gets_cookie_cleared() {
        let (manager, _) = manager();
        let bogus = SessionToken::generate();

        let session = manager.load(Some(bogus.as_str())).await.unwrap();
        assert!(!session.is_authenticated().await);

        let set_cookie = manager.commit(&session).await.unwrap().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_malformed_token_is_anonymous() {
        let (manager, _) = manager();
        let session = manager.load(Some("not a token")).await.unwrap();
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_expired_session_is_anonymous_and_removed() {
        let (manager, store) = manager();

        let mut record = SessionRecord::new(chrono::Duration::hours(1));
        record.data.set_user_id(&UserId::new());
        record.expires_at_ms = chrono::Utc::now().timestamp_millis() - 1;
        store.save(&record).await.unwrap();

        let session = manager.load(Some(record.token.as_str())).await.unwrap();
        assert!(!session.is_authenticated().await);
        assert!(store.load(&record.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_idle_timeout_refreshes_cookie() {
        let (manager, _) = manager_with(AuthConfig {
            session_idle_timeout: Some(Duration::from_secs(600)),
            ..AuthConfig::default()
        });

        let session = manager.load(None).await.unwrap();
        session.create_session(&UserId::new()).await;
        let token = cookie_token(&manager.commit(&session).await.unwrap().unwrap());

        let session = manager.load(Some(&token)).await.unwrap();
        let set_cookie = manager.commit(&session).await.unwrap().unwrap();
        assert_eq!(cookie_token(&set_cookie), token);

        let max_age: i64 = set_cookie
            .split("; ")
            .find_map(|attr| attr.strip_prefix("Max-Age="))
            .unwrap()
            .parse()
            .unwrap();
        assert!((590..=600).contains(&max_age));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (manager, store) = manager();

        let mut expired = SessionRecord::new(chrono::Duration::hours(1));
        expired.expires_at_ms = chrono::Utc::now().timestamp_millis() - 1;
        store.save(&expired).await.unwrap();
        store
            .save(&SessionRecord::new(chrono::Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(manager.purge_expired().await.unwrap(), 1);
        assert_eq!(manager.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_on_load_is_an_error() {
        let store = Arc::new(FlakyAuthRepository::new());
        let manager = SessionManager::new(store.clone(), Arc::new(AuthConfig::default()));

        let session = manager.load(None).await.unwrap();
        session.create_session(&UserId::new()).await;
        let token = cookie_token(&manager.commit(&session).await.unwrap().unwrap());

        store.fail_reads(true);
        let err = manager.load(Some(&token)).await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));

        // Once the store recovers the session is still there
        store.fail_reads(false);
        let session = manager.load(Some(&token)).await.unwrap();
        assert!(session.is_authenticated().await);
        assert_eq!(manager.commit(&session).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_idle_refresh_does_not_undo_concurrent_logout() {
        let (manager, store) = manager_with(AuthConfig {
            session_idle_timeout: Some(Duration::from_secs(600)),
            ..AuthConfig::default()
        });

        let session = manager.load(None).await.unwrap();
        session.create_session(&UserId::new()).await;
        let token = cookie_token(&manager.commit(&session).await.unwrap().unwrap());

        // Two requests in flight on the same cookie
        let slow = manager.load(Some(&token)).await.unwrap();
        let logout = manager.load(Some(&token)).await.unwrap();

        logout.destroy_session().await;
        manager.commit(&logout).await.unwrap();

        let set_cookie = manager.commit(&slow).await.unwrap().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));

        let parsed = SessionToken::parse(&token).unwrap();
        assert!(store.load(&parsed).await.unwrap().is_none());
        let after = manager.load(Some(&token)).await.unwrap();
        assert!(!after.is_authenticated().await);
    }
}
