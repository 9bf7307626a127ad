//! SQLite Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::entity::session::{SessionData, SessionRecord};
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::{
    email::Email, session_token::SessionToken, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};
use kernel::id::UserId;

/// SQLite-backed user repository and session store
#[derive(Clone)]
pub struct SqliteAuthRepository {
    pool: SqlitePool,
}

impl SqliteAuthRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> AuthResult<()> {
        sqlx::migrate!("../../database/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AuthError::StoreUnavailable(format!("migration failed: {e}")))?;

        tracing::info!("Auth schema up to date");

        Ok(())
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for SqliteAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id,
                email,
                password_hash,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(user.user_id.to_string())
        .bind(user.email.as_str())
        .bind(user.password.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Lost a registration race: the pre-check passed for both requests
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AuthError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                email,
                password_hash,
                created_at,
                updated_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                email,
                password_hash,
                created_at,
                updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }
}

// ============================================================================
// Session Store Implementation
// ============================================================================

impl SessionStore for SqliteAuthRepository {
    async fn load(&self, token: &SessionToken) -> AuthResult<Option<SessionRecord>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT token, data, deadline_ms, expires_at_ms
            FROM sessions
            WHERE token = ?1 AND expires_at_ms > ?2
            "#,
        )
        .bind(token.as_str())
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_record()).transpose()
    }

    async fn save(&self, record: &SessionRecord) -> AuthResult<()> {
        let data = serde_json::to_string(&record.data)
            .map_err(|e| AuthError::Internal(format!("Failed to encode session data: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO sessions (token, data, deadline_ms, expires_at_ms)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(token) DO UPDATE SET
                data = excluded.data,
                deadline_ms = excluded.deadline_ms,
                expires_at_ms = excluded.expires_at_ms
            "#,
        )
        .bind(record.token.as_str())
        .bind(data)
        .bind(record.deadline_ms)
        .bind(record.expires_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn touch(&self, token: &SessionToken, expires_at_ms: i64) -> AuthResult<bool> {
        let updated = sqlx::query("UPDATE sessions SET expires_at_ms = ?1 WHERE token = ?2")
            .bind(expires_at_ms)
            .bind(token.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }

    async fn destroy(&self, token: &SessionToken) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at_ms <= ?1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let user_id = self
            .id
            .parse::<UserId>()
            .map_err(|e| AuthError::Internal(format!("Invalid user id: {}", e)))?;

        let password = UserPassword::from_db(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(User {
            user_id,
            email: Email::from_db(self.email),
            password,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    data: String,
    deadline_ms: i64,
    expires_at_ms: i64,
}

impl SessionRow {
    fn into_record(self) -> AuthResult<SessionRecord> {
        let data: SessionData = serde_json::from_str(&self.data)
            .map_err(|e| AuthError::Internal(format!("Invalid session data: {}", e)))?;

        Ok(SessionRecord {
            token: SessionToken::from_db(self.token),
            data,
            deadline_ms: self.deadline_ms,
            expires_at_ms: self.expires_at_ms,
        })
    }
}
