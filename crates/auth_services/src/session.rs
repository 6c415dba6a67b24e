use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::cookie::SESSION_TTL_DAYS;

/// A server-side session row.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session identifier, carried (signed) in the cookie.
    pub id: Uuid,
    /// Logged-in user bound to this session, if any.
    pub user_id: Option<Uuid>,
    /// When the session stops being honored.
    pub expires_at: DateTime<Utc>,
}

/// Which flash slot a message goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    /// Shown as a success banner.
    Success,
    /// Shown as an error banner.
    Error,
}

/// One-time messages taken from the session for the next rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    /// Success message, if one was flashed.
    pub success: Option<String>,
    /// Error message, if one was flashed.
    pub error: Option<String>,
}

/// Errors from the session store.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// An internal database error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persisted session store: sessions, their logged-in user, and one-time
/// flash messages.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates a fresh anonymous session.
    async fn create(&self) -> Result<Session, SessionError>;

    /// Looks up a live (non-expired) session.
    async fn get(&self, session_id: &Uuid) -> Result<Option<Session>, SessionError>;

    /// Binds a user to the session (`None` logs out).
    async fn set_user(&self, session_id: &Uuid, user_id: Option<Uuid>) -> Result<(), SessionError>;

    /// Stores a one-time message in the given flash slot.
    async fn push_flash(
        &self,
        session_id: &Uuid,
        kind: FlashKind,
        message: &str,
    ) -> Result<(), SessionError>;

    /// Reads and clears both flash slots.
    async fn take_flash(&self, session_id: &Uuid) -> Result<Flash, SessionError>;
}

/// Postgres-backed session store.
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Creates a new store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self) -> Result<Session, SessionError> {
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        let row = sqlx::query(
            r#"
            INSERT INTO sessions (expires_at)
            VALUES ($1)
            RETURNING id, user_id, expires_at
            "#,
        )
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(Session {
            id: row.get("id"),
            user_id: row.get("user_id"),
            expires_at: row.get("expires_at"),
        })
    }

    async fn get(&self, session_id: &Uuid) -> Result<Option<Session>, SessionError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, expires_at
            FROM sessions
            WHERE id = $1 AND expires_at > NOW()
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Session {
            id: row.get("id"),
            user_id: row.get("user_id"),
            expires_at: row.get("expires_at"),
        }))
    }

    async fn set_user(&self, session_id: &Uuid, user_id: Option<Uuid>) -> Result<(), SessionError> {
        sqlx::query("UPDATE sessions SET user_id = $1 WHERE id = $2")
            .bind(user_id)
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn push_flash(
        &self,
        session_id: &Uuid,
        kind: FlashKind,
        message: &str,
    ) -> Result<(), SessionError> {
        let query = match kind {
            FlashKind::Success => "UPDATE sessions SET flash_success = $1 WHERE id = $2",
            FlashKind::Error => "UPDATE sessions SET flash_error = $1 WHERE id = $2",
        };

        sqlx::query(query)
            .bind(message)
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn take_flash(&self, session_id: &Uuid) -> Result<Flash, SessionError> {
        // RETURNING reports post-update values, so the previous messages are
        // captured through a self-join before they are nulled out.
        let row = sqlx::query(
            r#"
            UPDATE sessions s
            SET flash_success = NULL, flash_error = NULL
            FROM (SELECT id, flash_success, flash_error FROM sessions WHERE id = $1 FOR UPDATE) old
            WHERE s.id = old.id
            RETURNING old.flash_success AS flash_success, old.flash_error AS flash_error
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(row) => Flash {
                success: row.get("flash_success"),
                error: row.get("flash_error"),
            },
            None => Flash::default(),
        })
    }
}
