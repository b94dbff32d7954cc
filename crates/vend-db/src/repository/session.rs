//! # Session Repository
//!
//! Login sessions. Rows are inserted and deleted, never updated.
//!
//! `sessions.account_id` is UNIQUE: a second insert for the same account
//! fails with `DbError::UniqueViolation { field: "sessions.account_id" }`
//! no matter how the two inserts interleave.

use sqlx::SqlitePool;
use tracing::debug;
use vend_core::Session;

use super::SESSION_COLUMNS;
use crate::error::DbResult;

/// Column named in the unique violation raised for a second session.
pub const SESSION_ACCOUNT_UNIQUE: &str = "sessions.account_id";

/// Repository for session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Inserts a session.
    pub async fn insert(&self, session: &Session) -> DbResult<()> {
        debug!(account_id = %session.account_id, "Creating session");

        let sql = format!("INSERT INTO sessions ({SESSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)");
        sqlx::query(&sql)
            .bind(&session.id)
            .bind(&session.account_id)
            .bind(&session.username)
            .bind(&session.token)
            .bind(session.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Finds the session holding exactly this token.
    pub async fn find_by_token(&self, token: &str) -> DbResult<Option<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE token = ?1");
        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Finds the session of an account, if any.
    pub async fn find_by_account(&self, account_id: &str) -> DbResult<Option<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE account_id = ?1");
        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Deletes the session holding this token. Returns rows removed.
    pub async fn delete_by_token(&self, token: &str) -> DbResult<u64> {
        let removed = sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        debug!(removed, "Deleted session by token");
        Ok(removed)
    }

    /// Deletes every session of an account. Returns rows removed.
    pub async fn delete_for_account(&self, account_id: &str) -> DbResult<u64> {
        let removed = sqlx::query("DELETE FROM sessions WHERE account_id = ?1")
            .bind(account_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        debug!(account_id = %account_id, removed, "Deleted sessions for account");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
