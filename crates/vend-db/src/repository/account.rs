//! # Account Repository
//!
//! Database operations for accounts and their balances.
//!
//! ## Balance Writes
//! ```text
//! deposit        UPDATE ... SET balance = balance + ?   (buyer, active)
//! reset_balance  UPDATE ... SET balance = 0             (buyer, active)
//! purchase       see PurchaseRepository (same row, inside its transaction)
//! ```
//! Every write is a single statement with `RETURNING`, so the caller gets
//! the post-update row without a second read.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use vend_core::{Account, Role, Session};

use super::{ACCOUNT_COLUMNS, SESSION_COLUMNS};
use crate::error::DbResult;

/// Repository for account database operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Gets an account by ID, deleted or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Gets an account by ID if it has not been soft-deleted.
    pub async fn get_active(&self, id: &str) -> DbResult<Option<Account>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1 AND deleted_at IS NULL"
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Gets an account by its (already normalized) username, deleted or not.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Lists active accounts ordered by username.
    pub async fn list_active(&self, limit: u32, offset: u32) -> DbResult<Vec<Account>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts
             WHERE deleted_at IS NULL
             ORDER BY username
             LIMIT ?1 OFFSET ?2"
        );
        let accounts = sqlx::query_as::<_, Account>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(accounts)
    }

    /// Inserts a new account.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - username already taken
    pub async fn insert(&self, account: &Account) -> DbResult<Account> {
        debug!(username = %account.username, "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, username, password_hash, balance, role,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.balance)
        .bind(account.role)
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(account.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(account.clone())
    }

    /// Inserts an account and its first session in one transaction.
    ///
    /// Either both rows exist afterwards or neither does.
    pub async fn register(&self, account: &Account, session: &Session) -> DbResult<Account> {
        debug!(username = %account.username, "Registering account with session");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, username, password_hash, balance, role,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.balance)
        .bind(account.role)
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(account.deleted_at)
        .execute(&mut *tx)
        .await?;

        let sql = format!("INSERT INTO sessions ({SESSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)");
        sqlx::query(&sql)
            .bind(&session.id)
            .bind(&session.account_id)
            .bind(&session.username)
            .bind(&session.token)
            .bind(session.created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(account.clone())
    }

    /// Adds `amount` to an active buyer's balance.
    ///
    /// ## Returns
    /// * `Ok(None)` - no active buyer with that ID
    pub async fn deposit(&self, id: &str, amount: i64) -> DbResult<Option<Account>> {
        debug!(id = %id, amount, "Depositing");

        let sql = format!(
            "UPDATE accounts
             SET balance = balance + ?2, updated_at = ?3
             WHERE id = ?1 AND role = 'buyer' AND deleted_at IS NULL
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(amount)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Sets an active buyer's balance to 0.
    pub async fn reset_balance(&self, id: &str) -> DbResult<Option<Account>> {
        debug!(id = %id, "Resetting balance");

        let sql = format!(
            "UPDATE accounts
             SET balance = 0, updated_at = ?2
             WHERE id = ?1 AND role = 'buyer' AND deleted_at IS NULL
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Changes an active account's role.
    pub async fn set_role(&self, id: &str, role: Role) -> DbResult<Option<Account>> {
        debug!(id = %id, role = %role, "Changing role");

        let sql = format!(
            "UPDATE accounts
             SET role = ?2, updated_at = ?3
             WHERE id = ?1 AND deleted_at IS NULL
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(role)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Soft-deletes an account and removes all of its sessions.
    pub async fn soft_delete(&self, id: &str) -> DbResult<Option<Account>> {
        debug!(id = %id, "Soft-deleting account");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let sql = format!(
            "UPDATE accounts
             SET deleted_at = ?2, updated_at = ?2
             WHERE id = ?1 AND deleted_at IS NULL
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        if account.is_none() {
            return Ok(None);
        }

        let revoked = sqlx::query("DELETE FROM sessions WHERE account_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        debug!(id = %id, revoked, "Account deleted, sessions revoked");
        Ok(account)
    }

    /// Clears the soft-delete marker.
    ///
    /// ## Returns
    /// * `Ok(None)` - no deleted account with that ID
    pub async fn restore(&self, id: &str) -> DbResult<Option<Account>> {
        debug!(id = %id, "Restoring account");

        let sql = format!(
            "UPDATE accounts
             SET deleted_at = NULL, updated_at = ?2
             WHERE id = ?1 AND deleted_at IS NOT NULL
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Counts active accounts (for diagnostics).
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use uuid::Uuid;

    fn account(username: &str, role: Role) -> Account {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            balance: 0,
            role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn session_for(account: &Account) -> Session {
        Session {
            id: Uuid::new_v4().to_string(),
            account_id: account.id.clone(),
            username: account.username.clone(),
            token: format!("token-{}", account.id),
            created_at: Utc::now(),
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let repo = db.accounts();
        let del = repo.insert(&account("del", Role::Buyer)).await.unwrap();

        let found = repo.get_by_username("del").await.unwrap().unwrap();
        assert_eq!(found.id, del.id);
        assert_eq!(found.role, Role::Buyer);
        assert_eq!(found.password_hash, "hash");

        assert!(repo.get_active(&del.id).await.unwrap().is_some());
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = db().await;
        let repo = db.accounts();
        repo.insert(&account("del", Role::Buyer)).await.unwrap();

        let err = repo.insert(&account("del", Role::Seller)).await.unwrap_err();
        assert!(err.is_unique_violation_on("accounts.username"));
    }

    #[tokio::test]
    async fn test_register_is_atomic() {
        let db = db().await;
        let repo = db.accounts();

        let first = account("del", Role::Buyer);
        repo.register(&first, &session_for(&first)).await.unwrap();
        assert!(db.sessions().find_by_account(&first.id).await.unwrap().is_some());

        // Username clash aborts the whole transaction, no orphan session.
        let second = account("del", Role::Buyer);
        let err = repo.register(&second, &session_for(&second)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(db.sessions().find_by_account(&second.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deposit_and_reset() {
        let db = db().await;
        let repo = db.accounts();
        let buyer = repo.insert(&account("del", Role::Buyer)).await.unwrap();

        repo.deposit(&buyer.id, 50).await.unwrap();
        let after = repo.deposit(&buyer.id, 20).await.unwrap().unwrap();
        assert_eq!(after.balance, 70);

        let reset = repo.reset_balance(&buyer.id).await.unwrap().unwrap();
        assert_eq!(reset.balance, 0);
    }

    #[tokio::test]
    async fn test_deposit_requires_buyer() {
        let db = db().await;
        let repo = db.accounts();
        let seller = repo.insert(&account("sam", Role::Seller)).await.unwrap();

        assert!(repo.deposit(&seller.id, 50).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_role() {
        let db = db().await;
        let repo = db.accounts();
        let del = repo.insert(&account("del", Role::Buyer)).await.unwrap();

        let changed = repo.set_role(&del.id, Role::Seller).await.unwrap().unwrap();
        assert_eq!(changed.role, Role::Seller);
    }

    #[tokio::test]
    async fn test_soft_delete_revokes_sessions_and_restore() {
        let db = db().await;
        let repo = db.accounts();
        let del = account("del", Role::Buyer);
        repo.register(&del, &session_for(&del)).await.unwrap();

        let deleted = repo.soft_delete(&del.id).await.unwrap().unwrap();
        assert!(deleted.is_deleted());
        assert!(repo.get_active(&del.id).await.unwrap().is_none());
        assert!(db.sessions().find_by_account(&del.id).await.unwrap().is_none());
        assert_eq!(repo.count_active().await.unwrap(), 0);

        // Second delete matches nothing.
        assert!(repo.soft_delete(&del.id).await.unwrap().is_none());

        let restored = repo.restore(&del.id).await.unwrap().unwrap();
        assert!(!restored.is_deleted());
        assert!(repo.restore(&del.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_active_paging() {
        let db = db().await;
        let repo = db.accounts();
        for name in ["carol", "alice", "bob"] {
            repo.insert(&account(name, Role::Buyer)).await.unwrap();
        }
        let gone = repo.insert(&account("dave", Role::Buyer)).await.unwrap();
        repo.soft_delete(&gone.id).await.unwrap();

        let page = repo.list_active(2, 0).await.unwrap();
        let names: Vec<_> = page.iter().map(|a| a.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);

        let rest = repo.list_active(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].username, "carol");
    }
}
