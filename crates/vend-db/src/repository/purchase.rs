//! # Purchase Repository
//!
//! The only multi-row write in the marketplace: debit the buyer and take
//! units out of stock, all or nothing.
//!
//! ## Transaction Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. UPDATE products SET stock = stock WHERE id = ?                     │
//! │        └── first statement is a write: takes the database write lock,  │
//! │            competing purchases queue here (busy_timeout)               │
//! │   2. SELECT product, SELECT buyer   ← committed state, nobody can move │
//! │   3. plan(&product, balance)        ← pure checks from vend-core       │
//! │        └── Err → DbError::Rejected, tx dropped → ROLLBACK              │
//! │   4. UPDATE accounts SET balance = 0                                    │
//! │   5. UPDATE products SET stock = stock - ? WHERE stock >= ? RETURNING  │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! SQLite has no `SELECT ... FOR UPDATE`; step 1 stands in for it. Step 5
//! keeps its own `stock >= ?` guard and the table has `CHECK (stock >= 0)`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use vend_core::{Account, CoreError, CoreResult, Product, PurchasePlan};

use super::{ACCOUNT_COLUMNS, PRODUCT_COLUMNS};
use crate::error::{DbError, DbResult};

/// What a committed purchase changed.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub plan: PurchasePlan,
    /// Product row after the stock decrement.
    pub product: Product,
}

/// Repository for the purchase transaction.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Runs a purchase for `buyer_id` against `product_id`.
    ///
    /// `plan` receives the product and the buyer balance as read under the
    /// write lock and decides whether the purchase may proceed. Its error is
    /// returned as [`DbError::Rejected`] with nothing written.
    ///
    /// ## Errors
    /// * `Rejected(ProductNotFound)` - no such product, or soft-deleted
    /// * `Rejected(AccountNotFound)` - buyer missing or soft-deleted
    /// * `Rejected(_)` - whatever `plan` returned
    pub async fn execute<F>(
        &self,
        buyer_id: &str,
        product_id: &str,
        plan: F,
    ) -> DbResult<PurchaseReceipt>
    where
        F: FnOnce(&Product, i64) -> CoreResult<PurchasePlan> + Send,
    {
        debug!(buyer_id = %buyer_id, product_id = %product_id, "Starting purchase transaction");

        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("UPDATE products SET stock = stock WHERE id = ?1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if locked == 0 {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;

        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1 AND deleted_at IS NULL"
        );
        let buyer = sqlx::query_as::<_, Account>(&sql)
            .bind(buyer_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(buyer_id.to_string()))?;

        let plan = plan(&product, buyer.balance).map_err(DbError::Rejected)?;

        let now = Utc::now();

        sqlx::query("UPDATE accounts SET balance = 0, updated_at = ?2 WHERE id = ?1")
            .bind(buyer_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "UPDATE products SET stock = stock - ?2, updated_at = ?3
             WHERE id = ?1 AND stock >= ?2
             RETURNING {PRODUCT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Product>(&sql)
            .bind(product_id)
            .bind(plan.units)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available: product.stock,
                requested: plan.units,
            })?;

        tx.commit().await?;

        info!(
            buyer_id = %buyer_id,
            product_id = %product_id,
            units = plan.units,
            total_cost = plan.total_cost,
            stock_after = updated.stock,
            "Purchase committed"
        );

        Ok(PurchaseReceipt {
            plan,
            product: updated,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
