//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Owner-Scoped Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products SET <column> = ?                                       │
//! │  WHERE id = ? AND owner_id = ? AND deleted_at IS NULL                   │
//! │  RETURNING *                                                            │
//! │                                                                         │
//! │  1 row  → Some(updated product)                                         │
//! │  0 rows → None  (missing, deleted, or someone else's; indistinguishable)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The ownership test lives in the statement itself, so a concurrent
//! transfer can never let the previous owner write.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;
use vend_core::Product;

use super::PRODUCT_COLUMNS;
use crate::error::DbResult;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID, deleted or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its ID if it has not been soft-deleted.
    pub async fn get_active(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND deleted_at IS NULL"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32, offset: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE deleted_at IS NULL
             ORDER BY name, id
             LIMIT ?1 OFFSET ?2"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::CheckViolation)` - cost not a denomination or negative stock
    /// * `Err(DbError::ForeignKeyViolation)` - owner doesn't exist
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(name = %product.name, owner_id = %product.owner_id, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, owner_id, name, cost, stock,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.owner_id)
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Renames a product owned by `owner_id`.
    pub async fn rename(&self, id: &str, owner_id: &str, name: &str) -> DbResult<Option<Product>> {
        debug!(id = %id, name = %name, "Renaming product");

        let sql = format!(
            "UPDATE products SET name = ?3, updated_at = ?4
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NULL
             RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(name)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Changes the unit cost of a product owned by `owner_id`.
    pub async fn reprice(&self, id: &str, owner_id: &str, cost: i64) -> DbResult<Option<Product>> {
        debug!(id = %id, cost, "Repricing product");

        let sql = format!(
            "UPDATE products SET cost = ?3, updated_at = ?4
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NULL
             RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(cost)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Sets the stock level of a product owned by `owner_id`.
    ///
    /// Absolute, not a delta: the seller states how many units exist.
    pub async fn restock(&self, id: &str, owner_id: &str, stock: i64) -> DbResult<Option<Product>> {
        debug!(id = %id, stock, "Restocking product");

        let sql = format!(
            "UPDATE products SET stock = ?3, updated_at = ?4
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NULL
             RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(stock)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Moves a product from `owner_id` to `new_owner_id`.
    ///
    /// Matches nothing unless the new owner is an active seller at the
    /// moment of the write.
    pub async fn transfer(
        &self,
        id: &str,
        owner_id: &str,
        new_owner_id: &str,
    ) -> DbResult<Option<Product>> {
        debug!(id = %id, from = %owner_id, to = %new_owner_id, "Transferring product");

        let sql = format!(
            "UPDATE products SET owner_id = ?3, updated_at = ?4
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NULL
               AND EXISTS (
                   SELECT 1 FROM accounts
                   WHERE id = ?3 AND role = 'seller' AND deleted_at IS NULL
               )
             RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(new_owner_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Soft-deletes a product owned by `owner_id`.
    pub async fn soft_delete(&self, id: &str, owner_id: &str) -> DbResult<Option<Product>> {
        debug!(id = %id, "Soft-deleting product");

        let sql = format!(
            "UPDATE products SET deleted_at = ?3, updated_at = ?3
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NULL
             RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Restores a soft-deleted product owned by `owner_id`.
    pub async fn restore(&self, id: &str, owner_id: &str) -> DbResult<Option<Product>> {
        debug!(id = %id, "Restoring product");

        let sql = format!(
            "UPDATE products SET deleted_at = NULL, updated_at = ?3
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NOT NULL
             RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Counts active products (for diagnostics).
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
