//! # Purchase Planning
//!
//! Pure checks and arithmetic for a purchase. The store runs
//! [`plan_purchase`] inside its transaction against freshly read rows and
//! applies the resulting [`PurchasePlan`].
//!
//! ## Check Order
//! ```text
//! validate_purchase (before any I/O)
//!   ├── units > 0, balance > 0, ids non-empty   → InvalidArgument
//!   │
//! plan_purchase (inside the store transaction)
//!   ├── product soft-deleted                     → ProductNotFound
//!   ├── stock - units < 0                        → InsufficientStock
//!   ├── cost * units > balance                   → InsufficientFunds
//!   └── OK → PurchasePlan { total_cost, remaining, stock_after }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Product;

/// Outcome of a successful check; what the store must write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    pub units: i64,
    pub total_cost: i64,
    /// Buyer balance the checks ran against.
    pub balance_before: i64,
    /// `balance_before - total_cost`, returned to the buyer as change.
    pub remaining: i64,
    pub stock_after: i64,
}

/// Argument checks that need no store access.
///
/// `balance` is the snapshot taken by the session guard; the authoritative
/// balance is re-read in [`plan_purchase`].
pub fn validate_purchase(
    balance: i64,
    username: &str,
    product_id: &str,
    units: i64,
) -> CoreResult<()> {
    if balance <= 0 || username.trim().is_empty() || product_id.trim().is_empty() || units <= 0
    {
        return Err(CoreError::InvalidArgument(
            "One or more fields has not been set. Required fields: [depositAmount, username, productId, totalUnits]"
                .to_string(),
        ));
    }
    Ok(())
}

/// Checks a purchase of `units` of `product` against `balance`.
///
/// ## Example
/// ```rust
/// # use chrono::Utc;
/// use vend_core::{plan_purchase, Product};
///
/// let now = Utc::now();
/// let product = Product {
///     id: "p-1".into(), owner_id: "s-1".into(), name: "Book".into(),
///     cost: 10, stock: 5, created_at: now, updated_at: now, deleted_at: None,
/// };
///
/// let plan = plan_purchase(&product, 100, 2).unwrap();
/// assert_eq!(plan.total_cost, 20);
/// assert_eq!(plan.remaining, 80);
/// assert_eq!(plan.stock_after, 3);
/// ```
pub fn plan_purchase(product: &Product, balance: i64, units: i64) -> CoreResult<PurchasePlan> {
    if units <= 0 {
        return Err(CoreError::InvalidArgument(
            "totalUnits must be greater than 0".to_string(),
        ));
    }

    if product.is_deleted() {
        return Err(CoreError::ProductNotFound(product.id.clone()));
    }

    if !product.can_supply(units) {
        return Err(CoreError::InsufficientStock {
            product_id: product.id.clone(),
            available: product.stock,
            requested: units,
        });
    }

    // An overflowing total can never be afforded.
    let total_cost = product
        .cost
        .checked_mul(units)
        .ok_or(CoreError::InsufficientFunds {
            balance,
            required: i64::MAX,
        })?;

    if total_cost > balance {
        return Err(CoreError::InsufficientFunds {
            balance,
            required: total_cost,
        });
    }

    Ok(PurchasePlan {
        units,
        total_cost,
        balance_before: balance,
        remaining: balance - total_cost,
        stock_after: product.stock - units,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
