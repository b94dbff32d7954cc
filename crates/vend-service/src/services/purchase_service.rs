//! # Purchase Service
//!
//! Buys units of a product with the caller's deposited coins.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  buy(credential, product_id, units)                                     │
//! │       │                                                                 │
//! │       ├── SessionGuard::authenticate            401 / 403               │
//! │       ├── authorize(Purchase)                   401 RoleRequired        │
//! │       ├── validate_purchase(snapshot balance)   400 InvalidArgument     │
//! │       │                                                                 │
//! │       ├── PurchaseRepository::execute ─────────────────────────┐        │
//! │       │     under the write lock:                              │        │
//! │       │     plan_purchase(product, fresh balance, units)       │        │
//! │       │       ProductNotFound / InsufficientStock /            │ 500    │
//! │       │       InsufficientFunds → rollback                     │        │
//! │       │     balance = 0, stock -= units, commit ◄──────────────┘        │
//! │       │                                                                 │
//! │       └── compute_change(remaining)  →  [50, 20, 10]                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The whole remaining balance is returned as change, so the buyer's
//! balance is 0 after every successful purchase.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use vend_core::{authorize, compute_change, plan_purchase, validate_purchase, Action, Resource};

use crate::envelope::Envelope;
use crate::error::ServiceResult;
use crate::services::product_service::ProductDto;
use crate::AppState;

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResult {
    pub total_cost: i64,
    pub remaining_balance: i64,
    /// Coins handed back, largest first; `[0]` when nothing is left.
    pub change: Vec<i64>,
    /// Product after the stock decrement.
    pub purchased_product: ProductDto,
}

/// Purchase service implementation.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    state: Arc<AppState>,
}

impl PurchaseService {
    /// Create a new purchase service.
    pub fn new(state: Arc<AppState>) -> Self {
        PurchaseService { state }
    }

    /// Buy `units` of `product_id`. Buyers only.
    pub async fn buy(
        &self,
        credential: Option<&str>,
        product_id: &str,
        units: i64,
    ) -> Envelope<PurchaseResult> {
        Envelope::from_result(
            self.try_buy(credential, product_id, units).await,
            200,
            "Purchase was successful",
        )
    }

    async fn try_buy(
        &self,
        credential: Option<&str>,
        product_id: &str,
        units: i64,
    ) -> ServiceResult<PurchaseResult> {
        let ctx = self.state.guard().authenticate(credential).await?;
        authorize(Action::Purchase, &ctx.account, Resource::None)?;

        let product_id = product_id.trim();
        validate_purchase(ctx.account.balance, &ctx.username, product_id, units)?;

        let receipt = self
            .state
            .db
            .purchases()
            .execute(&ctx.account_id, product_id, |product, balance| {
                plan_purchase(product, balance, units)
            })
            .await?;

        let change = compute_change(receipt.plan.remaining);

        info!(
            account_id = %ctx.account_id,
            product_id = %product_id,
            units,
            total_cost = receipt.plan.total_cost,
            change = ?change,
            "Purchase completed"
        );

        Ok(PurchaseResult {
            total_cost: receipt.plan.total_cost,
            remaining_balance: receipt.plan.remaining,
            change,
            purchased_product: receipt.product.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{marketplace, seller, sign_up};
    use crate::Marketplace;

    struct Fixture {
        market: Marketplace,
        buyer: String,
        seller: String,
        product_id: String,
    }

    async fn setup(cost: i64, stock: i64, deposits: &[i64]) -> Fixture {
        let market = marketplace().await;
        let seller = seller(&market, "shop").await;
        let buyer = sign_up(&market, "del").await;

        let product = market
            .products()
            .create_product(Some(seller.as_str()), "Book", cost, stock)
            .await;
        let product_id = product.data.unwrap().id;

        for &amount in deposits {
            assert!(market.accounts().deposit(Some(buyer.as_str()), amount).await.is_ok());
        }

        Fixture {
            market,
            buyer,
            seller,
            product_id,
        }
    }

    async fn balance(f: &Fixture) -> i64 {
        f.market
            .accounts()
            .current_account(Some(f.buyer.as_str()))
            .await
            .data
            .unwrap()
            .balance
    }

    async fn stock(f: &Fixture) -> i64 {
        f.market
            .products()
            .get_product(Some(f.buyer.as_str()), &f.product_id)
            .await
            .data
            .unwrap()
            .amount_available
    }

    #[tokio::test]
    async fn test_buy_returns_change() {
        let f = setup(10, 5, &[100]).await;

        let envelope = f.market.purchases().buy(Some(f.buyer.as_str()), &f.product_id, 2).await;
        assert!(envelope.is_ok(), "{}", envelope.message);
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.message, "Purchase was successful");

        let result = envelope.data.unwrap();
        assert_eq!(result.total_cost, 20);
        assert_eq!(result.remaining_balance, 80);
        assert_eq!(result.change, vec![50, 20, 10]);
        assert_eq!(result.purchased_product.amount_available, 3);

        assert_eq!(balance(&f).await, 0);
        assert_eq!(stock(&f).await, 3);
    }

    #[tokio::test]
    async fn test_exact_payment_gives_zero_change() {
        let f = setup(20, 1, &[20]).await;

        let result = f
            .market
            .purchases()
            .buy(Some(f.buyer.as_str()), &f.product_id, 1)
            .await
            .data
            .unwrap();
        assert_eq!(result.remaining_balance, 0);
        assert_eq!(result.change, vec![0]);
    }

    #[tokio::test]
    async fn test_zero_balance_is_invalid_argument() {
        let f = setup(10, 5, &[]).await;

        let envelope = f.market.purchases().buy(Some(f.buyer.as_str()), &f.product_id, 1).await;
        assert_eq!(envelope.status, 400);
        assert!(envelope.message.starts_with("One or more fields has not been set"));
    }

    #[tokio::test]
    async fn test_zero_units_is_invalid_argument() {
        let f = setup(10, 5, &[50]).await;

        let envelope = f.market.purchases().buy(Some(f.buyer.as_str()), &f.product_id, 0).await;
        assert_eq!(envelope.status, 400);
        assert_eq!(balance(&f).await, 50);
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let f = setup(10, 1, &[100]).await;

        let envelope = f.market.purchases().buy(Some(f.buyer.as_str()), &f.product_id, 2).await;
        assert!(!envelope.is_ok());
        assert_eq!(envelope.status, 500);
        assert!(envelope.message.contains("is 1."));

        assert_eq!(balance(&f).await, 100);
        assert_eq!(stock(&f).await, 1);
    }

    #[tokio::test]
    async fn test_insufficient_funds_changes_nothing() {
        let f = setup(50, 5, &[50, 20]).await;

        let envelope = f.market.purchases().buy(Some(f.buyer.as_str()), &f.product_id, 2).await;
        assert_eq!(envelope.status, 500);
        assert!(envelope.message.contains("balance 70"));
        assert!(envelope.message.contains("required 100"));

        assert_eq!(balance(&f).await, 70);
        assert_eq!(stock(&f).await, 5);
    }

    #[tokio::test]
    async fn test_missing_product() {
        let f = setup(10, 5, &[100]).await;
        let missing = vend_db::generate_product_id();

        let envelope = f.market.purchases().buy(Some(f.buyer.as_str()), &missing, 1).await;
        assert_eq!(envelope.status, 500);
        assert_eq!(envelope.message, format!("Product with ID '{missing}' not found"));
        assert_eq!(balance(&f).await, 100);
    }

    #[tokio::test]
    async fn test_deleted_product() {
        let f = setup(10, 5, &[100]).await;
        f.market
            .products()
            .delete_product(Some(f.seller.as_str()), &f.product_id)
            .await;

        let envelope = f.market.purchases().buy(Some(f.buyer.as_str()), &f.product_id, 1).await;
        assert_eq!(envelope.status, 500);
        assert!(envelope.message.contains("not found"));
    }

    #[tokio::test]
    async fn test_seller_cannot_buy() {
        let f = setup(10, 5, &[100]).await;

        let envelope = f.market.purchases().buy(Some(f.seller.as_str()), &f.product_id, 1).await;
        assert_eq!(envelope.status, 401);
        assert_eq!(
            envelope.message,
            "Only users with the 'buyer' role can purchase a product"
        );
    }

    #[tokio::test]
    async fn test_second_purchase_needs_new_deposit() {
        let f = setup(10, 5, &[100]).await;
        let purchases = f.market.purchases();

        assert!(purchases.buy(Some(f.buyer.as_str()), &f.product_id, 1).await.is_ok());

        let second = purchases.buy(Some(f.buyer.as_str()), &f.product_id, 1).await;
        assert_eq!(second.status, 400);
        assert_eq!(stock(&f).await, 4);
    }

    #[test]
    fn test_result_shape() {
        let result = PurchaseResult {
            total_cost: 20,
            remaining_balance: 80,
            change: vec![50, 20, 10],
            purchased_product: ProductDto {
                id: "p-1".to_string(),
                product_name: "Book".to_string(),
                cost: 10,
                amount_available: 3,
                seller_id: "s-1".to_string(),
            },
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["totalCost"], 20);
        assert_eq!(value["remainingBalance"], 80);
        assert_eq!(value["change"], serde_json::json!([50, 20, 10]));
        assert_eq!(value["purchasedProduct"]["amountAvailable"], 3);
    }
}
