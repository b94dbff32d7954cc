//! Product service: catalogue reads and owner-only mutations.
//!
//! ## Ownership Checks
//! ```text
//! credential ──► guard ──► load product ──► authorize(ManageProduct)
//!                               │                  │
//!                          missing ──────────┐     │ not owner
//!                                            ▼     ▼
//!                                      Forbidden("product")   (403)
//!                                            ▲
//!                                            │ 0 rows
//!                          owner-scoped UPDATE ... WHERE owner_id = actor
//! ```
//! A missing product and someone else's product fail the same way.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use vend_core::validation::{
    resolve_page, validate_denomination, validate_id, validate_product_name, validate_stock,
};
use vend_core::{authorize, Action, CoreError, Product, Resource, Role};
use vend_db::generate_product_id;

use crate::envelope::Envelope;
use crate::error::ServiceResult;
use crate::guard::AuthContext;
use crate::AppState;

/// Product as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub product_name: String,
    pub cost: i64,
    pub amount_available: i64,
    pub seller_id: String,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        ProductDto {
            id: product.id,
            product_name: product.name,
            cost: product.cost,
            amount_available: product.stock,
            seller_id: product.owner_id,
        }
    }
}

/// Product service implementation.
#[derive(Debug, Clone)]
pub struct ProductService {
    state: Arc<AppState>,
}

impl ProductService {
    /// Create a new product service.
    pub fn new(state: Arc<AppState>) -> Self {
        ProductService { state }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Active products, one page at a time.
    pub async fn list_products(
        &self,
        credential: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Envelope<Vec<ProductDto>> {
        Envelope::from_result(self.try_list_products(credential, limit, offset).await, 200, "")
    }

    /// One active product.
    pub async fn get_product(&self, credential: Option<&str>, product_id: &str) -> Envelope<ProductDto> {
        Envelope::from_result(self.try_get_product(credential, product_id).await, 200, "")
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a product owned by the caller. Sellers only.
    pub async fn create_product(
        &self,
        credential: Option<&str>,
        name: &str,
        cost: i64,
        stock: i64,
    ) -> Envelope<ProductDto> {
        Envelope::from_result(
            self.try_create_product(credential, name, cost, stock).await,
            201,
            "Product created successfully",
        )
    }

    pub async fn update_name(
        &self,
        credential: Option<&str>,
        product_id: &str,
        name: &str,
    ) -> Envelope<ProductDto> {
        Envelope::from_result(
            self.try_update_name(credential, product_id, name).await,
            200,
            "Product name updated",
        )
    }

    pub async fn update_cost(
        &self,
        credential: Option<&str>,
        product_id: &str,
        cost: i64,
    ) -> Envelope<ProductDto> {
        Envelope::from_result(
            self.try_update_cost(credential, product_id, cost).await,
            200,
            "Product cost updated",
        )
    }

    /// Set the number of units in stock (absolute).
    pub async fn update_stock(
        &self,
        credential: Option<&str>,
        product_id: &str,
        stock: i64,
    ) -> Envelope<ProductDto> {
        Envelope::from_result(
            self.try_update_stock(credential, product_id, stock).await,
            200,
            "Product stock updated",
        )
    }

    /// Hand a product to another active seller.
    pub async fn transfer_ownership(
        &self,
        credential: Option<&str>,
        product_id: &str,
        new_owner_id: &str,
    ) -> Envelope<ProductDto> {
        let message = format!("The product now belongs to user with ID '{}'", new_owner_id.trim());
        Envelope::from_result(
            self.try_transfer_ownership(credential, product_id, new_owner_id).await,
            200,
            message,
        )
    }

    pub async fn delete_product(&self, credential: Option<&str>, product_id: &str) -> Envelope<ProductDto> {
        Envelope::from_result(
            self.try_delete_product(credential, product_id).await,
            200,
            "Product removed successfully",
        )
    }

    pub async fn restore_product(&self, credential: Option<&str>, product_id: &str) -> Envelope<ProductDto> {
        Envelope::from_result(
            self.try_restore_product(credential, product_id).await,
            200,
            "Product restored successfully",
        )
    }

    // =========================================================================
    // Implementation
    // =========================================================================

    async fn try_list_products(
        &self,
        credential: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ServiceResult<Vec<ProductDto>> {
        self.state.guard().authenticate(credential).await?;
        let (limit, offset) = resolve_page(limit, offset, self.state.config.default_page_size)?;

        let products = self.state.db.products().list_active(limit, offset).await?;
        Ok(products.into_iter().map(ProductDto::from).collect())
    }

    async fn try_get_product(&self, credential: Option<&str>, product_id: &str) -> ServiceResult<ProductDto> {
        self.state.guard().authenticate(credential).await?;
        let product_id = product_id.trim();
        validate_id("productId", product_id)?;

        let product = self
            .state
            .db
            .products()
            .get_active(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        Ok(product.into())
    }

    async fn try_create_product(
        &self,
        credential: Option<&str>,
        name: &str,
        cost: i64,
        stock: i64,
    ) -> ServiceResult<ProductDto> {
        let ctx = self.state.guard().authenticate(credential).await?;
        authorize(Action::CreateProduct, &ctx.account, Resource::None)?;

        validate_product_name(name)?;
        validate_denomination("cost", cost)?;
        validate_stock(stock)?;

        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            owner_id: ctx.account_id.clone(),
            name: name.trim().to_string(),
            cost,
            stock,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let product = self.state.db.products().insert(&product).await?;

        info!(product_id = %product.id, owner_id = %product.owner_id, cost, stock, "Product created");
        Ok(product.into())
    }

    async fn try_update_name(
        &self,
        credential: Option<&str>,
        product_id: &str,
        name: &str,
    ) -> ServiceResult<ProductDto> {
        let (ctx, product) = self.owned_product(credential, product_id).await?;
        validate_product_name(name)?;

        let updated = self
            .state
            .db
            .products()
            .rename(&product.id, &ctx.account_id, name.trim())
            .await?
            .ok_or_else(forbidden)?;

        info!(product_id = %updated.id, "Product renamed");
        Ok(updated.into())
    }

    async fn try_update_cost(
        &self,
        credential: Option<&str>,
        product_id: &str,
        cost: i64,
    ) -> ServiceResult<ProductDto> {
        let (ctx, product) = self.owned_product(credential, product_id).await?;
        validate_denomination("cost", cost)?;

        let updated = self
            .state
            .db
            .products()
            .reprice(&product.id, &ctx.account_id, cost)
            .await?
            .ok_or_else(forbidden)?;

        info!(product_id = %updated.id, cost, "Product repriced");
        Ok(updated.into())
    }

    async fn try_update_stock(
        &self,
        credential: Option<&str>,
        product_id: &str,
        stock: i64,
    ) -> ServiceResult<ProductDto> {
        let (ctx, product) = self.owned_product(credential, product_id).await?;
        validate_stock(stock)?;

        let updated = self
            .state
            .db
            .products()
            .restock(&product.id, &ctx.account_id, stock)
            .await?
            .ok_or_else(forbidden)?;

        info!(product_id = %updated.id, stock, "Product restocked");
        Ok(updated.into())
    }

    async fn try_transfer_ownership(
        &self,
        credential: Option<&str>,
        product_id: &str,
        new_owner_id: &str,
    ) -> ServiceResult<ProductDto> {
        let (ctx, product) = self.owned_product(credential, product_id).await?;
        let new_owner_id = new_owner_id.trim();
        validate_id("userId", new_owner_id)?;

        let target = self.state.db.accounts().get_active(new_owner_id).await?;
        if !matches!(target, Some(ref account) if account.role == Role::Seller) {
            return Err(CoreError::InvalidArgument(format!(
                "User with ID '{new_owner_id}' is not an active seller"
            ))
            .into());
        }

        // Re-checked in the statement; the target may change role meanwhile.
        let updated = self
            .state
            .db
            .products()
            .transfer(&product.id, &ctx.account_id, new_owner_id)
            .await?
            .ok_or_else(forbidden)?;

        info!(product_id = %updated.id, from = %ctx.account_id, to = %new_owner_id, "Product transferred");
        Ok(updated.into())
    }

    async fn try_delete_product(&self, credential: Option<&str>, product_id: &str) -> ServiceResult<ProductDto> {
        let (ctx, product) = self.owned_product(credential, product_id).await?;

        let deleted = self
            .state
            .db
            .products()
            .soft_delete(&product.id, &ctx.account_id)
            .await?
            .ok_or_else(forbidden)?;

        info!(product_id = %deleted.id, "Product deleted");
        Ok(deleted.into())
    }

    async fn try_restore_product(&self, credential: Option<&str>, product_id: &str) -> ServiceResult<ProductDto> {
        let (ctx, product) = self.owned_product(credential, product_id).await?;

        let restored = self
            .state
            .db
            .products()
            .restore(&product.id, &ctx.account_id)
            .await?
            .ok_or_else(forbidden)?;

        info!(product_id = %restored.id, "Product restored");
        Ok(restored.into())
    }

    /// Authenticates the caller and loads a product they own, deleted or not.
    async fn owned_product(
        &self,
        credential: Option<&str>,
        product_id: &str,
    ) -> ServiceResult<(AuthContext, Product)> {
        let ctx = self.state.guard().authenticate(credential).await?;
        let product_id = product_id.trim();
        validate_id("productId", product_id)?;

        let product = self
            .state
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(forbidden)?;
        authorize(Action::ManageProduct, &ctx.account, Resource::Product(&product))?;

        Ok((ctx, product))
    }
}

fn forbidden() -> CoreError {
    CoreError::Forbidden("product".to_string())
}
