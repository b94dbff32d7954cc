//! # Authorization Rules
//!
//! One function decides whether an actor may perform an action on a
//! resource. Services call [`authorize`] before every mutation.
//!
//! ```text
//! ┌──────────────────┬────────────────────────────────────────────┐
//! │ Action           │ Rule                                       │
//! ├──────────────────┼────────────────────────────────────────────┤
//! │ Deposit          │ actor.role == Buyer                        │
//! │ ResetDeposit     │ actor.role == Buyer                        │
//! │ Purchase         │ actor.role == Buyer                        │
//! │ CreateProduct    │ actor.role == Seller                       │
//! │ ManageProduct    │ product.owner_id == actor.id               │
//! │ ManageAccount    │ account.id == actor.id                     │
//! │ Read             │ any authenticated actor                    │
//! └──────────────────┴────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{Account, Product, Role};

/// Something an authenticated account wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Deposit,
    ResetDeposit,
    Purchase,
    CreateProduct,
    /// Rename, reprice, restock, transfer, delete or restore a product.
    ManageProduct,
    /// Change role, delete the account.
    ManageAccount,
    Read,
}

impl Action {
    /// Role the action is reserved for, if any.
    pub const fn required_role(&self) -> Option<Role> {
        match self {
            Action::Deposit | Action::ResetDeposit | Action::Purchase => Some(Role::Buyer),
            Action::CreateProduct => Some(Role::Seller),
            Action::ManageProduct | Action::ManageAccount | Action::Read => None,
        }
    }

    /// Phrase used in "Only users with the 'x' role can ..." messages.
    pub const fn describe(&self) -> &'static str {
        match self {
            Action::Deposit => "deposit coins",
            Action::ResetDeposit => "reset their deposit",
            Action::Purchase => "purchase a product",
            Action::CreateProduct => "create a product",
            Action::ManageProduct => "manage this product",
            Action::ManageAccount => "manage this account",
            Action::Read => "read",
        }
    }
}

/// What the action targets.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    None,
    Product(&'a Product),
    Account(&'a Account),
}

/// Returns whether `actor` may perform `action` on `resource`.
pub fn can_perform(action: Action, actor: &Account, resource: Resource<'_>) -> bool {
    if actor.is_deleted() {
        return false;
    }

    if let Some(role) = action.required_role() {
        if actor.role != role {
            return false;
        }
    }

    match (action, resource) {
        (Action::ManageProduct, Resource::Product(product)) => product.is_owned_by(&actor.id),
        (Action::ManageProduct, _) => false,
        (Action::ManageAccount, Resource::Account(account)) => account.id == actor.id,
        (Action::ManageAccount, Resource::None) => true,
        (Action::ManageAccount, Resource::Product(_)) => false,
        _ => true,
    }
}

/// [`can_perform`] as a `Result` carrying the user-facing reason.
///
/// Role failures name the required role; ownership failures never reveal
/// whether the resource exists.
pub fn authorize(action: Action, actor: &Account, resource: Resource<'_>) -> CoreResult<()> {
    if can_perform(action, actor, resource) {
        return Ok(());
    }

    match action.required_role() {
        Some(required) if actor.role != required => Err(CoreError::RoleRequired {
            required,
            action: action.describe().to_string(),
        }),
        _ => {
            let target = match resource {
                Resource::Account(_) => "account",
                _ => "product",
            };
            Err(CoreError::Forbidden(target.to_string()))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
