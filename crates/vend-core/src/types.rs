//! # Domain Types
//!
//! Core domain types used throughout the marketplace.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Account      │   │    Product      │   │    Session      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  owner_id (FK)  │   │  account_id (FK)│       │
//! │  │  username       │   │  name           │   │  token          │       │
//! │  │  balance        │   │  cost (coin)    │   │  created_at     │       │
//! │  │  role           │   │  stock          │   └─────────────────┘       │
//! │  │  deleted_at     │   │  deleted_at     │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │      Role       │   │  AccountView    │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Buyer          │   │  username       │                             │
//! │  │  Seller         │   │  balance, role  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft Delete
//! Accounts and products are never removed. `deleted_at` is set instead, and
//! every "active" query filters on `deleted_at IS NULL`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Role
// =============================================================================

/// What an account is allowed to do in the marketplace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Deposits coins and purchases products.
    #[default]
    Buyer,
    /// Creates and maintains products.
    Seller,
}

impl Role {
    /// Lower-case name as stored and serialized.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["buyer".to_string(), "seller".to_string()],
            }),
        }
    }
}

// =============================================================================
// Account
// =============================================================================

/// A marketplace user.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Account {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Lower-cased, unique login name.
    pub username: String,

    /// Argon2 PHC string. Never serialized.
    #[serde(skip)]
    pub password_hash: String,

    /// Deposited coins in the smallest unit. Always a sum of denominations.
    pub balance: i64,

    pub role: Role,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker.
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Whether the account has been soft-deleted.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the public projection of this account.
    pub fn view(&self) -> AccountView {
        AccountView::from(self)
    }
}

/// The part of an account other users may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountView {
    pub username: String,
    pub balance: i64,
    pub role: Role,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        AccountView {
            username: account.username.clone(),
            balance: account.balance,
            role: account.role,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product offered by a seller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Account that currently owns the product.
    pub owner_id: String,

    /// Display name.
    pub name: String,

    /// Unit price. Always one of the denominations.
    pub cost: i64,

    /// Units available. Never negative.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether the product has been soft-deleted.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Checks if `units` can be taken from stock.
    pub fn can_supply(&self, units: i64) -> bool {
        units > 0 && self.stock - units >= 0
    }

    #[inline]
    pub fn is_owned_by(&self, account_id: &str) -> bool {
        self.owner_id == account_id
    }
}

// =============================================================================
// Session
// =============================================================================

/// Server-side proof that an account is logged in.
///
/// At most one exists per account at a time; it is created on sign-up or
/// login and deleted on logout, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Session {
    pub id: String,
    pub account_id: String,
    pub username: String,
    /// The exact bearer token issued with this session.
    pub token: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
