//! # Repository Module
//!
//! Database repository implementations for the marketplace.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service call                                                          │
//! │       │                                                                 │
//! │       │  db.products().rename(id, owner_id, "Book")                    │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_active(&self, id)                                             │
//! │  ├── insert(&self, product)                                            │
//! │  └── rename / reprice / restock / transfer / soft_delete / restore     │
//! │       │                                                                 │
//! │       │  One SQL statement (or one transaction)                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Owner-scoped updates put the ownership test in the `WHERE` clause and
//! return `Ok(None)` when no row matched, so a missing product and a product
//! owned by someone else look the same to the caller.
//!
//! ## Available Repositories
//!
//! - [`AccountRepository`](account::AccountRepository) - Accounts and balances
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD
//! - [`SessionRepository`](session::SessionRepository) - Login sessions
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - Atomic purchase

pub mod account;
pub mod product;
pub mod purchase;
pub mod session;

/// Column list shared by every `SELECT`/`RETURNING` on `accounts`.
pub(crate) const ACCOUNT_COLUMNS: &str =
    "id, username, password_hash, balance, role, created_at, updated_at, deleted_at";

/// Column list shared by every `SELECT`/`RETURNING` on `products`.
pub(crate) const PRODUCT_COLUMNS: &str =
    "id, owner_id, name, cost, stock, created_at, updated_at, deleted_at";

/// Column list for `sessions`.
pub(crate) const SESSION_COLUMNS: &str = "id, account_id, username, token, created_at";
