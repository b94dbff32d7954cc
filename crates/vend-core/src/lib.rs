//! # vend-core: Pure Business Logic for the Vend Marketplace
//!
//! This crate contains all marketplace rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vend Marketplace Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    vend-service                                 │   │
//! │  │    Session guard ──► Services ──► Purchase engine ──► Envelope  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vend-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   coin    │  │ purchase  │  │   authz   │  │   │
//! │  │   │  Account  │  │  change   │  │   plan    │  │ can_perf. │  │   │
//! │  │   │  Product  │  │  (greedy) │  │  checks   │  │  roles    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vend-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Account, Product, Session, Role)
//! - [`coin`] - Denominations and change calculation
//! - [`purchase`] - Purchase preconditions and planning
//! - [`authz`] - Role and ownership rules
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use vend_core::coin::compute_change;
//!
//! // Balance 100, spent 20: change is given largest coin first
//! assert_eq!(compute_change(80), vec![50, 20, 10]);
//!
//! // No change still yields a single placeholder entry
//! assert_eq!(compute_change(0), vec![0]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod authz;
pub mod coin;
pub mod error;
pub mod purchase;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use authz::{authorize, can_perform, Action, Resource};
pub use coin::{compute_change, is_denomination, DENOMINATIONS};
pub use error::{CoreError, CoreResult, ValidationError};
pub use purchase::{plan_purchase, validate_purchase, PurchasePlan};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a listing call does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on any listing page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Minimum accepted password length at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length (after trimming and lower-casing).
pub const MAX_USERNAME_LENGTH: usize = 50;
