//! # Error Types
//!
//! Domain-specific error types for vend-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vend-core errors (this file)                                          │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vend-db errors (separate crate)                                       │
//! │  └── DbError          - Store failures, Rejected(CoreError)            │
//! │                                                                         │
//! │  vend-service errors                                                   │
//! │  └── ServiceError     - Adds guard failures, maps to a status          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ServiceError → Envelope │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `Display` text of every variant is shown to the user as-is, so domain
//! variants carry the figure the UI needs (current stock, required role).

use thiserror::Error;

use crate::types::Role;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required argument is missing, zero, or out of range.
    #[error("{0}")]
    InvalidArgument(String),

    /// A coin value outside the accepted denominations.
    #[error("The {field} has to be one of 5, 10, 20, 50, or 100 cent coins (got {value})")]
    InvalidDenomination { field: String, value: i64 },

    /// Product is absent or soft-deleted.
    #[error("Product with ID '{0}' not found")]
    ProductNotFound(String),

    /// Account is absent or soft-deleted.
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    /// Requested more units than the product has.
    ///
    /// ## User Workflow
    /// ```text
    /// Buy (units: 2)
    ///      │
    ///      ▼
    /// Check stock: available=1
    ///      │
    ///      ▼
    /// InsufficientStock { available: 1, requested: 2 }
    ///      │
    ///      ▼
    /// UI shows: "... the total number in stock for the product is 1."
    /// ```
    #[error(
        "Cannot fulfil purchase for this product since the total number in stock for the product is {available}."
    )]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Total cost exceeds the buyer's balance.
    #[error(
        "You do not have enough balance to purchase this product (balance {balance}, required {required})"
    )]
    InsufficientFunds { balance: i64, required: i64 },

    /// Actor lacks the role the action needs.
    #[error("Only users with the '{required}' role can {action}")]
    RoleRequired { required: Role, action: String },

    /// Resource missing or owned by someone else. Deliberately ambiguous.
    #[error("The {0} was not updated. It may not exist or it does not belong to you.")]
    Forbidden(String),

    /// The account already holds a session.
    #[error("There is already an active session using your account")]
    SessionExists { username: String },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("The '{field}' field is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
