//! # Validation Module
//!
//! Input validation for the marketplace.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (outside this workspace)                           │
//! │  └── Body shape, required keys                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: vend-service                                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (cost IN (...))                         │
//! │  └── UNIQUE username, UNIQUE session per account                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vend_core::validation::{normalize_username, validate_denomination};
//!
//! assert_eq!(normalize_username("  Del ").unwrap(), "del");
//! assert!(validate_denomination("deposit amount", 20).is_ok());
//! ```

use crate::coin::is_denomination;
use crate::error::{CoreError, ValidationError};
use crate::{MAX_PAGE_SIZE, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates and lower-cases a username.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 50 characters
/// - ASCII lowercase letters, digits, `_`, `-`, `.` only (after lower-casing)
///
/// ## Returns
/// The trimmed, lower-cased username that is stored and compared.
pub fn normalize_username(username: &str) -> ValidationResult<String> {
    let username = username.trim().to_lowercase();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LENGTH,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only lowercase ASCII letters, digits, '_', '-' and '.'".to_string(),
        });
    }

    Ok(username)
}

/// Validates a password before it is hashed.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
///
/// ## Example
/// ```rust
/// use vend_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Book").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "productName".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "productName".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an identifier supplied by a caller (product or account id).
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Checks that a coin value is one of the accepted denominations.
pub fn validate_denomination(field: &str, value: i64) -> Result<(), CoreError> {
    if !is_denomination(value) {
        return Err(CoreError::InvalidDenomination {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Validates a stock level.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero means sold out
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "amountAvailable".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Resolves a listing page from optional caller input.
///
/// ## Rules
/// - Missing limit falls back to `default_limit`
/// - Limit must be between 1 and 100
/// - Missing offset is 0
pub fn resolve_page(
    limit: Option<u32>,
    offset: Option<u32>,
    default_limit: u32,
) -> ValidationResult<(u32, u32)> {
    let limit = limit.unwrap_or(default_limit);

    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_SIZE as i64,
        });
    }

    Ok((limit, offset.unwrap_or(0)))
}

// =============================================================================
// Unit Tests
// =============================================================================
