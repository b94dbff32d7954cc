//! # Service Error Type
//!
//! Unified error type for every service entry point.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError ──► CoreError ──────────────┐                          │
//! │                                              │                          │
//! │  sqlx::Error ──► DbError ── Rejected(Core) ──┼──► ServiceError          │
//! │                     └─── anything else ──────┤      │ status()         │
//! │                            (logged, generic) │      │ to_string()      │
//! │  TokenError / guard failures ────────────────┘      ▼                   │
//! │                                               Envelope { error: true } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Codes
//! ```text
//! 400  Validation, InvalidArgument, InvalidDenomination, DuplicateUsername
//! 401  AuthenticationMissing, TokenExpired, NoActiveSession,
//!      AccountNotFound, InvalidCredentials, RoleRequired
//! 403  TokenInvalid, Forbidden
//! 500  ProductNotFound, InsufficientStock, InsufficientFunds,
//!      SessionExists, Internal
//! ```

use thiserror::Error;
use tracing::error;
use vend_core::CoreError;
use vend_db::DbError;

/// Message shown for every internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "There was an internal server error";

/// Errors returned by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No credential, or not `Bearer <token>`.
    #[error("You do not seem to be logged in. Please log in.")]
    AuthenticationMissing,

    #[error("Your session has expired. Please log in again.")]
    TokenExpired,

    /// Signature, format or claim check failed.
    #[error("The authentication token is invalid")]
    TokenInvalid,

    /// Token verified but no session holds it (logged out, or replaced).
    #[error("You do not seem to be logged in. Please log in.")]
    NoActiveSession,

    /// Token subject no longer resolves to an active account.
    #[error("The account for this session no longer exists")]
    AccountNotFound,

    /// Unknown username or wrong password; deliberately the same message.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User with username '{0}' already exists")]
    DuplicateUsername(String),

    /// Domain rule violation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Store or infrastructure failure. The detail is logged, never shown.
    #[error("There was an internal server error")]
    Internal(String),
}

impl ServiceError {
    /// Creates an internal error and logs its detail.
    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!(detail = %detail, "Internal service error");
        ServiceError::Internal(detail)
    }

    /// Status code placed in the envelope.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::AuthenticationMissing
            | ServiceError::TokenExpired
            | ServiceError::NoActiveSession
            | ServiceError::AccountNotFound
            | ServiceError::InvalidCredentials => 401,
            ServiceError::TokenInvalid => 403,
            ServiceError::DuplicateUsername(_) => 400,
            ServiceError::Core(core) => core_status(core),
            ServiceError::Internal(_) => 500,
        }
    }

    /// Whether the failure is a guard rejection (logged at `warn`).
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            ServiceError::AuthenticationMissing
                | ServiceError::TokenExpired
                | ServiceError::TokenInvalid
                | ServiceError::NoActiveSession
                | ServiceError::AccountNotFound
                | ServiceError::InvalidCredentials
        )
    }
}

fn core_status(err: &CoreError) -> u16 {
    match err {
        CoreError::Validation(_)
        | CoreError::InvalidArgument(_)
        | CoreError::InvalidDenomination { .. } => 400,
        CoreError::RoleRequired { .. } => 401,
        CoreError::Forbidden(_) => 403,
        CoreError::ProductNotFound(_)
        | CoreError::AccountNotFound(_)
        | CoreError::InsufficientStock { .. }
        | CoreError::InsufficientFunds { .. }
        | CoreError::SessionExists { .. } => 500,
    }
}

/// Converts database errors to service errors.
///
/// Domain rejections pass through; everything else becomes a logged,
/// generic internal error.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rejected(core) => ServiceError::Core(core),
            other => ServiceError::internal(other.to_string()),
        }
    }
}

impl From<crate::auth::TokenError> for ServiceError {
    fn from(err: crate::auth::TokenError) -> Self {
        use crate::auth::TokenError;

        match err {
            TokenError::Expired => ServiceError::TokenExpired,
            TokenError::Invalid(_) => ServiceError::TokenInvalid,
            TokenError::Signing(detail) => ServiceError::internal(detail),
        }
    }
}

impl From<vend_core::ValidationError> for ServiceError {
    fn from(err: vend_core::ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
