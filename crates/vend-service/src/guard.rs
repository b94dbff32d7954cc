//! # Session Guard
//!
//! Resolves a credential to the acting account before any service runs.
//!
//! ## Checks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  credential: Option<&str>                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. "Bearer <token>", token non-empty ──── no ──► AuthenticationMissing│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. JWT verifies (HS256) ─── expired ──► TokenExpired                   │
//! │       │                  └── other ────► TokenInvalid                   │
//! │       ▼                                                                 │
//! │  3. session row with this exact token, ── no ──► NoActiveSession       │
//! │     owned by the token's subject                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. subject is an active account ──────── no ──► AccountNotFound       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AuthContext { account snapshot, role, token }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Read-only. Stops at the first failing check.

use tracing::debug;
use vend_core::{Account, Role};
use vend_db::Database;

use crate::auth::{extract_bearer_token, JwtManager};
use crate::error::{ServiceError, ServiceResult};

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account_id: String,
    pub username: String,
    pub role: Role,
    /// Account as read during authentication; services don't re-fetch it.
    pub account: Account,
    /// The bearer token that was presented.
    pub token: String,
}

/// Validates credentials against the token verifier and the session store.
#[derive(Debug, Clone, Copy)]
pub struct SessionGuard<'a> {
    db: &'a Database,
    jwt: &'a JwtManager,
}

impl<'a> SessionGuard<'a> {
    pub fn new(db: &'a Database, jwt: &'a JwtManager) -> Self {
        SessionGuard { db, jwt }
    }

    /// Runs every check and returns the caller's context.
    pub async fn authenticate(&self, credential: Option<&str>) -> ServiceResult<AuthContext> {
        let token = credential
            .and_then(extract_bearer_token)
            .ok_or(ServiceError::AuthenticationMissing)?;

        let claims = self.jwt.verify(token)?;

        let session = self
            .db
            .sessions()
            .find_by_token(token)
            .await?
            .filter(|s| s.account_id == claims.sub)
            .ok_or(ServiceError::NoActiveSession)?;

        let account = self
            .db
            .accounts()
            .get_active(&session.account_id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        debug!(account_id = %account.id, role = %account.role, "Authenticated");

        Ok(AuthContext {
            account_id: account.id.clone(),
            username: account.username.clone(),
            role: account.role,
            account,
            token: token.to_string(),
        })
    }
}
