//! Session service: sign-up, login and logout.
//!
//! ## Session Lifecycle
//! ```text
//! sign_up ──► account + session (one transaction) ──► token
//! log_in  ──► password ok? ──► no session yet? ──► session ──► token
//!                                   │
//!                                   └── UNIQUE(account_id) decides races
//! log_out ──► delete the session holding this exact token
//! log_out_all ──► delete every session of the account
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use vend_core::validation::{normalize_username, validate_password};
use vend_core::{Account, CoreError, Role, Session};
use vend_db::SESSION_ACCOUNT_UNIQUE;

use crate::envelope::Envelope;
use crate::error::{ServiceError, ServiceResult};
use crate::AppState;

const USERNAME_UNIQUE: &str = "accounts.username";

/// Issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Session service implementation.
#[derive(Debug, Clone)]
pub struct SessionService {
    state: Arc<AppState>,
}

impl SessionService {
    /// Create a new session service.
    pub fn new(state: Arc<AppState>) -> Self {
        SessionService { state }
    }

    /// Create a buyer account and log it in.
    pub async fn sign_up(&self, username: &str, password: &str) -> Envelope<TokenResponse> {
        Envelope::from_result(
            self.try_sign_up(username, password).await,
            201,
            "User created successfully",
        )
    }

    /// Log in with username and password.
    pub async fn log_in(&self, username: &str, password: &str) -> Envelope<TokenResponse> {
        Envelope::from_result(
            self.try_log_in(username, password).await,
            200,
            "User successfully logged in",
        )
    }

    /// End the session holding the presented token.
    pub async fn log_out(&self, credential: Option<&str>) -> Envelope<()> {
        Envelope::from_unit(self.try_log_out(credential).await, "User successfully logged out")
    }

    /// End every session of the caller's account.
    pub async fn log_out_all(&self, credential: Option<&str>) -> Envelope<()> {
        Envelope::from_unit(
            self.try_log_out_all(credential).await,
            "User successfully logged out",
        )
    }

    async fn try_sign_up(&self, username: &str, password: &str) -> ServiceResult<TokenResponse> {
        let username = normalize_username(username)?;
        validate_password(password)?;

        if self.state.db.accounts().get_by_username(&username).await?.is_some() {
            return Err(ServiceError::DuplicateUsername(username));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            username: username.clone(),
            password_hash: self.state.hasher.hash(password)?,
            balance: 0,
            role: Role::default(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let token = self.state.jwt.sign(&account.id, &account.username)?;
        let session = new_session(&account, &token);

        match self.state.db.accounts().register(&account, &session).await {
            Ok(_) => {}
            Err(e) if e.is_unique_violation_on(USERNAME_UNIQUE) => {
                return Err(ServiceError::DuplicateUsername(username));
            }
            Err(e) => return Err(e.into()),
        }

        info!(account_id = %account.id, username = %account.username, "Account created");
        Ok(TokenResponse { token })
    }

    async fn try_log_in(&self, username: &str, password: &str) -> ServiceResult<TokenResponse> {
        let username =
            normalize_username(username).map_err(|_| ServiceError::InvalidCredentials)?;

        let account = self
            .state
            .db
            .accounts()
            .get_by_username(&username)
            .await?
            .filter(|a| !a.is_deleted())
            .ok_or(ServiceError::InvalidCredentials)?;

        if !self.state.hasher.verify(password, &account.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        let session_exists = || {
            ServiceError::Core(CoreError::SessionExists {
                username: account.username.clone(),
            })
        };

        if self.state.db.sessions().find_by_account(&account.id).await?.is_some() {
            return Err(session_exists());
        }

        let token = self.state.jwt.sign(&account.id, &account.username)?;
        let session = new_session(&account, &token);

        match self.state.db.sessions().insert(&session).await {
            Ok(()) => {}
            Err(e) if e.is_unique_violation_on(SESSION_ACCOUNT_UNIQUE) => {
                return Err(session_exists());
            }
            Err(e) => return Err(e.into()),
        }

        info!(account_id = %account.id, "Logged in");
        Ok(TokenResponse { token })
    }

    async fn try_log_out(&self, credential: Option<&str>) -> ServiceResult<()> {
        let ctx = self.state.guard().authenticate(credential).await?;

        let removed = self.state.db.sessions().delete_by_token(&ctx.token).await?;
        if removed == 0 {
            // Another logout won the race.
            return Err(ServiceError::NoActiveSession);
        }

        info!(account_id = %ctx.account_id, "Logged out");
        Ok(())
    }

    async fn try_log_out_all(&self, credential: Option<&str>) -> ServiceResult<()> {
        let ctx = self.state.guard().authenticate(credential).await?;

        let removed = self
            .state
            .db
            .sessions()
            .delete_for_account(&ctx.account_id)
            .await?;
        if removed == 0 {
            return Err(ServiceError::NoActiveSession);
        }

        info!(account_id = %ctx.account_id, removed, "Logged out everywhere");
        Ok(())
    }
}

fn new_session(account: &Account, token: &str) -> Session {
    Session {
        id: Uuid::new_v4().to_string(),
        account_id: account.id.clone(),
        username: account.username.clone(),
        token: token.to_string(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::marketplace;

    #[tokio::test]
    async fn test_sign_up() {
        let market = marketplace().await;

        let envelope = market.sessions().sign_up("  Del ", "password123").await;
        assert!(envelope.is_ok());
        assert_eq!(envelope.status, 201);
        assert_eq!(envelope.message, "User created successfully");

        let account = market
            .state()
            .db
            .accounts()
            .get_by_username("del")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.role, Role::Buyer);
        assert_eq!(account.balance, 0);
        assert!(account.password_hash.starts_with("$argon2id$"));

        // Signed up means logged in.
        let session = market
            .state()
            .db
            .sessions()
            .find_by_account(&account.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.token, envelope.data.unwrap().token);
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_username() {
        let market = marketplace().await;
        market.sessions().sign_up("del", "password123").await;

        let envelope = market.sessions().sign_up("DEL", "password456").await;
        assert!(!envelope.is_ok());
        assert_eq!(envelope.status, 400);
        assert_eq!(envelope.message, "User with username 'del' already exists");
    }

    #[tokio::test]
    async fn test_sign_up_validation() {
        let market = marketplace().await;

        assert_eq!(market.sessions().sign_up("", "password123").await.status, 400);
        assert_eq!(market.sessions().sign_up("del", "short").await.status, 400);
        assert_eq!(market.sessions().sign_up("d e l", "password123").await.status, 400);
    }

    #[tokio::test]
    async fn test_log_in_requires_logout_first() {
        let market = marketplace().await;
        let signed_up = market.sessions().sign_up("del", "password123").await;
        let credential = format!("Bearer {}", signed_up.data.unwrap().token);

        let second = market.sessions().log_in("del", "password123").await;
        assert!(!second.is_ok());
        assert_eq!(second.status, 500);
        assert_eq!(
            second.message,
            "There is already an active session using your account"
        );

        let logged_out = market.sessions().log_out(Some(credential.as_str())).await;
        assert!(logged_out.is_ok());
        assert_eq!(logged_out.message, "User successfully logged out");

        let third = market.sessions().log_in("del", "password123").await;
        assert!(third.is_ok());
        assert_eq!(third.status, 200);
        assert_eq!(third.message, "User successfully logged in");
    }

    #[tokio::test]
    async fn test_log_in_invalid_credentials() {
        let market = marketplace().await;
        market.sessions().sign_up("del", "password123").await;

        let wrong_password = market.sessions().log_in("del", "password999").await;
        let unknown_user = market.sessions().log_in("nobody", "password123").await;

        assert_eq!(wrong_password.status, 401);
        assert_eq!(unknown_user.status, 401);
        assert_eq!(wrong_password.message, unknown_user.message);
    }

    #[tokio::test]
    async fn test_log_out_all() {
        let market = marketplace().await;
        let signed_up = market.sessions().sign_up("del", "password123").await;
        let credential = format!("Bearer {}", signed_up.data.unwrap().token);

        assert!(market.sessions().log_out_all(Some(credential.as_str())).await.is_ok());

        // The token is dead now.
        let again = market.sessions().log_out(Some(credential.as_str())).await;
        assert_eq!(again.status, 401);
    }

    #[tokio::test]
    async fn test_log_out_without_credential() {
        let market = marketplace().await;
        let envelope = market.sessions().log_out(None).await;
        assert_eq!(envelope.status, 401);
    }
}
