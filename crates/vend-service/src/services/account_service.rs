//! Account service: balance, role and account lifecycle.
//!
//! Every method except [`AccountService::restore_account`] runs behind the
//! session guard and [`authorize`].

use std::sync::Arc;

use tracing::info;
use vend_core::validation::{normalize_username, resolve_page, validate_denomination};
use vend_core::{authorize, AccountView, Action, CoreError, Resource, Role};

use crate::envelope::Envelope;
use crate::error::{ServiceError, ServiceResult};
use crate::AppState;

/// Account service implementation.
#[derive(Debug, Clone)]
pub struct AccountService {
    state: Arc<AppState>,
}

impl AccountService {
    /// Create a new account service.
    pub fn new(state: Arc<AppState>) -> Self {
        AccountService { state }
    }

    /// The caller's own public view.
    pub async fn current_account(&self, credential: Option<&str>) -> Envelope<AccountView> {
        let result = self
            .state
            .guard()
            .authenticate(credential)
            .await
            .map(|ctx| ctx.account.view());
        Envelope::from_result(result, 200, "")
    }

    /// Public views of active accounts, one page at a time.
    pub async fn list_accounts(
        &self,
        credential: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Envelope<Vec<AccountView>> {
        Envelope::from_result(self.try_list_accounts(credential, limit, offset).await, 200, "")
    }

    /// Add one coin to the caller's balance. Buyers only.
    pub async fn deposit(&self, credential: Option<&str>, amount: i64) -> Envelope<AccountView> {
        Envelope::from_result(
            self.try_deposit(credential, amount).await,
            200,
            "User deposited funds successfully",
        )
    }

    /// Set the caller's balance to 0. Buyers only.
    pub async fn reset_deposit(&self, credential: Option<&str>) -> Envelope<AccountView> {
        Envelope::from_result(
            self.try_reset_deposit(credential).await,
            200,
            "User deposit reset successfully",
        )
    }

    /// Switch the caller between `buyer` and `seller`.
    pub async fn change_role(&self, credential: Option<&str>, role: &str) -> Envelope<AccountView> {
        Envelope::from_result(
            self.try_change_role(credential, role).await,
            200,
            "User updated successfully",
        )
    }

    /// Soft-delete the caller's account and end all of its sessions.
    pub async fn delete_account(&self, credential: Option<&str>) -> Envelope<()> {
        Envelope::from_unit(
            self.try_delete_account(credential).await,
            "User deleted successfully",
        )
    }

    /// Undo a soft delete. Takes credentials, since a deleted account
    /// cannot pass the session guard. Does not log in.
    pub async fn restore_account(&self, username: &str, password: &str) -> Envelope<AccountView> {
        Envelope::from_result(
            self.try_restore_account(username, password).await,
            200,
            "User restored successfully",
        )
    }

    async fn try_list_accounts(
        &self,
        credential: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ServiceResult<Vec<AccountView>> {
        self.state.guard().authenticate(credential).await?;
        let (limit, offset) = resolve_page(limit, offset, self.state.config.default_page_size)?;

        let accounts = self.state.db.accounts().list_active(limit, offset).await?;
        Ok(accounts.iter().map(AccountView::from).collect())
    }

    async fn try_deposit(&self, credential: Option<&str>, amount: i64) -> ServiceResult<AccountView> {
        let ctx = self.state.guard().authenticate(credential).await?;
        authorize(Action::Deposit, &ctx.account, Resource::None)?;
        validate_denomination("deposit amount", amount)?;

        let account = self
            .state
            .db
            .accounts()
            .deposit(&ctx.account_id, amount)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        info!(account_id = %account.id, amount, balance = account.balance, "Deposit accepted");
        Ok(account.view())
    }

    async fn try_reset_deposit(&self, credential: Option<&str>) -> ServiceResult<AccountView> {
        let ctx = self.state.guard().authenticate(credential).await?;
        authorize(Action::ResetDeposit, &ctx.account, Resource::None)?;

        let account = self
            .state
            .db
            .accounts()
            .reset_balance(&ctx.account_id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        info!(account_id = %account.id, "Deposit reset");
        Ok(account.view())
    }

    async fn try_change_role(&self, credential: Option<&str>, role: &str) -> ServiceResult<AccountView> {
        let ctx = self.state.guard().authenticate(credential).await?;
        let role: Role = role.parse()?;
        authorize(Action::ManageAccount, &ctx.account, Resource::Account(&ctx.account))?;

        let account = self
            .state
            .db
            .accounts()
            .set_role(&ctx.account_id, role)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        info!(account_id = %account.id, role = %account.role, "Role changed");
        Ok(account.view())
    }

    async fn try_delete_account(&self, credential: Option<&str>) -> ServiceResult<()> {
        let ctx = self.state.guard().authenticate(credential).await?;
        authorize(Action::ManageAccount, &ctx.account, Resource::Account(&ctx.account))?;

        self.state
            .db
            .accounts()
            .soft_delete(&ctx.account_id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        info!(account_id = %ctx.account_id, "Account deleted");
        Ok(())
    }

    async fn try_restore_account(&self, username: &str, password: &str) -> ServiceResult<AccountView> {
        let username =
            normalize_username(username).map_err(|_| ServiceError::InvalidCredentials)?;

        let account = self
            .state
            .db
            .accounts()
            .get_by_username(&username)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !self.state.hasher.verify(password, &account.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        if !account.is_deleted() {
            return Err(CoreError::InvalidArgument(format!(
                "The account '{}' has not been deleted",
                account.username
            ))
            .into());
        }

        let restored = self
            .state
            .db
            .accounts()
            .restore(&account.id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        info!(account_id = %restored.id, "Account restored");
        Ok(restored.view())
    }
}
