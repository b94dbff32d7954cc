//! # vend-service: Session Guard, Services and Envelopes
//!
//! The layer every transport calls into. Each public service method takes the
//! caller's raw credential, runs the session guard, applies the marketplace
//! rules from `vend-core` against the `vend-db` store, and returns an
//! [`Envelope`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Marketplace Services                            │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │ SessionService │  │ AccountService │  │  ProductService            ││
//! │  │                │  │                │  │                            ││
//! │  │ • sign_up      │  │ • deposit      │  │ • create_product           ││
//! │  │ • log_in       │  │ • reset_deposit│  │ • update_name/cost/stock   ││
//! │  │ • log_out      │  │ • change_role  │  │ • transfer_ownership       ││
//! │  │ • log_out_all  │  │ • delete/restor│  │ • delete/restore_product   ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐                                                     │
//! │  │PurchaseService │   credential ──► SessionGuard ──► can_perform       │
//! │  │                │                                                     │
//! │  │ • buy          │   every method ──► Envelope { error, message,       │
//! │  └────────────────┘                               status, data }        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure (AppState)                    │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │   SQLite     │  │  JwtManager  │  │    PasswordHasher        ││  │
//! │  │  │  (vend-db)   │  │   (HS256)    │  │    (argon2id)            ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`VendConfig`]):
//! - `VEND_DATABASE_PATH` - SQLite file (default: `vend.db`)
//! - `VEND_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `VEND_JWT_SECRET` - Secret for JWT signing
//! - `VEND_JWT_LIFETIME_SECS` - Token lifetime (default: 1 year)
//! - `VEND_PASSWORD_MEMORY_KIB` / `VEND_PASSWORD_ITERATIONS` - Argon2 cost
//! - `VEND_PAGE_SIZE` - Default listing page size (default: 10)

pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod password;
pub mod services;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use vend_db::Database;

// Re-exports
pub use auth::{Claims, JwtManager, TokenError};
pub use config::{ConfigError, VendConfig};
pub use envelope::Envelope;
pub use error::{ServiceError, ServiceResult};
pub use guard::{AuthContext, SessionGuard};
pub use password::PasswordHasher;
pub use services::{
    account_service::AccountService,
    product_service::{ProductDto, ProductService},
    purchase_service::{PurchaseResult, PurchaseService},
    session_service::{SessionService, TokenResponse},
};

/// Shared application state, built once at startup.
#[derive(Debug)]
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub hasher: PasswordHasher,
    pub config: VendConfig,
}

impl AppState {
    /// Opens the store (running migrations) and builds the verifiers.
    pub async fn new(config: VendConfig) -> ServiceResult<Self> {
        let db = Database::new(config.db_config()).await?;
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs);
        let hasher = PasswordHasher::new(config.password_memory_kib, config.password_iterations)?;

        info!(
            database = %config.database_path.display(),
            max_connections = config.db_max_connections,
            "Application state ready"
        );

        Ok(AppState {
            db,
            jwt,
            hasher,
            config,
        })
    }

    /// Session guard over this state's store and token verifier.
    pub fn guard(&self) -> SessionGuard<'_> {
        SessionGuard::new(&self.db, &self.jwt)
    }
}

/// Entry point bundling every service over one shared state.
#[derive(Debug, Clone)]
pub struct Marketplace {
    state: Arc<AppState>,
}

impl Marketplace {
    /// Builds the state from `config`.
    pub async fn new(config: VendConfig) -> ServiceResult<Self> {
        Ok(Marketplace::from_state(Arc::new(AppState::new(config).await?)))
    }

    pub fn from_state(state: Arc<AppState>) -> Self {
        Marketplace { state }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn sessions(&self) -> SessionService {
        SessionService::new(Arc::clone(&self.state))
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(Arc::clone(&self.state))
    }

    pub fn products(&self) -> ProductService {
        ProductService::new(Arc::clone(&self.state))
    }

    pub fn purchases(&self) -> PurchaseService {
        PurchaseService::new(Arc::clone(&self.state))
    }
}

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG`
/// (default `info`). Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
