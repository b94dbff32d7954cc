//! # Seed Data Generator
//!
//! Populates a marketplace database with demo accounts and products.
//!
//! ## Usage
//! ```bash
//! # Seed the configured database (VEND_DATABASE_PATH, default ./vend.db)
//! cargo run -p vend-service --bin seed
//!
//! # More products per seller
//! cargo run -p vend-service --bin seed -- --count 20
//!
//! # Specify database path
//! cargo run -p vend-service --bin seed -- --db ./data/vend.db
//! ```
//!
//! ## Generated Data
//! - Sellers `seller-1`, `seller-2`, each owning `count` products
//! - Buyers `buyer-1`, `buyer-2`, each with 100 deposited
//! - Every account uses the password `password123`
//!
//! Everything goes through the services, so passwords are hashed and the
//! usual rules apply.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use vend_core::DENOMINATIONS;
use vend_service::{init_tracing, Envelope, Marketplace, TokenResponse, VendConfig};

const PASSWORD: &str = "password123";

const PRODUCT_NAMES: &[&str] = &[
    "Coca-Cola",
    "Sprite",
    "Orange Juice",
    "Iced Tea",
    "Sparkling Water",
    "Potato Chips",
    "Pretzels",
    "Chocolate Bar",
    "Gummy Bears",
    "Granola Bar",
    "Peanuts",
    "Chewing Gum",
];

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config = VendConfig::load().context("loading configuration")?;
    let mut count: usize = 6;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1]
                        .parse()
                        .with_context(|| format!("invalid --count '{}'", args[i + 1]))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vend Marketplace Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Products per seller (default: 6)");
                println!("  -d, --db <PATH>    Database file path (default: $VEND_DATABASE_PATH)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(database = %config.database_path.display(), count, "Seeding marketplace");

    let market = Marketplace::new(config)
        .await
        .context("opening the marketplace database")?;

    let existing = market.state().db.products().count_active().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    let mut created = 0;
    for seller_idx in 1..=2 {
        let credential = sign_up(&market, &format!("seller-{seller_idx}")).await?;
        check(market.accounts().change_role(Some(credential.as_str()), "seller").await)?;

        for product_idx in 0..count {
            let name = PRODUCT_NAMES[(seller_idx * 7 + product_idx) % PRODUCT_NAMES.len()];
            let cost = DENOMINATIONS[product_idx % DENOMINATIONS.len()];
            let stock = ((product_idx * 3) % 20) as i64;

            check(
                market
                    .products()
                    .create_product(Some(credential.as_str()), name, cost, stock)
                    .await,
            )?;
            created += 1;
        }

        check(market.sessions().log_out(Some(credential.as_str())).await)?;
    }

    for buyer_idx in 1..=2 {
        let credential = sign_up(&market, &format!("buyer-{buyer_idx}")).await?;
        check(market.accounts().deposit(Some(credential.as_str()), 100).await)?;
        check(market.sessions().log_out(Some(credential.as_str())).await)?;
    }

    info!(products = created, accounts = 4, "Seed complete");
    market.state().db.close().await;

    Ok(())
}

/// Signs up `username` and returns its `Bearer` credential.
async fn sign_up(market: &Marketplace, username: &str) -> Result<String> {
    let envelope: Envelope<TokenResponse> = market.sessions().sign_up(username, PASSWORD).await;
    let token = check(envelope)?
        .map(|t| t.token)
        .with_context(|| format!("no token issued for {username}"))?;
    Ok(format!("Bearer {token}"))
}

/// Turns a failure envelope into an error.
fn check<T>(envelope: Envelope<T>) -> Result<Option<T>> {
    if envelope.error {
        bail!("{} (status {})", envelope.message, envelope.status);
    }
    Ok(envelope.data)
}
