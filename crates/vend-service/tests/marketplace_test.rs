//! End-to-end marketplace scenarios through the public service API.

use std::sync::Arc;

use tempfile::TempDir;
use vend_service::{AppState, JwtManager, Marketplace, VendConfig};

const PASSWORD: &str = "password123";

async fn in_memory() -> Marketplace {
    Marketplace::new(VendConfig::in_memory()).await.unwrap()
}

/// A file-backed marketplace with a real connection pool.
async fn file_backed(dir: &TempDir) -> Marketplace {
    let config = VendConfig {
        database_path: dir.path().join("vend.db"),
        db_max_connections: 8,
        ..VendConfig::in_memory()
    };
    let state = AppState::new(config).await.unwrap();
    Marketplace::from_state(Arc::new(state))
}

async fn sign_up(market: &Marketplace, username: &str) -> String {
    let envelope = market.sessions().sign_up(username, PASSWORD).await;
    assert!(envelope.is_ok(), "{}", envelope.message);
    format!("Bearer {}", envelope.data.unwrap().token)
}

async fn seller_with_product(market: &Marketplace, cost: i64, stock: i64) -> (String, String) {
    let credential = sign_up(market, "shop").await;
    assert!(market
        .accounts()
        .change_role(Some(credential.as_str()), "seller")
        .await
        .is_ok());

    let product = market
        .products()
        .create_product(Some(credential.as_str()), "Book", cost, stock)
        .await;
    (credential, product.data.unwrap().id)
}

async fn buyer_with(market: &Marketplace, username: &str, deposits: &[i64]) -> String {
    let credential = sign_up(market, username).await;
    for &amount in deposits {
        assert!(market
            .accounts()
            .deposit(Some(credential.as_str()), amount)
            .await
            .is_ok());
    }
    credential
}

// =============================================================================
// Purchases
// =============================================================================

#[tokio::test]
async fn purchase_returns_largest_first_change() {
    let market = in_memory().await;
    let (_, product_id) = seller_with_product(&market, 10, 5).await;
    let buyer = buyer_with(&market, "del", &[100]).await;

    let envelope = market.purchases().buy(Some(buyer.as_str()), &product_id, 2).await;
    let json: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();

    assert_eq!(json["error"], false);
    assert_eq!(json["status"], 200);
    assert_eq!(json["message"], "Purchase was successful");
    assert_eq!(json["data"]["totalCost"], 20);
    assert_eq!(json["data"]["remainingBalance"], 80);
    assert_eq!(json["data"]["change"], serde_json::json!([50, 20, 10]));
    assert_eq!(json["data"]["purchasedProduct"]["amountAvailable"], 3);

    let account = market.accounts().current_account(Some(buyer.as_str())).await;
    assert_eq!(account.data.unwrap().balance, 0);
}

#[tokio::test]
async fn purchase_with_empty_balance_is_rejected() {
    let market = in_memory().await;
    let (_, product_id) = seller_with_product(&market, 10, 5).await;
    let buyer = buyer_with(&market, "del", &[]).await;

    let envelope = market.purchases().buy(Some(buyer.as_str()), &product_id, 1).await;
    assert!(envelope.error);
    assert_eq!(envelope.status, 400);
    assert!(envelope.data.is_none());
}

#[tokio::test]
async fn purchase_beyond_stock_reports_stock() {
    let market = in_memory().await;
    let (seller, product_id) = seller_with_product(&market, 10, 1).await;
    let buyer = buyer_with(&market, "del", &[100]).await;

    let envelope = market.purchases().buy(Some(buyer.as_str()), &product_id, 2).await;
    assert!(envelope.error);
    assert!(envelope.message.contains('1'));

    let product = market.products().get_product(Some(seller.as_str()), &product_id).await;
    assert_eq!(product.data.unwrap().amount_available, 1);
    let account = market.accounts().current_account(Some(buyer.as_str())).await;
    assert_eq!(account.data.unwrap().balance, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_purchases_never_oversell() {
    let dir = TempDir::new().unwrap();
    let market = file_backed(&dir).await;
    let (seller, product_id) = seller_with_product(&market, 10, 5).await;
    let first = buyer_with(&market, "buyer-a", &[50]).await;
    let second = buyer_with(&market, "buyer-b", &[50]).await;

    let a = market.purchases();
    let b = market.purchases();
    let (ra, rb) = tokio::join!(
        a.buy(Some(first.as_str()), &product_id, 3),
        b.buy(Some(second.as_str()), &product_id, 3),
    );

    let successes = [&ra, &rb].iter().filter(|e| e.is_ok()).count();
    assert_eq!(successes, 1);

    let failed = if ra.is_ok() { &rb } else { &ra };
    assert_eq!(failed.status, 500);
    assert!(failed.message.contains("is 2."));

    let product = market.products().get_product(Some(seller.as_str()), &product_id).await;
    assert_eq!(product.data.unwrap().amount_available, 2);

    let mut balances = Vec::new();
    for credential in [&first, &second] {
        let view = market.accounts().current_account(Some(credential.as_str())).await;
        balances.push(view.data.unwrap().balance);
    }
    balances.sort_unstable();
    assert_eq!(balances, vec![0, 50]);
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn second_login_needs_logout() {
    let market = in_memory().await;
    let credential = sign_up(&market, "del").await;

    let again = market.sessions().log_in("del", PASSWORD).await;
    assert!(again.error);
    assert_eq!(again.message, "There is already an active session using your account");

    assert!(market.sessions().log_out(Some(credential.as_str())).await.is_ok());
    assert!(market.sessions().log_in("del", PASSWORD).await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_logins_have_one_winner() {
    let dir = TempDir::new().unwrap();
    let market = file_backed(&dir).await;
    let credential = sign_up(&market, "del").await;
    assert!(market.sessions().log_out(Some(credential.as_str())).await.is_ok());

    let a = market.sessions();
    let b = market.sessions();
    let (ra, rb) = tokio::join!(a.log_in("del", PASSWORD), b.log_in("del", PASSWORD));

    assert_eq!([&ra, &rb].iter().filter(|e| e.is_ok()).count(), 1);
    let loser = if ra.is_ok() { &rb } else { &ra };
    assert_eq!(loser.message, "There is already an active session using your account");
}

// =============================================================================
// Guard
// =============================================================================

#[tokio::test]
async fn missing_credential_is_401() {
    let market = in_memory().await;

    assert_eq!(market.accounts().current_account(None).await.status, 401);
    assert_eq!(market.accounts().current_account(Some("Token abc")).await.status, 401);
}

#[tokio::test]
async fn expired_token_is_401() {
    let config = VendConfig {
        jwt_lifetime_secs: -120,
        ..VendConfig::in_memory()
    };
    let market = Marketplace::new(config).await.unwrap();
    let credential = sign_up(&market, "del").await;

    let envelope = market.accounts().current_account(Some(credential.as_str())).await;
    assert_eq!(envelope.status, 401);
    assert_eq!(envelope.message, "Your session has expired. Please log in again.");
}

#[tokio::test]
async fn foreign_token_is_403() {
    let market = in_memory().await;
    sign_up(&market, "del").await;
    let account = market
        .state()
        .db
        .accounts()
        .get_by_username("del")
        .await
        .unwrap()
        .unwrap();

    let forged = JwtManager::new("not-the-secret", 3600)
        .sign(&account.id, "del")
        .unwrap();
    let envelope = market
        .accounts()
        .current_account(Some(format!("Bearer {forged}").as_str()))
        .await;
    assert_eq!(envelope.status, 403);
}

#[tokio::test]
async fn token_after_logout_is_401() {
    let market = in_memory().await;
    let credential = sign_up(&market, "del").await;
    market.sessions().log_out(Some(credential.as_str())).await;

    let envelope = market.accounts().deposit(Some(credential.as_str()), 10).await;
    assert_eq!(envelope.status, 401);
}

#[tokio::test]
async fn deleted_account_is_401() {
    let market = in_memory().await;
    let credential = sign_up(&market, "del").await;
    assert!(market.accounts().delete_account(Some(credential.as_str())).await.is_ok());

    let envelope = market.accounts().current_account(Some(credential.as_str())).await;
    assert_eq!(envelope.status, 401);
}

// =============================================================================
// Roles and ownership
// =============================================================================

#[tokio::test]
async fn roles_gate_actions() {
    let market = in_memory().await;
    let (seller, product_id) = seller_with_product(&market, 10, 5).await;
    let buyer = buyer_with(&market, "del", &[100]).await;

    let seller_buys = market.purchases().buy(Some(seller.as_str()), &product_id, 1).await;
    assert_eq!(seller_buys.status, 401);
    assert!(seller_buys.message.contains("'buyer'"));

    let buyer_creates = market
        .products()
        .create_product(Some(buyer.as_str()), "Pen", 5, 1)
        .await;
    assert_eq!(buyer_creates.status, 401);
    assert!(buyer_creates.message.contains("'seller'"));

    let buyer_edits = market
        .products()
        .update_cost(Some(buyer.as_str()), &product_id, 5)
        .await;
    assert_eq!(buyer_edits.status, 403);
}
