//! Wallet overview fan-out and the credit purchase round trip.

#![allow(clippy::unwrap_used)]

use fresh_basket_client::{StubGateway, WalletService};
use fresh_basket_core::Money;
use fresh_basket_integration_tests::MockBackend;

#[tokio::test]
async fn test_overview_combines_wallet_and_packages() {
    let backend = MockBackend::start().await;
    backend.state.set_balance(500.0);

    let service = WalletService::new(backend.client());
    let overview = service.overview().await.unwrap();

    assert_eq!(overview.wallet.balance, Money::from_rupees(500));
    assert_eq!(overview.transactions.len(), 1);
    assert_eq!(overview.packages.len(), 1);
    assert_eq!(overview.packages[0].name, "Saver");

    assert_eq!(backend.state.call_count("wallet"), 1);
    assert_eq!(backend.state.call_count("credit-packages"), 1);
}

#[tokio::test]
async fn test_buy_credits_creates_verifies_and_credits() {
    let backend = MockBackend::start().await;
    backend.state.set_balance(100.0);

    let service = WalletService::new(backend.client());
    let overview = service.overview().await.unwrap();

    let credits = service
        .buy_credits(&overview.packages[0], &StubGateway)
        .await
        .unwrap();
    assert_eq!(credits, Money::from_rupees(550));

    // Verification happened and the balance reflects the purchase
    assert_eq!(backend.state.call_count("wallet/purchase/create-order"), 1);
    assert_eq!(backend.state.call_count("wallet/purchase/verify"), 1);
    let refreshed = service.overview().await.unwrap();
    assert_eq!(refreshed.wallet.balance, Money::from_rupees(650));
}
