//! End-to-end checkout against the mock backend: deduction ordering,
//! shortfall handling, and cart-clear tolerance.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use chrono::Utc;
use fresh_basket_client::checkout::{CheckoutReconciler, CheckoutRequest};
use fresh_basket_client::{ApiClient, ApiError};
use fresh_basket_core::{Money, PaymentMethod, TransactionId, UserId};
use fresh_basket_integration_tests::{MockBackend, TEST_USER_ID, two_line_cart};

async fn request(client: &ApiClient, method: PaymentMethod) -> CheckoutRequest {
    let items = client
        .cart(UserId::new(TEST_USER_ID))
        .await
        .expect("Failed to fetch cart");
    CheckoutRequest {
        user_id: UserId::new(TEST_USER_ID),
        items,
        delivery_address: "42 Park St, Kochi".to_owned(),
        time_slot: "9 AM - 11 AM".to_owned(),
        delivery_date: Utc::now(),
        payment_method: method,
    }
}

#[tokio::test]
async fn test_wallet_checkout_deducts_then_orders_then_clears() {
    let backend = MockBackend::start().await;
    backend.state.seed_cart(two_line_cart());
    backend.state.set_balance(500.0);

    let client = backend.client();
    let reconciler = CheckoutReconciler::new(client.clone());
    let outcome = reconciler
        .checkout(&request(&client, PaymentMethod::Wallet).await)
        .await
        .expect("Checkout failed");

    assert_eq!(outcome.wallet_transaction_id, Some(TransactionId::new(77)));
    assert!(outcome.cart_cleared);
    assert_eq!(outcome.order.total_amount, Money::from_rupees(200));
    assert_eq!(outcome.order.quantity, 3);

    // Balance dropped by the full pre-discount cart total
    assert!((backend.state.balance() - 300.0).abs() < f64::EPSILON);

    // Deduction strictly precedes order creation, which precedes the clear
    let calls = backend.state.calls();
    let deduct = calls.iter().position(|c| c == "wallet/deduct").unwrap();
    let order = calls.iter().position(|c| c == "orders").unwrap();
    let clear = calls.iter().position(|c| c == "cart/clear").unwrap();
    assert!(deduct < order);
    assert!(order < clear);
}

#[tokio::test]
async fn test_insufficient_balance_stops_before_order_creation() {
    let backend = MockBackend::start().await;
    backend.state.seed_cart(two_line_cart());
    backend.state.set_balance(50.0);

    let client = backend.client();
    let reconciler = CheckoutReconciler::new(client.clone());
    let err = reconciler
        .checkout(&request(&client, PaymentMethod::Wallet).await)
        .await
        .expect_err("Checkout should fail on a shortfall");

    assert!(matches!(err, ApiError::InsufficientBalance(_)));
    assert_eq!(backend.state.call_count("orders"), 0);
    assert_eq!(backend.state.call_count("cart/clear"), 0);
    assert!(backend.state.orders().is_empty());
    // The failed attempt must not touch the balance
    assert!((backend.state.balance() - 50.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_cod_checkout_never_touches_the_wallet() {
    let backend = MockBackend::start().await;
    backend.state.seed_cart(two_line_cart());

    let client = backend.client();
    let reconciler = CheckoutReconciler::new(client.clone());
    let outcome = reconciler
        .checkout(&request(&client, PaymentMethod::Cod).await)
        .await
        .expect("Checkout failed");

    assert_eq!(outcome.wallet_transaction_id, None);
    assert_eq!(backend.state.call_count("wallet/deduct"), 0);

    let orders = backend.state.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["paymentMethod"], "cod");
    assert!(orders[0].get("walletTransactionId").is_none());
}

#[tokio::test]
async fn test_cart_clear_failure_does_not_fail_the_order() {
    let backend = MockBackend::start().await;
    backend.state.seed_cart(two_line_cart());
    backend.state.fail_clear_cart.store(true, Ordering::SeqCst);

    let client = backend.client();
    let reconciler = CheckoutReconciler::new(client.clone());
    let outcome = reconciler
        .checkout(&request(&client, PaymentMethod::Cod).await)
        .await
        .expect("Checkout must survive a failed cart clear");

    assert!(!outcome.cart_cleared);
    assert_eq!(backend.state.call_count("cart/clear"), 1);
    assert_eq!(backend.state.orders().len(), 1);
}

#[tokio::test]
async fn test_empty_cart_is_rejected_without_network_calls() {
    let backend = MockBackend::start().await;

    let client = backend.client();
    let reconciler = CheckoutReconciler::new(client.clone());
    let err = reconciler
        .checkout(&request(&client, PaymentMethod::Wallet).await)
        .await
        .expect_err("Empty cart must not check out");

    assert!(matches!(err, ApiError::UserError(_)));
    assert_eq!(backend.state.call_count("wallet/deduct"), 0);
    assert_eq!(backend.state.call_count("orders"), 0);
}
