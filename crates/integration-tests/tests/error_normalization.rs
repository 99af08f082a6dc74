//! Error-envelope normalization and the session token round trip.

#![allow(clippy::unwrap_used)]

use fresh_basket_client::ApiError;
use fresh_basket_client::api::types::LoginRequest;
use fresh_basket_core::{Email, PackId, UserId};
use fresh_basket_integration_tests::{MockBackend, TEST_USER_ID};

#[tokio::test]
async fn test_backend_error_message_reaches_the_caller() {
    let backend = MockBackend::start().await;
    let client = backend.anonymous_client();

    let err = client.pack_details(PackId::new(99)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m == "Pack not found"));
}

#[tokio::test]
async fn test_rejected_login_maps_to_unauthenticated() {
    let backend = MockBackend::start().await;
    let client = backend.anonymous_client();

    let err = client
        .login(&LoginRequest {
            email: Email::parse("asha@example.com").unwrap(),
            password: "wrong".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
    assert!(!client.has_token());
}

#[tokio::test]
async fn test_login_installs_the_session_token() {
    let backend = MockBackend::start().await;
    let client = backend.anonymous_client();
    assert!(!client.has_token());

    let response = client
        .login(&LoginRequest {
            email: Email::parse("asha@example.com").unwrap(),
            password: "secret".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(response.user.id, UserId::new(TEST_USER_ID));
    assert!(client.has_token());

    // Authenticated calls now succeed against the mock
    let items = client.cart(UserId::new(TEST_USER_ID)).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_unauthenticated_call_fails_before_the_wire() {
    let backend = MockBackend::start().await;
    let client = backend.anonymous_client();

    let err = client.cart(UserId::new(TEST_USER_ID)).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
    assert_eq!(backend.state.call_count("cart"), 0);
}
