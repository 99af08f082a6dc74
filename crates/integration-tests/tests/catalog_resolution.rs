//! Catalog resolution against the mock backend: name lookups, tier
//! resolution, thresholds, and session caching.

#![allow(clippy::unwrap_used)]

use fresh_basket_client::catalog::pack_display_price;
use fresh_basket_client::{ApiError, CatalogResolver};
use fresh_basket_core::{CategoryId, Money, PackDuration, PackId};
use fresh_basket_integration_tests::MockBackend;

#[tokio::test]
async fn test_resolve_category_by_exact_name() {
    let backend = MockBackend::start().await;
    let resolver = CatalogResolver::new(backend.anonymous_client());

    let id = resolver.resolve_category_id("Fruits Pack").await.unwrap();
    assert_eq!(id, CategoryId::new(1));

    let err = resolver
        .resolve_category_id("Mystery Pack")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m.contains("Mystery Pack")));
}

#[tokio::test]
async fn test_resolve_small_pack_and_display_price() {
    let backend = MockBackend::start().await;
    let resolver = CatalogResolver::new(backend.anonymous_client());

    let pack = resolver
        .resolve_pack_by_duration(CategoryId::new(1), PackDuration::Small)
        .await
        .unwrap();
    assert_eq!(pack.id, PackId::new(3));
    // No product linkage in the fixture, so the final price wins
    assert_eq!(pack_display_price(&pack), Money::from_rupees(2000));
}

#[tokio::test]
async fn test_unprovisioned_tier_is_not_found() {
    let backend = MockBackend::start().await;
    let resolver = CatalogResolver::new(backend.anonymous_client());

    let err = resolver
        .resolve_pack_by_duration(CategoryId::new(2), PackDuration::Small)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_threshold_follows_small_pack_price() {
    let backend = MockBackend::start().await;
    let resolver = CatalogResolver::new(backend.anonymous_client());

    let threshold = resolver
        .small_pack_threshold(CategoryId::new(1))
        .await
        .unwrap();
    assert_eq!(threshold, Money::from_rupees(2000));

    // No small pack means no minimum
    let threshold = resolver
        .small_pack_threshold(CategoryId::new(2))
        .await
        .unwrap();
    assert_eq!(threshold, Money::ZERO);
}

#[tokio::test]
async fn test_catalog_requests_are_cached_per_session() {
    let backend = MockBackend::start().await;
    let client = backend.anonymous_client();

    client.categories().await.unwrap();
    client.categories().await.unwrap();
    assert_eq!(backend.state.call_count("public/categories"), 1);

    client.packs_by_category(CategoryId::new(1)).await.unwrap();
    client.packs_by_category(CategoryId::new(1)).await.unwrap();
    assert_eq!(backend.state.call_count("public/packs"), 1);

    // Invalidation forces a refetch
    client.invalidate_catalog().await;
    client.categories().await.unwrap();
    assert_eq!(backend.state.call_count("public/categories"), 2);
}

#[tokio::test]
async fn test_product_catalog_spans_all_categories() {
    let backend = MockBackend::start().await;
    let resolver = CatalogResolver::new(backend.anonymous_client());

    let catalog = resolver.load_product_catalog().await.unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog["Fruits Pack"].len(), 2);
    assert_eq!(catalog["Vegetables Pack"].len(), 1);
}
