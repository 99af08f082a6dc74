//! Fresh Basket backend REST client.
//!
//! A single HTTP access point for every other component: issues
//! authenticated and unauthenticated JSON calls with a bounded timeout and
//! normalizes success/error shapes into [`ApiError`]. Immutable catalog
//! data (categories, packs, products) is cached per session using `moka`;
//! cart, wallet, and order state is never cached.

pub mod types;

mod cache;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use fresh_basket_core::{AddressId, CartItemId, CategoryId, OrderId, PackId, UserId};

use crate::config::ClientConfig;
use crate::error::ApiError;

use cache::{CacheKey, CacheValue};
use types::{
    AddToCartRequest, Address, AuthResponse, CartItem, Category, CreateAddressRequest,
    CreateOrderRequest, CreditPackage, LoginRequest, Order, Pack, Product,
    PurchaseCreateOrderRequest, PurchaseOrderResponse, RegisterRequest, UpdateAddressRequest,
    UpdateProfileRequest, User, VerifyPurchaseRequest, VerifyPurchaseResponse,
    WalletDeductRequest, WalletDeductResponse, WalletResponse,
};

/// Catalog cache TTL. Reference data is refetched at most every 5 minutes.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Fresh Basket backend REST API.
///
/// Cheap to clone; all clones share the HTTP connection pool, the session
/// token, and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.as_str().trim_end_matches('/').to_owned(),
                token: RwLock::new(None),
                cache,
            }),
        })
    }

    // =========================================================================
    // Session token
    // =========================================================================

    /// Install the Bearer token used for authenticated calls.
    pub fn set_token(&self, token: SecretString) {
        if let Ok(mut slot) = self.inner.token.write() {
            *slot = Some(token);
        }
    }

    /// Drop the Bearer token (logout).
    pub fn clear_token(&self) {
        if let Ok(mut slot) = self.inner.token.write() {
            *slot = None;
        }
    }

    /// Whether a session token is installed.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    fn bearer(&self) -> Result<String, ApiError> {
        self.inner
            .token
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().map(|t| t.expose_secret().to_owned()))
            .ok_or(ApiError::Unauthenticated)
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and decode the JSON response body.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Http(e)
            }
        })?;

        let status = response.status();
        // Read the body as text first for better error diagnostics
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Http(e)
            }
        })?;

        if !status.is_success() {
            return Err(Self::backend_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "failed to decode backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request, discarding any response body.
    async fn send_unit(&self, builder: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Http(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(Self::backend_error(status, &text))
    }

    /// Normalize a non-2xx response into an [`ApiError`].
    ///
    /// The backend is inconsistent about error envelopes: some handlers
    /// return `{"error": ...}`, some `{"message": ...}`, some plain text.
    fn backend_error(status: reqwest::StatusCode, body: &str) -> ApiError {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str().map(ToOwned::to_owned))
            })
            .unwrap_or_else(|| {
                if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.chars().take(200).collect()
                }
            });

        match status {
            reqwest::StatusCode::UNAUTHORIZED => ApiError::Unauthenticated,
            reqwest::StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Backend {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.inner.client.get(self.url(path))).await
    }

    async fn get_json_authed<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let token = self.bearer()?;
        self.send(self.inner.client.get(self.url(path)).bearer_auth(token))
            .await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.inner.client.post(self.url(path)).json(body))
            .await
    }

    async fn post_json_authed<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let token = self.bearer()?;
        self.send(
            self.inner
                .client
                .post(self.url(path))
                .bearer_auth(token)
                .json(body),
        )
        .await
    }

    async fn put_json_authed<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let token = self.bearer()?;
        self.send(
            self.inner
                .client
                .put(self.url(path))
                .bearer_auth(token)
                .json(body),
        )
        .await
    }

    async fn delete_authed(&self, path: &str) -> Result<(), ApiError> {
        let token = self.bearer()?;
        self.send_unit(self.inner.client.delete(self.url(path)).bearer_auth(token))
            .await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in and install the returned session token.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid credentials or transport failure.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.post_json("/auth/login", request).await?;
        self.set_token(SecretString::from(response.token.clone()));
        Ok(response)
    }

    /// Register a new account and install the returned session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.post_json("/auth/register", request).await?;
        self.set_token(SecretString::from(response.token.clone()));
        Ok(response)
    }

    /// Update the user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the update is rejected.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        request: &UpdateProfileRequest,
    ) -> Result<User, ApiError> {
        self.put_json_authed(&format!("/auth/user/{user_id}"), request)
            .await
    }

    // =========================================================================
    // Catalog (cached)
    // =========================================================================

    /// Get all categories. Cached for the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(cached)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("cache hit for categories");
            return Ok(cached);
        }

        let categories: Vec<Category> = self.get_json("/public/categories").await?;
        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Get the packs of a category, with nested pack types and products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn packs_by_category(&self, category_id: CategoryId) -> Result<Vec<Pack>, ApiError> {
        let key = CacheKey::Packs(category_id);
        if let Some(CacheValue::Packs(cached)) = self.inner.cache.get(&key).await {
            debug!("cache hit for packs");
            return Ok(cached);
        }

        let packs: Vec<Pack> = self
            .get_json(&format!("/public/categories/{category_id}/packs"))
            .await?;
        self.inner
            .cache
            .insert(key, CacheValue::Packs(packs.clone()))
            .await;
        Ok(packs)
    }

    /// Get the ad-hoc products of a category (custom-pack selection).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::Products(category_id);
        if let Some(CacheValue::Products(cached)) = self.inner.cache.get(&key).await {
            debug!("cache hit for products");
            return Ok(cached);
        }

        let products: Vec<Product> = self
            .get_json(&format!("/public/categories/{category_id}/products"))
            .await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Get a single pack by id (direct entry point, not cached).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the pack does not exist.
    #[instrument(skip(self))]
    pub async fn pack_details(&self, pack_id: PackId) -> Result<Pack, ApiError> {
        self.get_json(&format!("/packs/{pack_id}")).await
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Cart (never cached - mutable state)
    // =========================================================================

    /// Get the user's cart items.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    #[instrument(skip(self))]
    pub async fn cart(&self, user_id: UserId) -> Result<Vec<CartItem>, ApiError> {
        self.get_json_authed(&format!("/cart/{user_id}")).await
    }

    /// Add a pack or custom pack to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, is_custom = request.is_custom))]
    pub async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<CartItem, ApiError> {
        self.post_json_authed("/cart", request).await
    }

    /// Change the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    #[instrument(skip(self))]
    pub async fn update_cart_quantity(
        &self,
        cart_item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        self.put_json_authed(
            &format!("/cart/{cart_item_id}"),
            &serde_json::json!({ "quantity": quantity }),
        )
        .await
    }

    /// Remove one cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    #[instrument(skip(self))]
    pub async fn remove_cart_item(&self, cart_item_id: CartItemId) -> Result<(), ApiError> {
        self.delete_authed(&format!("/cart/{cart_item_id}")).await
    }

    /// Bulk-clear every cart line for a user (post-checkout).
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), ApiError> {
        self.delete_authed(&format!("/cart/clear/{user_id}")).await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Get the user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn addresses(&self, user_id: UserId) -> Result<Vec<Address>, ApiError> {
        self.get_json_authed(&format!("/addresses?userId={user_id}"))
            .await
    }

    /// Create a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn create_address(&self, request: &CreateAddressRequest) -> Result<Address, ApiError> {
        self.post_json_authed("/addresses", request).await
    }

    /// Update an existing address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request))]
    pub async fn update_address(
        &self,
        address_id: AddressId,
        request: &UpdateAddressRequest,
    ) -> Result<Address, ApiError> {
        self.put_json_authed(&format!("/addresses/{address_id}"), request)
            .await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, address_id: AddressId) -> Result<(), ApiError> {
        self.delete_authed(&format!("/addresses/{address_id}")).await
    }

    // =========================================================================
    // Wallet & credits
    // =========================================================================

    /// Get the wallet balance and transaction ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    #[instrument(skip(self))]
    pub async fn wallet(&self) -> Result<WalletResponse, ApiError> {
        self.get_json_authed("/wallet").await
    }

    /// Deduct credits from the wallet ahead of order creation.
    ///
    /// A shortfall is reported as [`ApiError::InsufficientBalance`] so the
    /// checkout reconciler can stop before any order exists.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` when the balance does not cover the
    /// amount, or another error if the request fails.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn deduct_wallet(
        &self,
        request: &WalletDeductRequest,
    ) -> Result<WalletDeductResponse, ApiError> {
        match self.post_json_authed("/wallet/deduct", request).await {
            Err(ApiError::Backend { status, message })
                if status == 400 || status == 402 =>
            {
                Err(ApiError::InsufficientBalance(message))
            }
            other => other,
        }
    }

    /// Get the purchasable credit packages.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn credit_packages(&self) -> Result<Vec<CreditPackage>, ApiError> {
        self.get_json("/credit-packages").await
    }

    /// Create a gateway order for a credit purchase.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request))]
    pub async fn purchase_create_order(
        &self,
        request: &PurchaseCreateOrderRequest,
    ) -> Result<PurchaseOrderResponse, ApiError> {
        self.post_json_authed("/wallet/purchase/create-order", request)
            .await
    }

    /// Verify a gateway payment and credit the wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if verification fails.
    #[instrument(skip(self, request))]
    pub async fn purchase_verify(
        &self,
        request: &VerifyPurchaseRequest,
    ) -> Result<VerifyPurchaseResponse, ApiError> {
        self.post_json_authed("/wallet/purchase/verify", request)
            .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or order creation fails.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, method = %request.payment_method))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        self.post_json_authed("/orders", request).await
    }

    /// Get the user's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self, user_id: UserId) -> Result<Vec<Order>, ApiError> {
        self.get_json_authed(&format!("/orders/{user_id}")).await
    }

    /// Get a single order with its full snapshot.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn order_details(&self, order_id: OrderId) -> Result<Order, ApiError> {
        self.get_json_authed(&format!("/orders/details/{order_id}"))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_prefers_error_field() {
        let err = ApiClient::backend_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "boom", "message": "ignored"}"#,
        );
        assert!(matches!(
            err,
            ApiError::Backend { status: 500, ref message } if message == "boom"
        ));
    }

    #[test]
    fn test_backend_error_falls_back_to_message_field() {
        let err = ApiClient::backend_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"message": "quantity must be positive"}"#,
        );
        assert!(matches!(
            err,
            ApiError::Backend { status: 400, ref message } if message == "quantity must be positive"
        ));
    }

    #[test]
    fn test_backend_error_raw_text_body() {
        let err =
            ApiClient::backend_error(reqwest::StatusCode::BAD_GATEWAY, "upstream exploded");
        assert!(matches!(
            err,
            ApiError::Backend { status: 502, ref message } if message == "upstream exploded"
        ));
    }

    #[test]
    fn test_backend_error_empty_body_uses_status() {
        let err = ApiClient::backend_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(matches!(
            err,
            ApiError::Backend { status: 503, ref message } if message == "HTTP 503 Service Unavailable"
        ));
    }

    #[test]
    fn test_backend_error_unauthorized_maps_to_unauthenticated() {
        let err = ApiClient::backend_error(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"error": "token expired"}"#,
        );
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[test]
    fn test_backend_error_not_found() {
        let err = ApiClient::backend_error(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"error": "no such pack"}"#,
        );
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "no such pack"));
    }

    #[test]
    fn test_token_lifecycle() {
        let config = crate::config::ClientConfig::for_base_url("http://localhost:3001/api")
            .unwrap();
        let client = ApiClient::new(&config).unwrap();
        assert!(!client.has_token());

        client.set_token(SecretString::from("tok_abc123"));
        assert!(client.has_token());
        assert_eq!(client.bearer().unwrap(), "tok_abc123");

        client.clear_token();
        assert!(!client.has_token());
        assert!(matches!(client.bearer(), Err(ApiError::Unauthenticated)));
    }
}
