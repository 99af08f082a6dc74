//! Integration test harness for Fresh Basket.
//!
//! Runs a scripted in-process mock of the backend REST API on an ephemeral
//! port and points a real [`ApiClient`] at it, so the full request plumbing
//! is exercised: Bearer auth, the bounded timeout, error-envelope
//! normalization, and catalog caching.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fresh-basket-integration-tests
//! ```
//!
//! The mock serves a small fixed catalog (two categories, tiered packs and
//! products under "Fruits Pack") and mutable cart/wallet/order state that
//! tests seed per scenario through [`MockState`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::Router;
use secrecy::SecretString;
use serde_json::{Value, json};

use fresh_basket_client::{ApiClient, ClientConfig};

/// Token the mock accepts on authenticated routes.
pub const TEST_TOKEN: &str = "test-token";

/// User id of the mock's only account.
pub const TEST_USER_ID: i64 = 4;

// =============================================================================
// Scriptable state
// =============================================================================

/// Mutable backend state, seeded by each test scenario.
pub struct MockState {
    /// Ordered log of every handled route.
    calls: Mutex<Vec<String>>,
    /// Wallet balance in rupees.
    balance: Mutex<f64>,
    /// Cart lines returned by `GET /cart/{user}`, as raw wire JSON.
    cart: Mutex<Value>,
    /// Orders accepted by `POST /orders`.
    orders: Mutex<Vec<Value>>,
    /// When set, `DELETE /cart/clear/{user}` fails with a 500.
    pub fail_clear_cart: AtomicBool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            balance: Mutex::new(0.0),
            cart: Mutex::new(json!([])),
            orders: Mutex::new(Vec::new()),
            fail_clear_cart: AtomicBool::new(false),
        }
    }
}

impl MockState {
    fn record(&self, route: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(route.to_owned());
        }
    }

    /// Routes handled so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// How many times a route was handled.
    #[must_use]
    pub fn call_count(&self, route: &str) -> usize {
        self.calls().iter().filter(|c| *c == route).count()
    }

    pub fn set_balance(&self, rupees: f64) {
        if let Ok(mut balance) = self.balance.lock() {
            *balance = rupees;
        }
    }

    #[must_use]
    pub fn balance(&self) -> f64 {
        self.balance.lock().map(|b| *b).unwrap_or(0.0)
    }

    /// Replace the cart contents with raw wire JSON.
    pub fn seed_cart(&self, items: Value) {
        if let Ok(mut cart) = self.cart.lock() {
            *cart = items;
        }
    }

    /// Orders accepted so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.orders.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

/// A cart holding two pack lines worth ₹200 total.
#[must_use]
pub fn two_line_cart() -> Value {
    json!([
        {
            "id": 1, "userId": TEST_USER_ID, "quantity": 1,
            "unitPrice": "120.00", "totalPrice": "120.00",
            "isCustom": false, "packId": 3
        },
        {
            "id": 2, "userId": TEST_USER_ID, "quantity": 2,
            "unitPrice": "40.00", "totalPrice": "80.00",
            "isCustom": false, "packId": 3
        }
    ])
}

// =============================================================================
// Harness
// =============================================================================

/// The running mock backend plus its scriptable state.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Start the mock on an ephemeral port with default state.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read mock address");

        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, state }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A real client pointed at the mock with the test token installed.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        let client = self.anonymous_client();
        client.set_token(SecretString::from(TEST_TOKEN));
        client
    }

    /// A client with no session token.
    #[must_use]
    pub fn anonymous_client(&self) -> ApiClient {
        let config =
            ClientConfig::for_base_url(&self.base_url()).expect("Failed to build test config");
        ApiClient::new(&config).expect("Failed to build test client")
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/public/categories", get(categories))
        .route("/public/categories/{id}/packs", get(packs))
        .route("/public/categories/{id}/products", get(products))
        .route("/packs/{id}", get(pack_details))
        .route("/cart/{user}", get(cart))
        .route("/cart/clear/{user}", delete(clear_cart))
        .route("/wallet", get(wallet))
        .route("/wallet/deduct", post(deduct))
        .route("/credit-packages", get(credit_packages))
        .route("/wallet/purchase/create-order", post(purchase_create_order))
        .route("/wallet/purchase/verify", post(purchase_verify))
        .route("/orders", post(create_order))
        .route("/orders/{user}", get(orders_list))
        .with_state(state)
}

fn authed(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TEST_TOKEN}"))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Invalid token"})),
    )
}

/// Read a wire amount that may be a decimal string or a JSON number.
fn amount_of(value: &Value) -> f64 {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(0.0)
}

fn test_user() -> Value {
    json!({
        "id": TEST_USER_ID,
        "name": "Asha",
        "email": "asha@example.com",
        "phone": "9876543210"
    })
}

async fn login(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("auth/login");
    if body["password"] == "wrong" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"token": TEST_TOKEN, "user": test_user()})),
    )
}

async fn categories(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.record("public/categories");
    Json(json!([
        {"id": 1, "name": "Fruits Pack"},
        {"id": 2, "name": "Vegetables Pack"}
    ]))
}

async fn packs(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Json<Value> {
    state.record("public/packs");
    if id != 1 {
        // Vegetables Pack has no provisioned tiers
        return Json(json!([]));
    }
    Json(json!([
        {
            "id": 3, "categoryId": 1, "packTypeId": 1,
            "name": "Small Fruit Basket", "finalPrice": "2000.00",
            "PackType": {"id": 1, "name": "Small", "duration": "small", "basePrice": "2500.00"},
            "Products": []
        },
        {
            "id": 4, "categoryId": 1, "packTypeId": 2,
            "name": "Medium Fruit Basket", "finalPrice": "4500.00",
            "PackType": {"id": 2, "name": "Medium", "duration": "medium", "basePrice": "4500.00"},
            "Products": []
        }
    ]))
}

async fn products(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Json<Value> {
    state.record("public/products");
    if id == 1 {
        Json(json!([
            {"id": 9, "name": "Apple", "price": "120.00", "unitType": "kg"},
            {"id": 14, "name": "Banana", "price": "40.00", "unitType": "dozen"}
        ]))
    } else {
        Json(json!([
            {"id": 21, "name": "Tomato", "price": "30.00", "unitType": "kg"}
        ]))
    }
}

async fn pack_details(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    state.record("packs/details");
    if id != 3 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Pack not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": 3, "categoryId": 1, "packTypeId": 1,
            "name": "Small Fruit Basket", "finalPrice": "2000.00",
            "PackType": {"id": 1, "name": "Small", "duration": "small", "basePrice": "2500.00"},
            "Products": []
        })),
    )
}

async fn cart(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.record("cart");
    if !authed(&headers) {
        return unauthorized();
    }
    let items = state.cart.lock().map(|c| c.clone()).unwrap_or(json!([]));
    (StatusCode::OK, Json(items))
}

async fn clear_cart(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.record("cart/clear");
    if !authed(&headers) {
        return unauthorized();
    }
    if state.fail_clear_cart.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "cart clear failed"})),
        );
    }
    state.seed_cart(json!([]));
    (StatusCode::OK, Json(json!({"message": "Cart cleared"})))
}

async fn wallet(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.record("wallet");
    if !authed(&headers) {
        return unauthorized();
    }
    let balance = state.balance();
    (
        StatusCode::OK,
        Json(json!({
            "wallet": {
                "userId": TEST_USER_ID,
                "balance": format!("{balance:.2}"),
                "totalCreditsEarned": "0.00",
                "totalCreditsSpent": "0.00"
            },
            "transactions": [
                {"id": 70, "type": "reward", "amount": "50.00", "balanceAfter": "50.00",
                 "description": "Welcome bonus", "createdAt": "2026-08-01T10:00:00Z"}
            ]
        })),
    )
}

async fn deduct(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("wallet/deduct");
    if !authed(&headers) {
        return unauthorized();
    }

    let amount = amount_of(&body["amount"]);
    let balance = state.balance();
    if amount > balance {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Insufficient wallet balance"})),
        );
    }

    let remaining = balance - amount;
    state.set_balance(remaining);
    (
        StatusCode::OK,
        Json(json!({
            "transaction": {
                "id": 77, "type": "credit_spent",
                "amount": format!("{amount:.2}"),
                "balanceAfter": format!("{remaining:.2}"),
                "description": body["description"]
            }
        })),
    )
}

async fn credit_packages(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.record("credit-packages");
    Json(json!([
        {"id": 2, "name": "Saver", "credits": "550.00", "price": "500.00"}
    ]))
}

async fn purchase_create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("wallet/purchase/create-order");
    if !authed(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "gatewayOrderId": "order_mock_1",
            "transactionId": 88,
            "amount": body["amount"]
        })),
    )
}

async fn purchase_verify(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("wallet/purchase/verify");
    if !authed(&headers) {
        return unauthorized();
    }
    if body["gatewayOrderId"] != "order_mock_1" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Payment verification failed"})),
        );
    }
    state.set_balance(state.balance() + 550.0);
    (
        StatusCode::OK,
        Json(json!({"creditsAdded": "550.00"})),
    )
}

async fn create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("orders");
    if !authed(&headers) {
        return unauthorized();
    }

    let mut order = body.clone();
    if let Some(map) = order.as_object_mut() {
        map.insert("id".to_owned(), json!(501));
        map.insert("status".to_owned(), json!("pending"));
    }
    if let Ok(mut orders) = state.orders.lock() {
        orders.push(order.clone());
    }
    (StatusCode::CREATED, Json(order))
}

async fn orders_list(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.record("orders/list");
    if !authed(&headers) {
        return unauthorized();
    }
    let orders = state.orders();
    (StatusCode::OK, Json(json!(orders)))
}
