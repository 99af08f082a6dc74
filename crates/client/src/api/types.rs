//! Wire types for the Fresh Basket backend REST API.
//!
//! Field names mirror the backend's camelCase JSON. Nested relations keep
//! the backend's Sequelize-style capitalized keys (`Pack`, `Products`,
//! `PackProduct`). Every money field uses the lenient decoder: the catalog
//! is sometimes partially loaded, and a missing price must degrade to zero
//! rather than fail the whole response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fresh_basket_core::money::lenient;
use fresh_basket_core::{
    AddressId, AddressKind, CartItemId, CategoryId, CreditPackageId, Email, Money, OrderId,
    OrderStatus, PackDuration, PackId, PackTypeId, PaymentMethod, ProductId, TransactionId,
    TransactionKind, UserId,
};

fn default_quantity() -> u32 {
    1
}

// =============================================================================
// Users & addresses
// =============================================================================

/// Authenticated user profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Saved delivery address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    #[serde(rename = "type", default)]
    pub kind: AddressKind,
    pub name: String,
    /// Free-text delivery address.
    pub address: String,
    #[serde(default)]
    pub is_default: bool,
}

// =============================================================================
// Catalog
// =============================================================================

/// Product category, immutable reference data fetched once per session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Tier definition within a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackType {
    pub id: PackTypeId,
    pub name: String,
    pub duration: PackDuration,
    #[serde(default, with = "lenient")]
    pub base_price: Money,
}

/// Join data linking a product into a pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackProduct {
    #[serde(default, with = "lenient")]
    pub unit_price: Money,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Atomic catalog item, used inside packs and for custom-pack selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, with = "lenient")]
    pub price: Money,
    #[serde(default)]
    pub unit_type: Option<String>,
    /// Present only when the product arrives nested inside a pack.
    #[serde(rename = "PackProduct", default)]
    pub pack_product: Option<PackProduct>,
}

/// A priced, pre-defined bundle of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    pub id: PackId,
    pub category_id: CategoryId,
    #[serde(default)]
    pub pack_type_id: Option<PackTypeId>,
    pub name: String,
    #[serde(default, with = "lenient")]
    pub final_price: Money,
    #[serde(rename = "PackType", default)]
    pub pack_type: Option<PackType>,
    #[serde(rename = "Products", default)]
    pub products: Vec<Product>,
}

// =============================================================================
// Cart
// =============================================================================

/// One line of a user-assembled custom pack, snapshotted into the cart item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPackItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, with = "lenient")]
    pub price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A cart line.
///
/// For non-custom items `total_price == quantity × unit_price`; for custom
/// items the backend stores the sum of the custom pack's lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub quantity: u32,
    #[serde(default, with = "lenient")]
    pub unit_price: Money,
    #[serde(default, with = "lenient")]
    pub total_price: Money,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub pack_id: Option<PackId>,
    #[serde(rename = "Pack", default)]
    pub pack: Option<Pack>,
    #[serde(default)]
    pub custom_pack_name: Option<String>,
    #[serde(default)]
    pub custom_pack_items: Option<Vec<CustomPackItem>>,
}

impl CartItem {
    /// Display name for the line: the pack name, the custom pack name, or a
    /// generic fallback.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if let Some(name) = &self.custom_pack_name {
            return name;
        }
        if let Some(pack) = &self.pack {
            return &pack.name;
        }
        "Pack"
    }
}

// =============================================================================
// Wallet
// =============================================================================

/// Prepaid wallet balance. Mutated only via backend transaction endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub user_id: UserId,
    #[serde(default, with = "lenient")]
    pub balance: Money,
    #[serde(default, with = "lenient")]
    pub total_credits_earned: Money,
    #[serde(default, with = "lenient")]
    pub total_credits_spent: Money,
}

/// One entry in the append-only wallet ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, with = "lenient")]
    pub amount: Money,
    #[serde(default, with = "lenient")]
    pub balance_after: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A purchasable credit bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPackage {
    pub id: CreditPackageId,
    pub name: String,
    #[serde(default, with = "lenient")]
    pub credits: Money,
    #[serde(default, with = "lenient")]
    pub price: Money,
}

// =============================================================================
// Orders
// =============================================================================

/// A placed order, immutable from the client's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    #[serde(default, with = "lenient")]
    pub total_amount: Money,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub pack_id: Option<PackId>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub custom_pack_name: Option<String>,
    #[serde(default)]
    pub custom_pack_items: Option<Vec<CustomPackItem>>,
    #[serde(default)]
    pub wallet_transaction_id: Option<TransactionId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Request payloads
// =============================================================================

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

/// `POST /auth/register` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub password: String,
}

/// `PUT /auth/user/:id` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// `POST /auth/login` and `POST /auth/register` response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// `POST /cart` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub user_id: UserId,
    pub quantity: u32,
    pub unit_price: Money,
    pub total_price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_id: Option<PackId>,
    pub is_custom: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_pack_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_pack_items: Option<Vec<CustomPackItem>>,
}

/// `POST /addresses` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: AddressKind,
    pub name: String,
    pub address: String,
    pub is_default: bool,
}

/// `PUT /addresses/:id` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressRequest {
    #[serde(rename = "type")]
    pub kind: AddressKind,
    pub name: String,
    pub address: String,
    pub is_default: bool,
}

/// `GET /wallet` response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub wallet: Wallet,
    #[serde(default)]
    pub transactions: Vec<WalletTransaction>,
}

/// `POST /wallet/deduct` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDeductRequest {
    pub user_id: UserId,
    pub amount: Money,
    pub description: String,
}

/// `POST /wallet/deduct` response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDeductResponse {
    pub transaction: WalletTransaction,
    #[serde(default)]
    pub wallet: Option<Wallet>,
}

/// `POST /wallet/purchase/create-order` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCreateOrderRequest {
    pub package_id: CreditPackageId,
    pub amount: Money,
}

/// `POST /wallet/purchase/create-order` response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderResponse {
    /// Gateway-side order id to hand to the payment SDK.
    pub gateway_order_id: String,
    /// Pending ledger entry created for this purchase.
    pub transaction_id: TransactionId,
    #[serde(default, with = "lenient")]
    pub amount: Money,
}

/// `POST /wallet/purchase/verify` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPurchaseRequest {
    pub gateway_payment_id: String,
    pub gateway_order_id: String,
    pub transaction_id: TransactionId,
}

/// `POST /wallet/purchase/verify` response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPurchaseResponse {
    #[serde(default, with = "lenient")]
    pub credits_added: Money,
    #[serde(default)]
    pub wallet: Option<Wallet>,
}

/// `POST /orders` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub quantity: u32,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub total_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_id: Option<PackId>,
    pub is_custom: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_pack_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_pack_items: Option<Vec<CustomPackItem>>,
    pub time_slot: String,
    pub delivery_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_transaction_id: Option<TransactionId>,
}
