//! Checkout: turns a cart plus payment choice into a placed order.
//!
//! The flow is an explicit state machine rather than ad-hoc screen logic.
//! Ordering is load-bearing: for wallet payment the deduction happens
//! before order creation, so an insufficient balance stops the flow while
//! no order exists yet. The window between a successful deduction and a
//! failed order creation is surfaced to the caller, not silently
//! compensated; reconciliation of that window is a backend concern.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use fresh_basket_core::{Money, PaymentMethod, TransactionId, UserId};

use crate::api::ApiClient;
use crate::api::types::{
    CartItem, CreateOrderRequest, Order, WalletDeductRequest, WalletDeductResponse,
};
use crate::error::ApiError;
use crate::pricing::{cart_subtotal, order_quantity};

/// Ledger description attached to checkout deductions.
const DEDUCT_DESCRIPTION: &str = "Payment for order";

// =============================================================================
// Backend seam
// =============================================================================

/// The three backend calls checkout needs, separated from [`ApiClient`] so
/// the flow can be exercised against a scripted backend.
pub trait CheckoutBackend {
    /// Deduct credits from the wallet.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` on a shortfall, or another error on
    /// transport or backend failure.
    async fn deduct_wallet(
        &self,
        request: &WalletDeductRequest,
    ) -> Result<WalletDeductResponse, ApiError>;

    /// Place the order.
    ///
    /// # Errors
    ///
    /// Returns an error if order creation fails.
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError>;

    /// Clear the user's cart after a placed order.
    ///
    /// # Errors
    ///
    /// Returns an error if the bulk delete fails.
    async fn clear_cart(&self, user_id: UserId) -> Result<(), ApiError>;
}

impl CheckoutBackend for ApiClient {
    async fn deduct_wallet(
        &self,
        request: &WalletDeductRequest,
    ) -> Result<WalletDeductResponse, ApiError> {
        Self::deduct_wallet(self, request).await
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        Self::create_order(self, request).await
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<(), ApiError> {
        Self::clear_cart(self, user_id).await
    }
}

// =============================================================================
// Inputs and outputs
// =============================================================================

/// Everything checkout needs, assembled by the caller before submission.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub user_id: UserId,
    /// Current cart lines; must be non-empty.
    pub items: Vec<CartItem>,
    /// Free-text delivery address; must be non-empty.
    pub delivery_address: String,
    pub time_slot: String,
    pub delivery_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
}

/// Result of a completed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: Order,
    /// Set when wallet payment deducted credits ahead of order creation.
    pub wallet_transaction_id: Option<TransactionId>,
    /// False when the post-order cart clear failed; the order still stands
    /// and the stale cart self-corrects on the next refresh.
    pub cart_cleared: bool,
}

/// The phases a submission passes through, in order. Used for logging and
/// error attribution, never skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Validating,
    WalletDeducting,
    OrderCreating,
    CartClearing,
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::WalletDeducting => "wallet_deducting",
            Self::OrderCreating => "order_creating",
            Self::CartClearing => "cart_clearing",
        };
        f.write_str(name)
    }
}

/// A checkout failure, tagged with the phase that produced it.
#[derive(Debug, thiserror::Error)]
#[error("checkout failed while {phase}: {source}")]
pub struct CheckoutError {
    pub phase: CheckoutPhase,
    #[source]
    pub source: ApiError,
}

impl CheckoutError {
    const fn at(phase: CheckoutPhase, source: ApiError) -> Self {
        Self { phase, source }
    }

    /// Message suitable for direct display.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.source.user_message()
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// Drives a cart through validation, optional wallet deduction, order
/// creation, and cart clearing.
///
/// At most one submission runs at a time; a second submission while one is
/// in flight fails fast instead of double-charging.
pub struct CheckoutReconciler<B> {
    backend: B,
    in_flight: AtomicBool,
}

impl<B: CheckoutBackend> CheckoutReconciler<B> {
    /// Create a reconciler over the given backend.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Submit a checkout.
    ///
    /// Wallet payment deducts the full pre-discount cart total before the
    /// order exists; COD skips deduction entirely; online payment has no
    /// gateway integration yet and is rejected during validation.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] naming the phase that failed. A
    /// validation failure guarantees no network call was made; an
    /// insufficient balance guarantees no order was created.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, method = %request.payment_method))]
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutOutcome, ApiError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ApiError::UserError(
                "checkout already in progress".to_owned(),
            ));
        }
        let _guard = InFlightGuard {
            flag: &self.in_flight,
        };

        self.run(request).await.map_err(|e| {
            warn!(phase = %e.phase, error = %e.source, "checkout failed");
            e.source
        })
    }

    async fn run(&self, request: &CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError> {
        // -- Validating -------------------------------------------------------
        let amount_due = Self::validate(request)
            .map_err(|e| CheckoutError::at(CheckoutPhase::Validating, e))?;

        // -- WalletDeducting (wallet only) ------------------------------------
        let wallet_transaction_id = match request.payment_method {
            PaymentMethod::Wallet => {
                let response = self
                    .backend
                    .deduct_wallet(&WalletDeductRequest {
                        user_id: request.user_id,
                        amount: amount_due,
                        description: DEDUCT_DESCRIPTION.to_owned(),
                    })
                    .await
                    .map_err(|e| CheckoutError::at(CheckoutPhase::WalletDeducting, e))?;
                info!(transaction = %response.transaction.id, "wallet deducted");
                Some(response.transaction.id)
            }
            // Online is rejected in validate(); no gateway integration yet
            PaymentMethod::Cod | PaymentMethod::Online => None,
        };

        // -- OrderCreating ----------------------------------------------------
        let order = self
            .backend
            .create_order(&Self::order_request(request, amount_due, wallet_transaction_id))
            .await
            .map_err(|e| CheckoutError::at(CheckoutPhase::OrderCreating, e))?;
        info!(order = %order.id, "order placed");

        // -- CartClearing -----------------------------------------------------
        // The order already exists; a failed clear leaves a stale cart that
        // the next refresh corrects, so it is logged and tolerated.
        let cart_cleared = match self.backend.clear_cart(request.user_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "cart clear failed after order placement");
                false
            }
        };

        Ok(CheckoutOutcome {
            order,
            wallet_transaction_id,
            cart_cleared,
        })
    }

    /// Check the request and return the amount due. Makes no network calls.
    fn validate(request: &CheckoutRequest) -> Result<Money, ApiError> {
        if request.delivery_address.trim().is_empty() {
            return Err(ApiError::UserError(
                "please select a delivery address".to_owned(),
            ));
        }
        if request.items.is_empty() {
            return Err(ApiError::UserError("your cart is empty".to_owned()));
        }
        if request.payment_method == PaymentMethod::Online {
            return Err(ApiError::UserError(
                "online payment is coming soon; use wallet or cod".to_owned(),
            ));
        }
        Ok(cart_subtotal(&request.items))
    }

    fn order_request(
        request: &CheckoutRequest,
        amount_due: Money,
        wallet_transaction_id: Option<TransactionId>,
    ) -> CreateOrderRequest {
        // The backend stores one order per checkout; pack and custom-pack
        // details are snapshotted from the leading cart line.
        let lead = request.items.first();
        CreateOrderRequest {
            user_id: request.user_id,
            quantity: order_quantity(&request.items),
            delivery_address: request.delivery_address.clone(),
            payment_method: request.payment_method,
            total_amount: amount_due,
            pack_id: lead.and_then(|item| item.pack_id),
            is_custom: lead.is_some_and(|item| item.is_custom),
            custom_pack_name: lead.and_then(|item| item.custom_pack_name.clone()),
            custom_pack_items: lead.and_then(|item| item.custom_pack_items.clone()),
            time_slot: request.time_slot.clone(),
            delivery_date: request.delivery_date,
            wallet_transaction_id,
        }
    }
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use fresh_basket_core::{CartItemId, OrderId, OrderStatus, PackId};

    #[derive(Default)]
    struct MockBackend {
        deduct_calls: AtomicUsize,
        order_calls: AtomicUsize,
        clear_calls: AtomicUsize,
        call_log: Mutex<Vec<&'static str>>,
        fail_deduct: Option<fn() -> ApiError>,
        fail_order: Option<fn() -> ApiError>,
        fail_clear: bool,
        captured_order: Mutex<Option<CreateOrderRequest>>,
        captured_deduct: Mutex<Option<WalletDeductRequest>>,
    }

    impl MockBackend {
        fn log(&self, call: &'static str) {
            self.call_log.lock().unwrap().push(call);
        }
    }

    impl CheckoutBackend for MockBackend {
        async fn deduct_wallet(
            &self,
            request: &WalletDeductRequest,
        ) -> Result<WalletDeductResponse, ApiError> {
            self.deduct_calls.fetch_add(1, Ordering::SeqCst);
            self.log("deduct");
            if let Some(fail) = self.fail_deduct {
                return Err(fail());
            }
            *self.captured_deduct.lock().unwrap() = Some(request.clone());
            Ok(WalletDeductResponse {
                transaction: crate::api::types::WalletTransaction {
                    id: TransactionId::new(77),
                    kind: fresh_basket_core::TransactionKind::CreditSpent,
                    amount: request.amount,
                    balance_after: Money::ZERO,
                    description: Some(request.description.clone()),
                    created_at: None,
                },
                wallet: None,
            })
        }

        async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
            self.order_calls.fetch_add(1, Ordering::SeqCst);
            self.log("order");
            if let Some(fail) = self.fail_order {
                return Err(fail());
            }
            *self.captured_order.lock().unwrap() = Some(request.clone());
            Ok(Order {
                id: OrderId::new(501),
                user_id: request.user_id,
                quantity: request.quantity,
                delivery_address: request.delivery_address.clone(),
                payment_method: request.payment_method,
                total_amount: request.total_amount,
                time_slot: Some(request.time_slot.clone()),
                delivery_date: Some(request.delivery_date),
                status: OrderStatus::Pending,
                pack_id: request.pack_id,
                is_custom: request.is_custom,
                custom_pack_name: request.custom_pack_name.clone(),
                custom_pack_items: request.custom_pack_items.clone(),
                wallet_transaction_id: request.wallet_transaction_id,
                created_at: None,
            })
        }

        async fn clear_cart(&self, _user_id: UserId) -> Result<(), ApiError> {
            self.clear_calls.fetch_add(1, Ordering::SeqCst);
            self.log("clear");
            if self.fail_clear {
                return Err(ApiError::Backend {
                    status: 500,
                    message: "clear failed".to_owned(),
                });
            }
            Ok(())
        }
    }

    fn cart_line(total_price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(1),
            user_id: UserId::new(4),
            quantity,
            unit_price: Money::ZERO,
            total_price: Money::from_rupees(total_price),
            is_custom: false,
            pack_id: Some(PackId::new(3)),
            pack: None,
            custom_pack_name: None,
            custom_pack_items: None,
        }
    }

    fn request(method: PaymentMethod) -> CheckoutRequest {
        CheckoutRequest {
            user_id: UserId::new(4),
            items: vec![cart_line(120, 1), cart_line(80, 2)],
            delivery_address: "42 Park St".to_owned(),
            time_slot: "9 AM - 11 AM".to_owned(),
            delivery_date: Utc::now(),
            payment_method: method,
        }
    }

    #[tokio::test]
    async fn test_wallet_checkout_deducts_before_order_then_clears() {
        let reconciler = CheckoutReconciler::new(MockBackend::default());
        let outcome = reconciler
            .checkout(&request(PaymentMethod::Wallet))
            .await
            .unwrap();

        assert_eq!(outcome.wallet_transaction_id, Some(TransactionId::new(77)));
        assert!(outcome.cart_cleared);
        assert_eq!(
            *reconciler.backend.call_log.lock().unwrap(),
            vec!["deduct", "order", "clear"]
        );

        // Deduction covers the full pre-discount cart total
        let deduct = reconciler.backend.captured_deduct.lock().unwrap().clone().unwrap();
        assert_eq!(deduct.amount, Money::from_rupees(200));
        assert_eq!(deduct.description, "Payment for order");

        let order = reconciler.backend.captured_order.lock().unwrap().clone().unwrap();
        assert_eq!(order.quantity, 3);
        assert_eq!(order.total_amount, Money::from_rupees(200));
        assert_eq!(order.wallet_transaction_id, Some(TransactionId::new(77)));
    }

    #[tokio::test]
    async fn test_insufficient_balance_creates_no_order() {
        let backend = MockBackend {
            fail_deduct: Some(|| ApiError::InsufficientBalance("balance too low".to_owned())),
            ..MockBackend::default()
        };
        let reconciler = CheckoutReconciler::new(backend);

        let err = reconciler
            .checkout(&request(PaymentMethod::Wallet))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InsufficientBalance(_)));
        assert_eq!(reconciler.backend.order_calls.load(Ordering::SeqCst), 0);
        assert_eq!(reconciler.backend.clear_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cod_skips_wallet_deduction() {
        let reconciler = CheckoutReconciler::new(MockBackend::default());
        let outcome = reconciler
            .checkout(&request(PaymentMethod::Cod))
            .await
            .unwrap();

        assert_eq!(outcome.wallet_transaction_id, None);
        assert_eq!(reconciler.backend.deduct_calls.load(Ordering::SeqCst), 0);
        assert_eq!(reconciler.backend.order_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_network_calls() {
        let reconciler = CheckoutReconciler::new(MockBackend::default());

        let mut no_address = request(PaymentMethod::Cod);
        no_address.delivery_address = "   ".to_owned();
        let err = reconciler.checkout(&no_address).await.unwrap_err();
        assert!(matches!(err, ApiError::UserError(ref m) if m.contains("delivery address")));

        let mut empty_cart = request(PaymentMethod::Wallet);
        empty_cart.items.clear();
        let err = reconciler.checkout(&empty_cart).await.unwrap_err();
        assert!(matches!(err, ApiError::UserError(ref m) if m.contains("cart is empty")));

        assert_eq!(reconciler.backend.deduct_calls.load(Ordering::SeqCst), 0);
        assert_eq!(reconciler.backend.order_calls.load(Ordering::SeqCst), 0);
        assert_eq!(reconciler.backend.clear_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_online_payment_is_rejected_before_any_call() {
        let reconciler = CheckoutReconciler::new(MockBackend::default());

        let err = reconciler
            .checkout(&request(PaymentMethod::Online))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UserError(ref m) if m.contains("coming soon")));
        assert_eq!(reconciler.backend.deduct_calls.load(Ordering::SeqCst), 0);
        assert_eq!(reconciler.backend.order_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cart_clear_failure_is_tolerated() {
        let backend = MockBackend {
            fail_clear: true,
            ..MockBackend::default()
        };
        let reconciler = CheckoutReconciler::new(backend);

        let outcome = reconciler
            .checkout(&request(PaymentMethod::Cod))
            .await
            .unwrap();
        assert!(!outcome.cart_cleared);
        assert_eq!(outcome.order.id, OrderId::new(501));
    }

    #[tokio::test]
    async fn test_order_failure_after_deduction_surfaces_error() {
        let backend = MockBackend {
            fail_order: Some(|| ApiError::Backend {
                status: 500,
                message: "order store down".to_owned(),
            }),
            ..MockBackend::default()
        };
        let reconciler = CheckoutReconciler::new(backend);

        let err = reconciler
            .checkout(&request(PaymentMethod::Wallet))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Backend { status: 500, .. }));
        // Deduction happened; nothing tries to clear the cart afterwards
        assert_eq!(reconciler.backend.deduct_calls.load(Ordering::SeqCst), 1);
        assert_eq!(reconciler.backend.clear_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_in_flight_guard_resets_after_completion() {
        let reconciler = CheckoutReconciler::new(MockBackend::default());

        reconciler
            .checkout(&request(PaymentMethod::Cod))
            .await
            .unwrap();
        // A second submission after the first finished is allowed
        reconciler
            .checkout(&request(PaymentMethod::Cod))
            .await
            .unwrap();
        assert_eq!(reconciler.backend.order_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_checkout_error_names_phase() {
        let err = CheckoutError::at(
            CheckoutPhase::WalletDeducting,
            ApiError::InsufficientBalance("balance too low".to_owned()),
        );
        assert_eq!(
            err.to_string(),
            "checkout failed while wallet_deducting: insufficient wallet balance: balance too low"
        );
    }
}
