//! Wallet screen backing logic: balance, ledger, and credit purchases.
//!
//! The overview needs two independent endpoints; they are fetched
//! concurrently and the screen renders only when both arrive. The credit
//! purchase flow talks to a payment gateway through a seam: the real SDK
//! runs on-device, so out of the box only an auto-approving stub exists.

use tracing::{info, instrument};

use fresh_basket_core::Money;

use crate::api::ApiClient;
use crate::api::types::{
    CreditPackage, PurchaseCreateOrderRequest, PurchaseOrderResponse, VerifyPurchaseRequest,
    Wallet, WalletTransaction,
};
use crate::error::ApiError;

/// Everything the wallet screen shows: balance, ledger, and the purchasable
/// credit packages.
#[derive(Debug, Clone)]
pub struct WalletOverview {
    pub wallet: Wallet,
    pub transactions: Vec<WalletTransaction>,
    pub packages: Vec<CreditPackage>,
}

/// A payment collected by the gateway, referenced during verification.
#[derive(Debug, Clone)]
pub struct GatewayPayment {
    pub payment_id: String,
}

/// Seam to the payment gateway SDK.
pub trait PaymentGateway {
    /// Collect payment for a gateway order.
    ///
    /// # Errors
    ///
    /// Returns an error when the payment is declined or abandoned.
    async fn collect(&self, order: &PurchaseOrderResponse) -> Result<GatewayPayment, ApiError>;
}

/// Gateway stand-in that approves every payment immediately.
///
/// Online collection happens in the gateway's own SDK on the device; this
/// stub keeps the create/verify round trip exercisable end to end.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubGateway;

impl PaymentGateway for StubGateway {
    async fn collect(&self, order: &PurchaseOrderResponse) -> Result<GatewayPayment, ApiError> {
        Ok(GatewayPayment {
            payment_id: format!("stub_pay_{}", order.gateway_order_id),
        })
    }
}

/// Wallet operations over the shared API client.
#[derive(Clone)]
pub struct WalletService {
    client: ApiClient,
}

impl WalletService {
    /// Create a wallet service over the shared API client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch balance, ledger, and credit packages concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error if either fetch fails; the overview is
    /// all-or-nothing.
    #[instrument(skip(self))]
    pub async fn overview(&self) -> Result<WalletOverview, ApiError> {
        let (wallet_response, packages) =
            tokio::try_join!(self.client.wallet(), self.client.credit_packages())?;

        Ok(WalletOverview {
            wallet: wallet_response.wallet,
            transactions: wallet_response.transactions,
            packages,
        })
    }

    /// Buy a credit package: create the gateway order, collect payment, and
    /// verify it so the backend credits the wallet.
    ///
    /// Returns the credits added to the balance.
    ///
    /// # Errors
    ///
    /// Returns an error if order creation, collection, or verification
    /// fails. A failure before verification leaves the pending ledger entry
    /// for the backend to expire; the wallet is never credited without a
    /// verified payment.
    #[instrument(skip(self, gateway, package), fields(package = %package.id))]
    pub async fn buy_credits(
        &self,
        package: &CreditPackage,
        gateway: &impl PaymentGateway,
    ) -> Result<Money, ApiError> {
        let order = self
            .client
            .purchase_create_order(&PurchaseCreateOrderRequest {
                package_id: package.id,
                amount: package.price,
            })
            .await?;

        let payment = gateway.collect(&order).await?;

        let verified = self
            .client
            .purchase_verify(&VerifyPurchaseRequest {
                gateway_payment_id: payment.payment_id,
                gateway_order_id: order.gateway_order_id,
                transaction_id: order.transaction_id,
            })
            .await?;

        info!(credits = %verified.credits_added, "wallet credited");
        Ok(verified.credits_added)
    }
}
