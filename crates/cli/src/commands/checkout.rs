//! Place an order from the current cart.
//!
//! # Usage
//!
//! ```bash
//! # Pay from wallet credits, deliver to the default address
//! fb checkout --method wallet
//!
//! # Cash on delivery to a specific address and slot
//! fb checkout --method cod --address-id 2 --time-slot "4 PM - 6 PM" --date 2026-08-27
//! ```

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use clap::Args;
use tracing::{info, warn};

use fresh_basket_client::pricing::{cart_subtotal, final_payable, wallet_discount};
use fresh_basket_client::{CheckoutReconciler, CheckoutRequest};
use fresh_basket_core::{AddressId, PaymentMethod};

use super::{CliError, Context};

#[derive(Args)]
pub struct CheckoutArgs {
    /// Payment method (`wallet`, `cod`, `online`)
    #[arg(short, long)]
    method: PaymentMethod,

    /// Deliver to this saved address; defaults to the default address
    #[arg(long)]
    address_id: Option<i64>,

    /// Delivery time slot
    #[arg(long, default_value = "9 AM - 11 AM")]
    time_slot: String,

    /// Delivery date as YYYY-MM-DD; defaults to tomorrow
    #[arg(long)]
    date: Option<String>,
}

pub async fn run(ctx: &Context, args: CheckoutArgs) -> Result<(), CliError> {
    let session = ctx.require_session()?;
    let user_id = session.user.id;

    let items = ctx.client.cart(user_id).await?;
    let delivery_address = pick_address(ctx, args.address_id).await?;
    let delivery_date = parse_delivery_date(args.date.as_deref())?;

    let amount_due = cart_subtotal(&items);
    info!("Paying {amount_due} by {}", args.method);

    if args.method == PaymentMethod::Wallet {
        let wallet = ctx.client.wallet().await?.wallet;
        let discount = wallet_discount(wallet.balance, amount_due);
        info!(
            "Wallet credit applied: {discount}; remaining after credit: {}",
            final_payable(amount_due, discount)
        );
    }

    let reconciler = CheckoutReconciler::new(ctx.client.clone());
    let outcome = reconciler
        .checkout(&CheckoutRequest {
            user_id,
            items,
            delivery_address,
            time_slot: args.time_slot,
            delivery_date,
            payment_method: args.method,
        })
        .await?;

    info!(
        "Order [{}] placed - {} by {}",
        outcome.order.id, outcome.order.total_amount, outcome.order.payment_method
    );
    if let Some(tx) = outcome.wallet_transaction_id {
        info!("Wallet transaction: {tx}");
    }
    if !outcome.cart_cleared {
        warn!("Cart could not be cleared; it will refresh on the next `fb cart show`");
    }
    Ok(())
}

/// Resolve the delivery address: an explicit id, the default, or the first
/// saved address.
async fn pick_address(ctx: &Context, address_id: Option<i64>) -> Result<String, CliError> {
    let session = ctx.require_session()?;
    let addresses = ctx.client.addresses(session.user.id).await?;

    let chosen = match address_id {
        Some(id) => addresses
            .iter()
            .find(|a| a.id == AddressId::new(id))
            .ok_or_else(|| CliError::InvalidArgument(format!("no saved address with id {id}")))?,
        None => addresses
            .iter()
            .find(|a| a.is_default)
            .or_else(|| addresses.first())
            .ok_or_else(|| {
                CliError::InvalidArgument(
                    "no saved addresses; add one with `fb address add`".to_owned(),
                )
            })?,
    };
    Ok(chosen.address.clone())
}

/// Parse `YYYY-MM-DD` into a midday UTC delivery timestamp; absent means
/// tomorrow.
fn parse_delivery_date(raw: Option<&str>) -> Result<chrono::DateTime<Utc>, CliError> {
    let date = match raw {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            CliError::InvalidArgument(format!("invalid date \"{raw}\", expected YYYY-MM-DD"))
        })?,
        None => (Utc::now() + Duration::days(1)).date_naive(),
    };
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    Ok(date.and_time(noon).and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delivery_date_explicit() {
        let parsed = parse_delivery_date(Some("2026-08-27")).unwrap();
        assert_eq!(parsed.date_naive().to_string(), "2026-08-27");
    }

    #[test]
    fn test_parse_delivery_date_defaults_to_tomorrow() {
        let parsed = parse_delivery_date(None).unwrap();
        assert!(parsed > Utc::now());
    }

    #[test]
    fn test_parse_delivery_date_rejects_garbage() {
        assert!(parse_delivery_date(Some("27-08-2026")).is_err());
    }
}
