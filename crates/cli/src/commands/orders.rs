//! Order history.
//!
//! # Usage
//!
//! ```bash
//! fb orders list
//! fb orders show --id 501
//! ```

use clap::Subcommand;
use tracing::info;

use fresh_basket_core::OrderId;

use super::{CliError, Context};

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List past orders, newest first as returned by the backend
    List,
    /// Show one order with its full snapshot
    Show {
        /// Order id
        #[arg(long)]
        id: i64,
    },
}

pub async fn run(ctx: &Context, action: OrdersAction) -> Result<(), CliError> {
    let session = ctx.require_session()?;

    match action {
        OrdersAction::List => {
            let orders = ctx.client.orders(session.user.id).await?;
            if orders.is_empty() {
                info!("No orders yet");
                return Ok(());
            }
            for order in orders {
                info!(
                    "[{}] {} - {} ({}, {})",
                    order.id,
                    order.created_at.map_or_else(|| "-".to_owned(), |t| t.format("%Y-%m-%d").to_string()),
                    order.total_amount,
                    order.payment_method,
                    order.status
                );
            }
        }
        OrdersAction::Show { id } => {
            let order = ctx.client.order_details(OrderId::new(id)).await?;
            info!("Order [{}] - {}", order.id, order.status);
            info!("Total: {} by {}", order.total_amount, order.payment_method);
            info!("Deliver to: {}", order.delivery_address);
            if let Some(slot) = &order.time_slot {
                info!("Slot: {slot}");
            }
            if let Some(date) = order.delivery_date {
                info!("Date: {}", date.format("%Y-%m-%d"));
            }
            if order.is_custom {
                let name = order.custom_pack_name.as_deref().unwrap_or("Custom Pack");
                info!("Custom pack: {name}");
                for item in order.custom_pack_items.iter().flatten() {
                    info!("  {} x{} - {}", item.name, item.quantity, item.price);
                }
            }
            if let Some(tx) = order.wallet_transaction_id {
                info!("Wallet transaction: {tx}");
            }
        }
    }
    Ok(())
}
