//! Cart operations.
//!
//! # Usage
//!
//! ```bash
//! fb cart show
//! fb cart add --pack 3 --quantity 2
//! fb cart set-quantity --item 12 --quantity 3
//! fb cart remove --item 12
//! fb cart clear
//! ```

use clap::Subcommand;
use tracing::info;

use fresh_basket_client::api::types::AddToCartRequest;
use fresh_basket_client::catalog::pack_display_price;
use fresh_basket_client::pricing::cart_subtotal;
use fresh_basket_core::{CartItemId, PackId};

use super::{CliError, Context};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart with its running total
    Show,
    /// Add a pack to the cart
    Add {
        /// Pack id (see `fb catalog packs`)
        #[arg(long)]
        pack: i64,

        /// How many of the pack
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change the quantity of a cart line
    SetQuantity {
        /// Cart line id (see `fb cart show`)
        #[arg(long)]
        item: i64,

        /// New quantity; must be at least 1
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove one cart line
    Remove {
        /// Cart line id
        #[arg(long)]
        item: i64,
    },
    /// Remove every cart line
    Clear,
}

pub async fn run(ctx: &Context, action: CartAction) -> Result<(), CliError> {
    let session = ctx.require_session()?;
    let user_id = session.user.id;

    match action {
        CartAction::Show => {
            let items = ctx.client.cart(user_id).await?;
            if items.is_empty() {
                info!("Cart is empty");
                return Ok(());
            }
            for item in &items {
                info!(
                    "[{}] {} x{} - {}",
                    item.id,
                    item.display_name(),
                    item.quantity,
                    item.total_price
                );
            }
            info!("Total: {}", cart_subtotal(&items));
        }
        CartAction::Add { pack, quantity } => {
            if quantity == 0 {
                return Err(CliError::InvalidArgument(
                    "quantity must be at least 1".to_owned(),
                ));
            }
            let pack = ctx.client.pack_details(PackId::new(pack)).await?;
            let unit_price = pack_display_price(&pack);
            let item = ctx
                .client
                .add_to_cart(&AddToCartRequest {
                    user_id,
                    quantity,
                    unit_price,
                    total_price: unit_price.times(quantity),
                    pack_id: Some(pack.id),
                    is_custom: false,
                    custom_pack_name: None,
                    custom_pack_items: None,
                })
                .await?;
            info!("Added {} x{} - {}", pack.name, quantity, item.total_price);
        }
        CartAction::SetQuantity { item, quantity } => {
            if quantity == 0 {
                return Err(CliError::InvalidArgument(
                    "quantity must be at least 1; use `fb cart remove` to drop the line".to_owned(),
                ));
            }
            let updated = ctx
                .client
                .update_cart_quantity(CartItemId::new(item), quantity)
                .await?;
            info!(
                "{} now x{} - {}",
                updated.display_name(),
                updated.quantity,
                updated.total_price
            );
        }
        CartAction::Remove { item } => {
            ctx.client.remove_cart_item(CartItemId::new(item)).await?;
            info!("Removed cart line {item}");
        }
        CartAction::Clear => {
            ctx.client.clear_cart(user_id).await?;
            info!("Cart cleared");
        }
    }
    Ok(())
}
