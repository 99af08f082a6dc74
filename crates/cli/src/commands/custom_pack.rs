//! Custom-pack builder: pick ad-hoc products up to the category minimum.
//!
//! # Usage
//!
//! ```bash
//! # Quote a selection against the category's small-pack minimum
//! fb custom-pack quote --category "Fruits Pack" --select 9=2 --select 14=1
//!
//! # Add it to the cart once it qualifies
//! fb custom-pack build --category "Fruits Pack" --select 9=2 --select 14=1 \
//!     --name "My Weekly Basket"
//! ```
//!
//! Selections may come from any category; the minimum is set by the
//! category named with `--category`.

use clap::Subcommand;
use tracing::info;

use fresh_basket_client::CatalogResolver;
use fresh_basket_client::api::types::{AddToCartRequest, CustomPackItem};
use fresh_basket_client::pricing::{
    ProductCatalog, Selections, custom_pack_total, meets_minimum, required_top_up,
};
use fresh_basket_core::{Money, ProductId};

use super::{CliError, Context};

#[derive(Subcommand)]
pub enum CustomPackAction {
    /// Show the selection's value and whether it meets the minimum
    Quote {
        /// Category whose small pack sets the minimum
        #[arg(long)]
        category: String,

        /// Product selection as `<product-id>=<quantity>`, repeatable
        #[arg(long = "select", value_name = "ID=QTY")]
        selections: Vec<String>,
    },
    /// Add the selection to the cart as a custom pack
    Build {
        /// Category whose small pack sets the minimum
        #[arg(long)]
        category: String,

        /// Product selection as `<product-id>=<quantity>`, repeatable
        #[arg(long = "select", value_name = "ID=QTY")]
        selections: Vec<String>,

        /// Name shown on the cart line and the order
        #[arg(long, default_value = "Custom Pack")]
        name: String,
    },
}

pub async fn run(ctx: &Context, action: CustomPackAction) -> Result<(), CliError> {
    let resolver = CatalogResolver::new(ctx.client.clone());

    match action {
        CustomPackAction::Quote {
            category,
            selections,
        } => {
            let selections = parse_selections(&selections)?;
            let (total, threshold, _) = quote(&resolver, &category, &selections).await?;
            info!("Selection value: {total}");
            info!("Minimum ({category} small pack): {threshold}");
            if meets_minimum(total, threshold) {
                info!("Eligible for the cart");
            } else {
                info!("Add {} more to qualify", required_top_up(total, threshold));
            }
        }
        CustomPackAction::Build {
            category,
            selections,
            name,
        } => {
            let session = ctx.require_session()?;
            let selections = parse_selections(&selections)?;
            if selections.is_empty() {
                return Err(CliError::InvalidArgument(
                    "no products selected; pass at least one --select".to_owned(),
                ));
            }

            let (total, threshold, catalog) = quote(&resolver, &category, &selections).await?;
            if !meets_minimum(total, threshold) {
                return Err(CliError::InvalidArgument(format!(
                    "selection is {total}, below the {threshold} minimum; add {} more",
                    required_top_up(total, threshold)
                )));
            }

            let items = snapshot_items(&selections, &catalog);
            let item = ctx
                .client
                .add_to_cart(&AddToCartRequest {
                    user_id: session.user.id,
                    quantity: 1,
                    unit_price: total,
                    total_price: total,
                    pack_id: None,
                    is_custom: true,
                    custom_pack_name: Some(name.clone()),
                    custom_pack_items: Some(items),
                })
                .await?;
            info!("Added \"{name}\" - {}", item.total_price);
        }
    }
    Ok(())
}

async fn quote(
    resolver: &CatalogResolver,
    category: &str,
    selections: &Selections,
) -> Result<(Money, Money, ProductCatalog), CliError> {
    let category_id = resolver.resolve_category_id(category).await?;
    let threshold = resolver.small_pack_threshold(category_id).await?;
    let catalog = resolver.load_product_catalog().await?;
    let total = custom_pack_total(selections, &catalog);
    Ok((total, threshold, catalog))
}

/// Parse repeated `<product-id>=<quantity>` arguments.
fn parse_selections(raw: &[String]) -> Result<Selections, CliError> {
    let mut selections = Selections::new();
    for entry in raw {
        let (id, quantity) = entry.split_once('=').ok_or_else(|| {
            CliError::InvalidArgument(format!("invalid selection \"{entry}\", expected ID=QTY"))
        })?;
        let id: i64 = id.trim().parse().map_err(|_| {
            CliError::InvalidArgument(format!("invalid product id in \"{entry}\""))
        })?;
        let quantity: u32 = quantity.trim().parse().map_err(|_| {
            CliError::InvalidArgument(format!("invalid quantity in \"{entry}\""))
        })?;
        if quantity == 0 {
            continue;
        }
        selections.insert(ProductId::new(id), quantity);
    }
    Ok(selections)
}

/// Snapshot the selected products into order-ready custom pack lines.
fn snapshot_items(selections: &Selections, catalog: &ProductCatalog) -> Vec<CustomPackItem> {
    catalog
        .values()
        .flatten()
        .filter_map(|product| {
            let quantity = selections.get(&product.id).copied()?;
            Some(CustomPackItem {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity,
                unit: product.unit_type.clone(),
            })
        })
        .collect()
}
