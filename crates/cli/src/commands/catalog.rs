//! Catalog browsing: categories, tiered packs, ad-hoc products.
//!
//! # Usage
//!
//! ```bash
//! fb catalog categories
//! fb catalog packs "Fruits Pack"
//! fb catalog pack --duration small "Fruits Pack"
//! fb catalog products "Vegetables Pack"
//! ```

use clap::Subcommand;
use tracing::info;

use fresh_basket_client::CatalogResolver;
use fresh_basket_client::catalog::pack_display_price;
use fresh_basket_core::PackDuration;

use super::{CliError, Context};

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List all categories
    Categories,
    /// List the packs of a category
    Packs {
        /// Category name, matched exactly
        category: String,
    },
    /// Show one pack of a category by tier
    Pack {
        /// Category name, matched exactly
        category: String,

        /// Pack tier (`small`, `medium`, `large`)
        #[arg(short, long)]
        duration: PackDuration,
    },
    /// List the ad-hoc products of a category
    Products {
        /// Category name, matched exactly
        category: String,
    },
}

pub async fn run(ctx: &Context, action: CatalogAction) -> Result<(), CliError> {
    let resolver = CatalogResolver::new(ctx.client.clone());

    match action {
        CatalogAction::Categories => {
            for category in ctx.client.categories().await? {
                info!("[{}] {}", category.id, category.name);
            }
        }
        CatalogAction::Packs { category } => {
            let category_id = resolver.resolve_category_id(&category).await?;
            for pack in ctx.client.packs_by_category(category_id).await? {
                let tier = pack
                    .pack_type
                    .as_ref()
                    .map_or_else(|| "-".to_owned(), |pt| pt.duration.to_string());
                info!(
                    "[{}] {} ({tier}) - {}",
                    pack.id,
                    pack.name,
                    pack_display_price(&pack)
                );
            }
        }
        CatalogAction::Pack { category, duration } => {
            let category_id = resolver.resolve_category_id(&category).await?;
            let pack = resolver
                .resolve_pack_by_duration(category_id, duration)
                .await?;
            info!("{} - {}", pack.name, pack_display_price(&pack));
            for product in &pack.products {
                let quantity = product
                    .pack_product
                    .as_ref()
                    .map_or(1, |join| join.quantity);
                info!("  {} x{quantity}", product.name);
            }
        }
        CatalogAction::Products { category } => {
            let category_id = resolver.resolve_category_id(&category).await?;
            for product in ctx.client.products_by_category(category_id).await? {
                let unit = product.unit_type.as_deref().unwrap_or("unit");
                info!("[{}] {} - {} per {unit}", product.id, product.name, product.price);
            }
        }
    }
    Ok(())
}
