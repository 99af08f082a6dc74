//! Catalog resolution: category names to backend identifiers, tier lookups,
//! and display pricing for packs with incomplete product linkage.
//!
//! Resolver failures are terminal for the request but never fatal for the
//! app: callers surface an alert (or a "coming soon" state) and stay on the
//! current screen. No retry loop exists or is required.

use tracing::{instrument, warn};

use fresh_basket_core::{CategoryId, Money, PackDuration};

use crate::api::ApiClient;
use crate::api::types::{Pack, Product};
use crate::error::ApiError;
use crate::pricing::ProductCatalog;

/// Hardcoded tier defaults, the last resort when the backend has no price
/// data at all for a pack.
const SMALL_TIER_DEFAULT: Money = Money::from_rupees(2_500);
const MEDIUM_TIER_DEFAULT: Money = Money::from_rupees(4_500);
const LARGE_TIER_DEFAULT: Money = Money::from_rupees(7_500);

/// Default price shown for a tier with no backend data. Custom packs carry
/// no tier price; they are priced by their selections.
#[must_use]
pub const fn tier_default_price(duration: PackDuration) -> Money {
    match duration {
        PackDuration::Small => SMALL_TIER_DEFAULT,
        PackDuration::Medium => MEDIUM_TIER_DEFAULT,
        PackDuration::Large => LARGE_TIER_DEFAULT,
        PackDuration::Custom => Money::ZERO,
    }
}

// =============================================================================
// Display-price fallback chain
// =============================================================================

/// One pricing source tried when deriving a pack's displayed price.
type PriceStrategy = fn(&Pack) -> Option<Money>;

/// Ordered pricing sources; the first non-zero result wins.
///
/// The backend's product-linkage data is sometimes incomplete for a pack,
/// and the UI must never show a blank or zero price, so each source covers
/// a gap in the previous one.
const PRICE_STRATEGIES: &[PriceStrategy] = &[
    products_sum,
    pack_final_price,
    pack_type_base_price,
];

/// Sum of constituent products, using the pack-product join's unit price
/// when set and the product's own price otherwise.
fn products_sum(pack: &Pack) -> Option<Money> {
    if pack.products.is_empty() {
        return None;
    }

    let total: Money = pack.products.iter().map(line_total).sum();
    total.is_positive().then_some(total)
}

fn line_total(product: &Product) -> Money {
    let (unit_price, quantity) = product.pack_product.as_ref().map_or_else(
        || (product.price, 1),
        |join| {
            let price = if join.unit_price.is_positive() {
                join.unit_price
            } else {
                product.price
            };
            (price, join.quantity)
        },
    );
    unit_price.times(quantity)
}

fn pack_final_price(pack: &Pack) -> Option<Money> {
    pack.final_price.is_positive().then_some(pack.final_price)
}

fn pack_type_base_price(pack: &Pack) -> Option<Money> {
    let base = pack.pack_type.as_ref()?.base_price;
    base.is_positive().then_some(base)
}

/// Derive the price displayed for a pack.
///
/// Tries each source in [`PRICE_STRATEGIES`] and falls back to the
/// hardcoded tier default when all of them come up empty.
#[must_use]
pub fn pack_display_price(pack: &Pack) -> Money {
    for strategy in PRICE_STRATEGIES {
        if let Some(price) = strategy(pack) {
            return price;
        }
    }

    pack.pack_type
        .as_ref()
        .map_or(Money::ZERO, |pt| tier_default_price(pt.duration))
}

/// Find the first pack of a tier within a category's packs.
#[must_use]
pub fn find_pack_by_duration(packs: &[Pack], duration: PackDuration) -> Option<&Pack> {
    packs
        .iter()
        .find(|pack| pack.pack_type.as_ref().is_some_and(|pt| pt.duration == duration))
}

// =============================================================================
// CatalogResolver
// =============================================================================

/// Translates human-facing catalog names into the chain of backend
/// identifiers the other components need.
#[derive(Clone)]
pub struct CatalogResolver {
    client: ApiClient,
}

impl CatalogResolver {
    /// Create a resolver over the shared API client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Resolve a category name to its id by exact match.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no category has that name; callers treat this
    /// as user-visible ("category not found"), not retryable.
    #[instrument(skip(self))]
    pub async fn resolve_category_id(&self, name: &str) -> Result<CategoryId, ApiError> {
        let categories = self.client.categories().await?;
        categories
            .iter()
            .find(|category| category.name == name)
            .map(|category| category.id)
            .ok_or_else(|| ApiError::NotFound(format!("category not found: {name}")))
    }

    /// Resolve the first pack of a tier within a category.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the tier is not provisioned for the
    /// category; the caller shows a "coming soon" state rather than
    /// crashing navigation.
    #[instrument(skip(self))]
    pub async fn resolve_pack_by_duration(
        &self,
        category_id: CategoryId,
        duration: PackDuration,
    ) -> Result<Pack, ApiError> {
        let packs = self.client.packs_by_category(category_id).await?;
        find_pack_by_duration(&packs, duration)
            .cloned()
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "no {duration} pack in category {category_id}"
                ))
            })
    }

    /// The minimum value a custom pack must reach in this category: the
    /// displayed price of the small-tier pack.
    ///
    /// A category without a small tier yields zero, leaving custom packs
    /// always eligible.
    ///
    /// # Errors
    ///
    /// Returns an error if the pack list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn small_pack_threshold(&self, category_id: CategoryId) -> Result<Money, ApiError> {
        let packs = self.client.packs_by_category(category_id).await?;
        Ok(find_pack_by_duration(&packs, PackDuration::Small)
            .map_or(Money::ZERO, pack_display_price))
    }

    /// Fetch every category's ad-hoc products for the custom-pack builder.
    ///
    /// A category whose product list fails to load is skipped with a
    /// warning; the builder works with whatever loaded.
    ///
    /// # Errors
    ///
    /// Returns an error only if the category list itself cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load_product_catalog(&self) -> Result<ProductCatalog, ApiError> {
        let categories = self.client.categories().await?;

        let mut catalog = ProductCatalog::new();
        for category in categories {
            match self.client.products_by_category(category.id).await {
                Ok(products) => {
                    catalog.insert(category.name, products);
                }
                Err(error) => {
                    warn!(
                        category = %category.name,
                        error = %error,
                        "skipping category with unloadable products"
                    );
                }
            }
        }
        Ok(catalog)
    }
}
