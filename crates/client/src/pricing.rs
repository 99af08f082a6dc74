//! Cost aggregation: pure, side-effect-free arithmetic over in-memory
//! collections. No I/O lives here.
//!
//! Policy for partially-loaded catalog data: missing numeric fields degrade
//! to zero, never to a fault (enforced upstream by the lenient money
//! decoder, so every amount reaching these functions is a concrete value).
//! Internal sums stay unrounded; rounding to two decimal places happens at
//! the display boundary via [`Money::rounded`].

use std::collections::BTreeMap;

use fresh_basket_core::{Money, ProductId};

use crate::api::types::{CartItem, Product};

/// The full per-category product catalog used by the custom-pack builder:
/// category name → that category's ad-hoc products.
pub type ProductCatalog = BTreeMap<String, Vec<Product>>;

/// Quantities the user has picked in the custom-pack builder.
pub type Selections = BTreeMap<ProductId, u32>;

/// Sum of each cart line's already-priced `total_price`.
///
/// The stored field is trusted rather than recomputed from unit price.
/// Zero for an empty cart.
#[must_use]
pub fn cart_subtotal(items: &[CartItem]) -> Money {
    items.iter().map(|item| item.total_price).sum()
}

/// Total quantity across all cart lines (the order payload's `quantity`).
#[must_use]
pub fn order_quantity(items: &[CartItem]) -> u32 {
    items.iter().map(|item| item.quantity).sum()
}

/// Value of the current custom-pack selection.
///
/// Accumulates price × quantity over every selected product across **all**
/// categories, not just the active one: users may top up value from any
/// category to reach the minimum.
#[must_use]
pub fn custom_pack_total(selections: &Selections, catalog: &ProductCatalog) -> Money {
    catalog
        .values()
        .flatten()
        .map(|product| {
            let quantity = selections.get(&product.id).copied().unwrap_or(0);
            product.price.times(quantity)
        })
        .sum()
}

/// Whether a custom pack's value qualifies it for the cart.
///
/// The threshold is the price of the category's small-tier pack; a total
/// exactly at the threshold qualifies.
#[must_use]
pub fn meets_minimum(custom_pack_total: Money, threshold: Money) -> bool {
    custom_pack_total >= threshold
}

/// How much more the user must add to reach the minimum, floored at zero.
#[must_use]
pub fn required_top_up(custom_pack_total: Money, threshold: Money) -> Money {
    threshold.saturating_sub(custom_pack_total)
}

/// The wallet credit applied to an order: `min(balance, amount_due)`,
/// never negative.
#[must_use]
pub fn wallet_discount(balance: Money, amount_due: Money) -> Money {
    balance
        .clamp_non_negative()
        .min(amount_due.clamp_non_negative())
}

/// What remains to pay after the wallet discount.
///
/// No explicit floor: the discount formula already bounds the discount by
/// the amount due, so the result cannot go negative.
#[must_use]
pub fn final_payable(amount_due: Money, discount: Money) -> Money {
    amount_due - discount
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fresh_basket_core::{CartItemId, UserId};
    use rust_decimal::Decimal;

    fn line(id: i64, quantity: u32, total_price: &str) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            user_id: UserId::new(1),
            quantity,
            unit_price: Money::ZERO,
            total_price: Money::new(total_price.parse().unwrap()),
            is_custom: false,
            pack_id: None,
            pack: None,
            custom_pack_name: None,
            custom_pack_items: None,
        }
    }

    fn product(id: i64, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            price: Money::from_rupees(price),
            unit_type: Some("kg".to_owned()),
            pack_product: None,
        }
    }

    #[test]
    fn test_cart_subtotal_empty_is_zero() {
        assert_eq!(cart_subtotal(&[]), Money::ZERO);
    }

    #[test]
    fn test_cart_subtotal_scenario() {
        // cart = [{totalPrice: "120.00"}, {totalPrice: "80.50"}] → "200.50"
        let items = vec![line(1, 1, "120.00"), line(2, 2, "80.50")];
        let subtotal = cart_subtotal(&items);
        assert_eq!(subtotal.rounded(), Decimal::new(20_050, 2));
        assert_eq!(subtotal.to_string(), "₹200.50");
    }

    #[test]
    fn test_cart_subtotal_stable_under_reordering() {
        let forward = vec![line(1, 1, "120.00"), line(2, 1, "80.50"), line(3, 1, "19.99")];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(cart_subtotal(&forward), cart_subtotal(&reversed));
    }

    #[test]
    fn test_order_quantity_sums_lines() {
        let items = vec![line(1, 2, "100"), line(2, 3, "150")];
        assert_eq!(order_quantity(&items), 5);
    }

    #[test]
    fn test_custom_pack_total_empty_selection_is_zero() {
        let mut catalog = ProductCatalog::new();
        catalog.insert("Fruits Pack".to_owned(), vec![product(1, 100)]);
        assert_eq!(custom_pack_total(&Selections::new(), &catalog), Money::ZERO);
    }

    #[test]
    fn test_custom_pack_total_spans_categories() {
        let mut catalog = ProductCatalog::new();
        catalog.insert(
            "Fruits Pack".to_owned(),
            vec![product(1, 100), product(2, 250)],
        );
        catalog.insert("Vegetables Pack".to_owned(), vec![product(3, 40)]);

        let mut selections = Selections::new();
        selections.insert(ProductId::new(1), 2); // 200, active category
        selections.insert(ProductId::new(3), 5); // 200, other category

        let total = custom_pack_total(&selections, &catalog);
        assert_eq!(total, Money::from_rupees(400));
        assert!(!total.amount().is_sign_negative());
    }

    #[test]
    fn test_custom_pack_total_ignores_unknown_selection_ids() {
        let mut catalog = ProductCatalog::new();
        catalog.insert("Fruits Pack".to_owned(), vec![product(1, 100)]);

        let mut selections = Selections::new();
        selections.insert(ProductId::new(99), 7); // not in catalog

        assert_eq!(custom_pack_total(&selections, &catalog), Money::ZERO);
    }

    #[test]
    fn test_meets_minimum_boundary_is_inclusive() {
        let threshold = Money::from_rupees(2000);
        assert!(meets_minimum(Money::from_rupees(2000), threshold));
        assert!(meets_minimum(Money::from_rupees(2001), threshold));
        assert!(!meets_minimum(Money::from_rupees(1999), threshold));
    }

    #[test]
    fn test_meets_minimum_zero_threshold_always_eligible() {
        assert!(meets_minimum(Money::ZERO, Money::ZERO));
        assert!(meets_minimum(Money::from_rupees(1), Money::ZERO));
    }

    #[test]
    fn test_required_top_up_scenario() {
        // selections total ₹1800, small pack ₹2000 → top-up message shows ₹200
        let top_up = required_top_up(Money::from_rupees(1800), Money::from_rupees(2000));
        assert_eq!(top_up, Money::from_rupees(200));
        assert!(!meets_minimum(Money::from_rupees(1800), Money::from_rupees(2000)));
    }

    #[test]
    fn test_required_top_up_floors_at_zero() {
        assert_eq!(
            required_top_up(Money::from_rupees(2500), Money::from_rupees(2000)),
            Money::ZERO
        );
    }

    #[test]
    fn test_wallet_discount_scenario() {
        // balance 50, due 200 → discount 50, final payable 150
        let discount = wallet_discount(Money::from_rupees(50), Money::from_rupees(200));
        assert_eq!(discount, Money::from_rupees(50));
        assert_eq!(
            final_payable(Money::from_rupees(200), discount),
            Money::from_rupees(150)
        );
    }

    #[test]
    fn test_wallet_discount_covers_full_amount() {
        let discount = wallet_discount(Money::from_rupees(500), Money::from_rupees(200));
        assert_eq!(discount, Money::from_rupees(200));
        assert_eq!(
            final_payable(Money::from_rupees(200), discount),
            Money::ZERO
        );
    }

    #[test]
    fn test_wallet_discount_never_negative() {
        let negative = Money::new(Decimal::new(-500, 2));
        assert_eq!(wallet_discount(negative, Money::from_rupees(100)), Money::ZERO);
        assert_eq!(wallet_discount(Money::from_rupees(100), negative), Money::ZERO);
    }

    #[test]
    fn test_final_payable_non_negative_given_discount_bound() {
        for (balance, due) in [(0_i64, 0), (10, 200), (200, 200), (500, 200)] {
            let balance = Money::from_rupees(balance);
            let due = Money::from_rupees(due);
            let discount = wallet_discount(balance, due);
            assert!(discount <= due);
            assert!(final_payable(due, discount) >= Money::ZERO);
        }
    }
}
