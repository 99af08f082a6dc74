//! Monetary amounts in rupees, backed by decimal arithmetic.
//!
//! Internal accumulation keeps full precision; rounding to two decimal
//! places happens only at display boundaries so that summing many line
//! items does not compound rounding error.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in rupees.
///
/// Wraps [`rust_decimal::Decimal`] so that monetary values are never mixed
/// with plain numerics. Serializes transparently (the backend exchanges
/// decimal strings such as `"120.00"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Money` from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a `Money` from a whole-rupee amount.
    #[must_use]
    pub const fn from_rupees(rupees: i64) -> Self {
        let magnitude = rupees.unsigned_abs();
        Self(Decimal::from_parts(
            magnitude as u32,
            (magnitude >> 32) as u32,
            0,
            rupees < 0,
            0,
        ))
    }

    /// The underlying decimal amount, unrounded.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Multiply by a line-item quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// The smaller of two amounts.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Subtract, flooring the result at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self((self.0 - other.0).max(Decimal::ZERO))
    }

    /// Negative amounts clamp to zero; non-negative amounts pass through.
    #[must_use]
    pub fn clamp_non_negative(self) -> Self {
        Self(self.0.max(Decimal::ZERO))
    }

    /// The amount rounded to two decimal places (midpoint away from zero),
    /// as used at every display boundary.
    #[must_use]
    pub fn rounded(self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.rounded())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

/// Lenient serde helpers for money fields on the wire.
///
/// The backend is inconsistent about numeric encoding: decimal columns come
/// back as strings (`"120.00"`), computed values as JSON numbers, and
/// partially-loaded catalog rows may omit a price entirely or send `null`.
/// Policy: missing numeric fields degrade to zero, never to a fault.
///
/// Use with `#[serde(default, with = "fresh_basket_core::types::money::lenient")]`.
pub mod lenient {
    use core::fmt;

    use rust_decimal::Decimal;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serialize, Serializer};

    use super::Money;

    /// Serialize the amount as a decimal string, matching the backend.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&money.0, serializer)
    }

    /// Deserialize a string, number, or null into `Money`, defaulting to zero.
    ///
    /// # Errors
    ///
    /// Propagates deserializer errors for structurally invalid JSON; a value
    /// that is present but unparseable degrades to zero.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        struct LenientVisitor;

        impl<'de> Visitor<'de> for LenientVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string, a number, or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                Ok(v.parse::<Decimal>().map_or(Money::ZERO, Money::new))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Ok(Decimal::try_from(v).map_or(Money::ZERO, Money::new))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money::new(Decimal::from(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                Ok(Money::new(Decimal::from(v)))
            }

            fn visit_none<E: de::Error>(self) -> Result<Money, E> {
                Ok(Money::ZERO)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
                Ok(Money::ZERO)
            }

            fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Money, D2::Error> {
                d.deserialize_any(LenientVisitor)
            }
        }

        deserializer.deserialize_any(LenientVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde::Deserialize;

    #[test]
    fn test_display_rounds_to_two_places() {
        let m = Money::new(Decimal::new(20050, 2));
        assert_eq!(m.to_string(), "₹200.50");

        let whole = Money::from_rupees(2500);
        assert_eq!(whole.to_string(), "₹2500.00");
    }

    #[test]
    fn test_internal_sum_is_unrounded() {
        // 0.005 * 3 must accumulate exactly, not as three rounded 0.01s
        let third = Money::new(Decimal::new(5, 3));
        let total: Money = [third, third, third].into_iter().sum();
        assert_eq!(total.amount(), Decimal::new(15, 3));
        assert_eq!(total.rounded(), Decimal::new(2, 2));
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let small = Money::from_rupees(10);
        let big = Money::from_rupees(50);
        assert_eq!(small.saturating_sub(big), Money::ZERO);
        assert_eq!(big.saturating_sub(small), Money::from_rupees(40));
    }

    #[test]
    fn test_clamp_non_negative() {
        let negative = Money::new(Decimal::new(-100, 2));
        assert_eq!(negative.clamp_non_negative(), Money::ZERO);
        assert_eq!(
            Money::from_rupees(5).clamp_non_negative(),
            Money::from_rupees(5)
        );
    }

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, with = "lenient")]
        price: Money,
    }

    #[test]
    fn test_lenient_parses_string_amounts() {
        let row: Row = serde_json::from_str(r#"{"price": "120.00"}"#).unwrap();
        assert_eq!(row.price, Money::new(Decimal::new(12000, 2)));
    }

    #[test]
    fn test_lenient_parses_numeric_amounts() {
        let row: Row = serde_json::from_str(r#"{"price": 80.5}"#).unwrap();
        assert_eq!(row.price.rounded(), Decimal::new(8050, 2));

        let row: Row = serde_json::from_str(r#"{"price": 45}"#).unwrap();
        assert_eq!(row.price, Money::from_rupees(45));
    }

    #[test]
    fn test_lenient_degrades_to_zero() {
        let row: Row = serde_json::from_str(r#"{"price": null}"#).unwrap();
        assert_eq!(row.price, Money::ZERO);

        let row: Row = serde_json::from_str("{}").unwrap();
        assert_eq!(row.price, Money::ZERO);

        let row: Row = serde_json::from_str(r#"{"price": "not-a-number"}"#).unwrap();
        assert_eq!(row.price, Money::ZERO);
    }
}
