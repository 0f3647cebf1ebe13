//! Peso amounts using decimal arithmetic.
//!
//! The Relux API reports prices and totals either as JSON numbers or as
//! decimal strings (`"1250000.00"`); both deserialize into [`Price`].
//! Cart and order totals are always taken from the server and never summed
//! on the client, so the only arithmetic here is the per-line subtotal.

use core::fmt;
use core::ops::Mul;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency symbol used by the storefront (Philippine peso).
pub const CURRENCY_SYMBOL: &str = "₱";

/// A price in pesos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero pesos.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole centavos.
    #[must_use]
    pub fn from_centavos(centavos: i64) -> Self {
        Self(Decimal::new(centavos, 2))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `qty` units at this unit price.
    #[must_use]
    pub fn times(self, qty: u32) -> Self {
        self * qty
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// Formats as `₱1,250,000.00`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let sign = if negative { "-" } else { "" };
        write!(f, "{sign}{CURRENCY_SYMBOL}{grouped}.{fraction}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_centavos(125_000_000).to_string(), "₱1,250,000.00");
        assert_eq!(Price::from_centavos(99_950).to_string(), "₱999.50");
        assert_eq!(Price::ZERO.to_string(), "₱0.00");
    }

    #[test]
    fn test_display_negative_adjustment() {
        assert_eq!(Price::from_centavos(-150_000).to_string(), "-₱1,500.00");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_number: Price = serde_json::from_str("1250000").unwrap();
        let from_string: Price = serde_json::from_str("\"1250000.00\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_line_subtotal() {
        let unit = Price::from_centavos(45_000_000);
        assert_eq!(unit.times(2), Price::from_centavos(90_000_000));
    }
}
