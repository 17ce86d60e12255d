//! Currency amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Symbol prefixed to amounts in customer-facing text.
pub const CURRENCY_SYMBOL: &str = "₹";

/// A currency amount with two decimal places.
///
/// Stored as `NUMERIC(12,2)` and serialized as a decimal string, so values
/// such as `1499.90` survive the round trip without float drift. Incoming
/// JSON amounts are rounded the same way as [`Money::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Creates an amount, rounding to two decimal places.
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp(2))
    }

    /// Creates an amount from minor units (paise, cents).
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// Returns zero.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the underlying decimal.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is below zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:.2}", CURRENCY_SYMBOL, self.0.round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rounds_to_two_places() {
        let money = Money::new(Decimal::new(149_995, 3));
        assert_eq!(money.amount(), Decimal::new(15_000, 2));
    }

    #[test]
    fn test_from_minor() {
        assert_eq!(Money::from_minor(149_900).amount(), Decimal::new(1499, 0));
    }

    #[test]
    fn test_display_uses_currency_symbol() {
        assert_eq!(Money::from_minor(149_900).to_string(), "₹1499.00");
        assert_eq!(Money::from_minor(5).to_string(), "₹0.05");
    }

    #[test]
    fn test_negative() {
        assert!(Money::from_minor(-1).is_negative());
        assert!(!Money::zero().is_negative());
        assert!(!Money::from_minor(1).is_negative());
    }

    #[test]
    fn test_deserializes_from_json_number_and_string() {
        let from_number: Money = serde_json::from_str("1499.5").unwrap();
        let from_string: Money = serde_json::from_str("\"1499.50\"").unwrap();
        assert_eq!(from_number.amount(), from_string.amount());
    }

    #[test]
    fn test_deserialize_rounds_to_two_places() {
        let money: Money = serde_json::from_str("\"1499.999\"").unwrap();
        assert_eq!(money.amount(), Decimal::new(150_000, 2));
        assert_eq!(money.to_string(), "₹1500.00");
        assert_eq!(serde_json::to_string(&money).unwrap(), "\"1500.00\"");
    }
}
