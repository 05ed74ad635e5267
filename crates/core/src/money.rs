use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Signed currency amount. Negative values are expenses.
///
/// Equality is numeric, so `1234.50` and `1234.5` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        if self.is_negative() {
            write!(f, "-${:.2}", rounded.abs())
        } else {
            write!(f, "${:.2}", rounded)
        }
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn money(s: &str) -> Money {
        Money::from_decimal(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn equality_ignores_trailing_zeros() {
        assert_eq!(money("1234.50"), money("1234.5"));
    }

    #[test]
    fn display_positive_and_negative() {
        assert_eq!(money("12.5").to_string(), "$12.50");
        assert_eq!(money("-4.5").to_string(), "-$4.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = vec![money("-4.50"), money("10"), money("0.25")]
            .into_iter()
            .sum();
        assert_eq!(total, money("5.75"));
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&money("-4.5")).unwrap(), "-4.5");
        let back: Money = serde_json::from_str("1234.5").unwrap();
        assert_eq!(back, money("1234.50"));
    }
}
