//! Money amounts in integer minor units.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// A non-negative amount of pounds sterling, stored in pence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_pence(pence: u64) -> Self {
        Self(pence)
    }

    /// Convert a decimal pound amount, rounding to the nearest penny.
    ///
    /// Negative, NaN and infinite inputs collapse to zero.
    pub fn from_decimal(pounds: f64) -> Self {
        if !pounds.is_finite() || pounds <= 0.0 {
            return Self::ZERO;
        }
        Self((pounds * 100.0).round() as u64)
    }

    pub fn pence(self) -> u64 {
        self.0
    }

    /// Decimal pounds, for upstream payloads that expect a number.
    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0.saturating_mul(u64::from(rhs)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

/// Serde adapter for upstream payloads that carry decimal pounds.
///
/// Accepts numbers and numeric strings; anything else becomes zero.
pub mod decimal {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.as_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(crate::services::normalize::coerce_money(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decimal_rounds_to_penny() {
        assert_eq!(Money::from_decimal(12.5).pence(), 1250);
        assert_eq!(Money::from_decimal(0.1 + 0.2).pence(), 30);
        assert_eq!(Money::from_decimal(-3.0), Money::ZERO);
        assert_eq!(Money::from_decimal(f64::NAN), Money::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_pence(1250).to_string(), "£12.50");
        assert_eq!(Money::from_pence(7).to_string(), "£0.07");
    }

    #[test]
    fn test_sum_and_mul() {
        let total: Money = [Money::from_pence(199) * 2, Money::from_pence(350)]
            .into_iter()
            .sum();
        assert_eq!(total.pence(), 748);
    }
}
