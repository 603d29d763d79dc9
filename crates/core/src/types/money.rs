//! Indonesian rupiah amounts using decimal arithmetic.
//!
//! Prices, shipping costs and order totals all arrive from the backend as
//! JSON numbers. They are held as [`Decimal`] so that summing line totals is
//! exact, and formatted the way `id-ID` renders IDR currency: `Rp 150.000`.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An amount of Indonesian rupiah.
///
/// Serializes as a JSON number (the backend does arithmetic on these values,
/// so a string would be concatenated rather than added).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Rupiah(Decimal);

impl Rupiah {
    /// Zero rupiah.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from a whole number of rupiah.
    #[must_use]
    pub fn from_i64(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl From<Decimal> for Rupiah {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Rupiah {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Rupiah {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Rupiah {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Rupiah {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let digits = whole.abs().trunc().to_string();
        let sign = if whole.is_sign_negative() && !whole.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{sign}Rp {}", group_thousands(&digits))
    }
}

/// Insert `.` between each group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

impl Serialize for Rupiah {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract().is_zero()
            && let Some(whole) = self.0.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        match self.0.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => Err(serde::ser::Error::custom("rupiah amount out of range")),
        }
    }
}

impl<'de> Deserialize<'de> for Rupiah {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Rupiah::from_i64(150_000).to_string(), "Rp 150.000");
        assert_eq!(Rupiah::from_i64(1_250_000).to_string(), "Rp 1.250.000");
        assert_eq!(Rupiah::from_i64(999).to_string(), "Rp 999");
        assert_eq!(Rupiah::ZERO.to_string(), "Rp 0");
    }

    #[test]
    fn test_display_rounds_fractions() {
        let amount = Rupiah::new(Decimal::from_str("12499.5").unwrap());
        assert_eq!(amount.to_string(), "Rp 12.500");
        let amount = Rupiah::new(Decimal::from_str("12499.49").unwrap());
        assert_eq!(amount.to_string(), "Rp 12.499");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Rupiah::from_i64(-1500).to_string(), "-Rp 1.500");
        assert!(Rupiah::from_i64(-1).is_negative());
        assert!(!Rupiah::ZERO.is_negative());
    }

    #[test]
    fn test_line_total_and_sum() {
        let lines = [Rupiah::from_i64(25_000) * 3, Rupiah::from_i64(10_000) * 1];
        let total: Rupiah = lines.iter().sum();
        assert_eq!(total, Rupiah::from_i64(85_000));
    }

    #[test]
    fn test_deserializes_numbers_and_strings() {
        let from_int: Rupiah = serde_json::from_str("45000").unwrap();
        let from_float: Rupiah = serde_json::from_str("45000.0").unwrap();
        let from_str: Rupiah = serde_json::from_str("\"45000\"").unwrap();
        assert_eq!(from_int, Rupiah::from_i64(45_000));
        assert_eq!(from_float.amount(), Decimal::from(45_000));
        assert_eq!(from_str, Rupiah::from_i64(45_000));
    }

    #[test]
    fn test_serializes_as_json_number() {
        assert_eq!(
            serde_json::to_string(&Rupiah::from_i64(18_000)).unwrap(),
            "18000"
        );
        let fractional = Rupiah::new(Decimal::from_str("1.5").unwrap());
        assert_eq!(serde_json::to_string(&fractional).unwrap(), "1.5");
    }
}
