//! Cash amounts with till-grade decimal precision
//!
//! Every monetary value in the system is quantized to two fractional digits
//! using round-half-up before it is stored or compared. rust_decimal keeps
//! the arithmetic exact; binary floating point is never involved.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

/// Fractional digits carried by every cash amount.
pub const CASH_SCALE: u32 = 2;

/// Quantizes a raw decimal to two places using round-half-up.
///
/// `2.005` rounds to `2.01` and `2.004` to `2.00`. Quantization is applied
/// to the unsigned magnitude before any sign convention, so
/// `MidpointAwayFromZero` and half-up coincide everywhere this is called.
pub fn round_cash(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CASH_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A cash amount in the drawer's (single) currency
///
/// Constructed values are always quantized to [`CASH_SCALE`] digits, so two
/// `Cash` values representing the same amount compare bit-for-bit equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cash(Decimal);

impl Cash {
    /// Creates a cash amount, rounding half-up to two decimal places.
    pub fn new(amount: Decimal) -> Self {
        Self(round_cash(amount))
    }

    /// The zero amount.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Creates a cash amount from minor units (cents).
    pub fn from_minor(minor_units: i64) -> Self {
        Self(Decimal::new(minor_units, CASH_SCALE))
    }

    /// Returns the underlying decimal value.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }
}

impl Default for Cash {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Decimal> for Cash {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl fmt::Display for Cash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Cash {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        // Both operands carry at most CASH_SCALE digits; no re-rounding needed.
        Self(self.0 + other.0)
    }
}

impl Sub for Cash {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Cash {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Cash {
    fn sum<I: Iterator<Item = Cash>>(iter: I) -> Self {
        iter.fold(Cash::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up_not_bankers() {
        assert_eq!(round_cash(dec!(2.005)), dec!(2.01));
        assert_eq!(round_cash(dec!(2.015)), dec!(2.02));
        assert_eq!(round_cash(dec!(2.004)), dec!(2.00));
        assert_eq!(round_cash(dec!(100.005)), dec!(100.01));
        assert_eq!(round_cash(dec!(100.004)), dec!(100.00));
    }

    #[test]
    fn cash_is_quantized_at_construction() {
        assert_eq!(Cash::new(dec!(10.999)).amount(), dec!(11.00));
        assert_eq!(Cash::new(dec!(10.994)).amount(), dec!(10.99));
        assert_eq!(Cash::from_minor(10050).amount(), dec!(100.50));
    }

    #[test]
    fn cash_arithmetic() {
        let a = Cash::new(dec!(100.00));
        let b = Cash::new(dec!(50.25));

        assert_eq!((a + b).amount(), dec!(150.25));
        assert_eq!((a - b).amount(), dec!(49.75));
        assert_eq!((-b).amount(), dec!(-50.25));
        assert!((-b).is_negative());
    }

    #[test]
    fn cash_sum_over_iterator() {
        let total: Cash = [dec!(1.10), dec!(2.20), dec!(3.30)]
            .into_iter()
            .map(Cash::new)
            .sum();
        assert_eq!(total.amount(), dec!(6.60));
    }

    #[test]
    fn cash_display() {
        assert_eq!(Cash::new(dec!(1525.5)).to_string(), "$1525.50");
    }
}
