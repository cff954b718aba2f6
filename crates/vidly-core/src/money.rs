//! # Money Module
//!
//! Provides the `Money` type for daily rental rates and rental fees.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rates are entered in whole or fractional currency units (0-255) but   │
//! │  stored and multiplied as integer cents. A fee of 3 days at 1.99 is    │
//! │  597 cents, never 5.970000000000001.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vidly_core::money::Money;
//!
//! let rate = Money::from_cents(199);
//! assert_eq!(rate.rental_fee(3).cents(), 597);
//! assert_eq!(rate.to_string(), "1.99");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Serialized as a bare integer so it can sit in JSON next to the
/// `...Cents` field names used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ```rust
    /// use vidly_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(2).cents(), 200);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Fee for keeping a rental `days` days at this daily rate.
    ///
    /// A rental is always charged at least one day, so `days` below 1 is
    /// treated as 1.
    ///
    /// ```rust
    /// use vidly_core::money::Money;
    ///
    /// let rate = Money::from_cents(250);
    /// assert_eq!(rate.rental_fee(0).cents(), 250);
    /// assert_eq!(rate.rental_fee(4).cents(), 1000);
    /// ```
    #[inline]
    pub fn rental_fee(&self, days: i64) -> Money {
        *self * days.max(1)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, days: i64) -> Self {
        Money(self.0 * days)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units_and_parts() {
        let money = Money::from_units(12) + Money::from_cents(34);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.units(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(200).to_string(), "2.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-150).to_string(), "-1.50");
    }

    #[test]
    fn test_rental_fee_charges_at_least_one_day() {
        let rate = Money::from_cents(200);
        assert_eq!(rate.rental_fee(-3), rate);
        assert_eq!(rate.rental_fee(0), rate);
        assert_eq!(rate.rental_fee(1), rate);
        assert_eq!(rate.rental_fee(7).cents(), 1400);
    }

    #[test]
    fn test_zero_rate_is_free() {
        assert!(Money::zero().rental_fee(30).is_zero());
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_cents(199)).unwrap();
        assert_eq!(json, "199");
    }
}
