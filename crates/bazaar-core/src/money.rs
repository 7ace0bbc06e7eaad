//! # Money Module
//!
//! Provides the `Money` type for catalog prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Remote documents carry prices as JSON numbers:                         │
//! │    { "price": 19.99 }  → f64 19.989999999999998...                      │
//! │                                                                         │
//! │  Summing or comparing those in the cache drifts by fractions of a cent │
//! │                                                                         │
//! │  OUR SOLUTION: convert ONCE at the parse boundary                       │
//! │    19.99 → round half away from zero → 1999 cents                       │
//! │    Everything after that (cache rows, filters, UI) is i64 cents         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let parsed = Money::from_major_units(10.99).unwrap();
//! assert_eq!(price, parsed);
//!
//! assert_eq!(parsed.to_string(), "10.99");
//! assert!(Money::parse_decimal("abc").is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MoneyError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// Catalog prices are never negative, so the decimal constructors reject
/// negative input. `from_cents` takes whatever the cache row holds.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Document.price (f64 / "12.50") ──► Product.price ──► ProductRow        │
/// │                                        │              price_cents       │
/// │                                        └──► Displayed as "12.50"        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal major-unit amount (dollars) to cents.
    ///
    /// Rounds half away from zero to the nearest cent. The amount is scaled
    /// through its shortest decimal rendering so `0.285` becomes 29 cents
    /// rather than the 28 a raw `0.285 * 100.0` would give.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_units(12.5).unwrap().cents(), 1250);
    /// assert_eq!(Money::from_major_units(0.285).unwrap().cents(), 29);
    /// assert!(Money::from_major_units(-1.0).is_err());
    /// ```
    pub fn from_major_units(amount: f64) -> Result<Self, MoneyError> {
        if !amount.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        if amount < 0.0 {
            return Err(MoneyError::Negative(amount));
        }

        // f64 Display gives the shortest string that round-trips, so
        // re-parsing it after shifting the exponent avoids binary noise.
        let scaled: f64 = format!("{amount}e2")
            .parse()
            .map_err(|_| MoneyError::NotANumber(amount.to_string()))?;
        let rounded = scaled.round();
        if rounded > i64::MAX as f64 {
            return Err(MoneyError::OutOfRange(amount));
        }
        Ok(Money(rounded as i64))
    }

    /// Parses a decimal string such as `"12.50"` or `" 3 "`.
    pub fn parse_decimal(text: &str) -> Result<Self, MoneyError> {
        let trimmed = text.trim();
        let amount: f64 = trimmed
            .parse()
            .map_err(|_| MoneyError::NotANumber(text.to_string()))?;
        Money::from_major_units(amount)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering, no currency symbol. The currency code lives on
/// the product and the UI layer decides how to localize it.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_units_rounding() {
        assert_eq!(Money::from_major_units(19.99).unwrap().cents(), 1999);
        assert_eq!(Money::from_major_units(0.285).unwrap().cents(), 29);
        assert_eq!(Money::from_major_units(1.005).unwrap().cents(), 101);
        assert_eq!(Money::from_major_units(2.004).unwrap().cents(), 200);
        assert_eq!(Money::from_major_units(0.0).unwrap(), Money::zero());
        assert_eq!(Money::from_major_units(42.0).unwrap().cents(), 4200);
    }

    #[test]
    fn test_from_major_units_rejects_bad_input() {
        assert_eq!(Money::from_major_units(f64::NAN), Err(MoneyError::NotFinite));
        assert_eq!(
            Money::from_major_units(f64::INFINITY),
            Err(MoneyError::NotFinite)
        );
        assert!(matches!(
            Money::from_major_units(-0.5),
            Err(MoneyError::Negative(_))
        ));
        assert!(matches!(
            Money::from_major_units(1e300),
            Err(MoneyError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("12.50").unwrap().cents(), 1250);
        assert_eq!(Money::parse_decimal(" 3 ").unwrap().cents(), 300);
        assert!(matches!(
            Money::parse_decimal("twelve"),
            Err(MoneyError::NotANumber(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }
}
