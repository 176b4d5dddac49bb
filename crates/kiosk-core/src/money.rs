//! # Money Module
//!
//! Provides the `Money` type for every amount the kiosk shows or charges.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LOYALTY MATH ON FLOATS                                                 │
//! │                                                                         │
//! │  ₹999 × 10% tier cap   = 99.9        (fraction of a rupee)              │
//! │  ₹899.1 × 5% points    = 44.955      (floor → 44 points)                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    99900 paise × 1000 bps / 10000 = 9990 paise                          │
//! │    Rounding happens exactly once, at a known place                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kiosk_core::money::Money;
//!
//! let price = Money::from_major(1000);       // ₹1000.00
//! let line = price.multiply_quantity(2);     // ₹2000.00
//! assert_eq!(line.minor(), 200_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::DiscountRate;

/// Minor units per major unit (paise per rupee).
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise).
///
/// ## Where Money Flows
/// ```text
/// Product.price ──► CartItem.unit_price ──► CartItem.line_total()
///                                                 │
///                     pricing::summarize() ◄──────┘
///                            │
///            subtotal − loyalty_discount = total ──► Order.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (paise).
    ///
    /// ```rust
    /// use kiosk_core::money::Money;
    ///
    /// let price = Money::from_minor(129_900); // ₹1299.00
    /// assert_eq!(price.major(), 1299);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units (rupees).
    ///
    /// Loyalty points convert through here: one point is one rupee.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, saturating at the largest
    /// representable amount.
    ///
    /// ```rust
    /// use kiosk_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(79_900);
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 239_700);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Returns the share of this amount given by a rate, rounded down to
    /// whole paise. The result never exceeds the exact share.
    ///
    /// ## Implementation
    /// Integer math: `floor(amount * bps / 10000)`
    ///
    /// ```rust
    /// use kiosk_core::money::Money;
    /// use kiosk_core::types::DiscountRate;
    ///
    /// let subtotal = Money::from_minor(99_905);           // ₹999.05
    /// let cap = subtotal.portion(DiscountRate::from_bps(1000));
    /// assert_eq!(cap.minor(), 9_990);                     // 9990.5 → ₹99.90
    /// ```
    pub fn portion(&self, rate: DiscountRate) -> Money {
        // i128 keeps large carts from overflowing before the division
        let minor = (self.0 as i128 * rate.bps() as i128).div_euclid(10_000);
        Money::from_minor(i64::try_from(minor).unwrap_or(i64::MAX))
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if self <= other {
            self
        } else {
            other
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as `₹1299.00`. The frontend does locale formatting for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.major().abs(), self.minor_part())
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
