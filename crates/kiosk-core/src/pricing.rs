//! # Pricing Engine
//!
//! Checkout math for the kiosk: subtotal, tiered loyalty discount, total and
//! points earned. Pure and deterministic; callers reject negative prices
//! before items reach this module.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart ──► Σ line_total ──────────────────────────► subtotal             │
//! │                                                       │                 │
//! │  tier ──► rate (Gold 30% / Silver 20% / Bronze 10%)   │                 │
//! │                     │                                 ▼                 │
//! │                     └──► cap = subtotal × rate  (rounded down)          │
//! │                                                       │                 │
//! │  points ──► ₹1 per point ──► discount = min(points, cap)               │
//! │                                                       │                 │
//! │                             total = subtotal − discount + delivery(0)   │
//! │                                                       │                 │
//! │                             points_earned = floor(total × 5%)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Points map 1:1 onto rupees for the cap. There is no exchange rate.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CartItem, DiscountRate, UserSession};
use crate::POINTS_EARN_BPS;

/// Everything the checkout screen shows before the shopper pays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub subtotal: Money,
    pub tier_rate: DiscountRate,
    pub loyalty_discount: Money,
    pub delivery_fee: Money,
    pub total: Money,
    /// Names of lines that ship home because they are not on the shelf.
    pub delivery_items: Vec<String>,
}

/// Sum of all line totals. An empty cart is zero.
pub fn subtotal(cart: &[CartItem]) -> Money {
    cart.iter().map(CartItem::line_total).sum()
}

/// Discount covered by loyalty points.
///
/// Capped by the shopper's points and by the tier share of the subtotal,
/// and never below zero.
///
/// ```rust
/// use kiosk_core::money::Money;
/// use kiosk_core::pricing::loyalty_discount;
/// use kiosk_core::types::LoyaltyTier;
///
/// let discount = loyalty_discount(Money::from_major(1000), 500, LoyaltyTier::Gold.discount_rate());
/// assert_eq!(discount, Money::from_major(300));
/// ```
pub fn loyalty_discount(subtotal: Money, points: u32, rate: DiscountRate) -> Money {
    let cap = subtotal.portion(rate);
    let discount = Money::from_major(i64::from(points)).min(cap);
    if discount.is_negative() {
        Money::zero()
    } else {
        discount
    }
}

/// Points earned for an order total: `floor(total × 5%)` in whole rupees.
pub fn points_earned(total: Money) -> u32 {
    if !total.is_positive() {
        return 0;
    }
    let points = i128::from(total.minor()) * i128::from(POINTS_EARN_BPS)
        / (10_000 * i128::from(crate::money::MINOR_PER_MAJOR));
    u32::try_from(points).unwrap_or(u32::MAX)
}

/// Prices a cart for a shopper.
pub fn summarize(cart: &[CartItem], user: &UserSession) -> CheckoutSummary {
    let subtotal = subtotal(cart);
    let tier_rate = user.loyalty_tier.discount_rate();
    let loyalty_discount = loyalty_discount(subtotal, user.loyalty_points, tier_rate);
    let delivery_fee = Money::zero();

    CheckoutSummary {
        subtotal,
        tier_rate,
        loyalty_discount,
        delivery_fee,
        total: subtotal - loyalty_discount + delivery_fee,
        delivery_items: cart
            .iter()
            .filter(|item| !item.in_stock())
            .map(|item| item.name.clone())
            .collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
