//! # kiosk-core: Pure Domain Logic for the Store Kiosk
//!
//! Domain types and business rules for the in-store self-service kiosk.
//! Everything here is deterministic and free of I/O; the kiosk runtime and
//! the database crate build on top of it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kiosk Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/kiosk (runtime)                           │   │
//! │  │   Screen controller ─ Session store ─ Idle monitor ─ Backend    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kiosk-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌─────────────┐ │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │personalize  │ │   │
//! │  │   │  Screen   │  │   Money   │  │ Checkout  │  │  demo rules │ │   │
//! │  │   │ CartItem  │  │  portion  │  │ Summary   │  │             │ │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └─────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO TIMERS • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 kiosk-db (Database Layer)                       │   │
//! │  │          SQLite carts, catalog, orders, migrations              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Screen, CartItem, Order, etc.)
//! - [`money`] - Money type in paise (no floating point)
//! - [`pricing`] - Subtotal, loyalty discount, points earned
//! - [`personalization`] - Demo personalization policy
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use kiosk_core::money::Money;
//! use kiosk_core::pricing::{loyalty_discount, points_earned};
//! use kiosk_core::types::LoyaltyTier;
//!
//! let subtotal = Money::from_major(1000);
//! let discount = loyalty_discount(subtotal, 50, LoyaltyTier::Bronze.discount_rate());
//! let total = subtotal - discount;
//!
//! assert_eq!(total, Money::from_major(950));
//! assert_eq!(points_earned(total), 47);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod personalization;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use personalization::{DemoPersonalization, NoPersonalization, PersonalizationPolicy, ShopperSegment};
pub use pricing::CheckoutSummary;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Seconds of inactivity before a non-idle screen returns home.
pub const IDLE_TIMEOUT_SECS: u64 = 300;

/// Seconds the confirmation screen stays up before returning home.
pub const CONFIRMATION_RETURN_SECS: u64 = 30;

/// Share of the order total credited back as points (5%).
pub const POINTS_EARN_BPS: u32 = 500;

/// Display name of the fallback shopper.
pub const GUEST_DISPLAY_NAME: &str = "Guest";

/// Avatar used when nothing better is known.
pub const DEFAULT_AVATAR: &str = "/placeholder-user.jpg";

/// Image used for products without one.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/placeholder.jpg";

/// Brand products fall under when the store has none recorded.
pub const HOUSE_BRAND: &str = "ABFRL";

/// Size picked when a product lists none.
pub const DEFAULT_SIZE: &str = "M";

/// Longest pairing identifier accepted from the scanner.
pub const MAX_SESSION_ID_LEN: usize = 64;

/// Maximum quantity of a single cart line.
pub const MAX_ITEM_QUANTITY: i64 = 999;
