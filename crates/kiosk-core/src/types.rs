//! # Domain Types
//!
//! Core domain types shared by the kiosk runtime and the store.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Store records (what the backend returns)                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ ShopperProfile  │   │    CartLine     │       │
//! │  │  price, sizes   │   │ points, tier    │   │ product + user  │       │
//! │  │  stock_count    │   │ avatar_url      │   │ quantity        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Session state (what the kiosk shows)                                  │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  UserSession    │   │    CartItem     │   │     Order       │       │
//! │  │  LoyaltyTier    │   │  StockStatus    │   │  OrderStatus    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;
use crate::{DEFAULT_AVATAR, DEFAULT_PRODUCT_IMAGE, DEFAULT_SIZE, GUEST_DISPLAY_NAME, HOUSE_BRAND};

// =============================================================================
// Screen
// =============================================================================

/// The screen the kiosk is currently showing.
///
/// ```text
/// Idle ──► Loading ──► Welcome ──┬──► Locate ◄──┐
///  ▲                             ├──► OutOfStock ┼──► Checkout ──► Confirmation
///  │                             ├──► Browse ────┘                      │
///  └─────────────── every path returns here ◄──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    /// Pairing screen showing the kiosk session QR code.
    #[default]
    #[serde(rename = "home")]
    Idle,
    /// Shopper session is being fetched.
    Loading,
    /// Paired; cart and actions are shown.
    Welcome,
    /// Store map pointing at the selected product.
    #[serde(rename = "find-product")]
    Locate,
    /// Selected product is not on the shelf here.
    OutOfStock,
    /// Store catalog grouped by brand.
    Browse,
    /// Price summary and payment choice.
    Checkout,
    /// Receipt; returns to Idle on its own.
    Confirmation,
}

impl Screen {
    /// Returns true for the pairing screen.
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Screen::Idle)
    }

    /// Wire name of the screen (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Idle => "home",
            Screen::Loading => "loading",
            Screen::Welcome => "welcome",
            Screen::Locate => "find-product",
            Screen::OutOfStock => "out-of-stock",
            Screen::Browse => "browse",
            Screen::Checkout => "checkout",
            Screen::Confirmation => "confirmation",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A percentage in basis points (1000 bps = 10%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Loyalty Tier
// =============================================================================

/// Loyalty membership level. Each tier maps to exactly one discount cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LoyaltyTier {
    Gold,
    Silver,
    #[default]
    Bronze,
}

impl LoyaltyTier {
    /// Maximum share of the subtotal that points may cover.
    pub const fn discount_rate(&self) -> DiscountRate {
        match self {
            LoyaltyTier::Gold => DiscountRate::from_bps(3000),
            LoyaltyTier::Silver => DiscountRate::from_bps(2000),
            LoyaltyTier::Bronze => DiscountRate::from_bps(1000),
        }
    }

    /// Reads a tier label from the store. Unknown or missing labels are Bronze.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("gold") => LoyaltyTier::Gold,
            Some("silver") => LoyaltyTier::Silver,
            _ => LoyaltyTier::Bronze,
        }
    }
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoyaltyTier::Gold => write!(f, "Gold"),
            LoyaltyTier::Silver => write!(f, "Silver"),
            LoyaltyTier::Bronze => write!(f, "Bronze"),
        }
    }
}

// =============================================================================
// Store Records
// =============================================================================

/// A product from the store catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub product_type: Option<String>,
    pub price: Money,
    /// Sizes offered, first one is the default pick.
    pub sizes: Vec<String>,
    pub image_url: Option<String>,
    pub stock_count: i64,
    /// Aisle number when the store knows where the product sits.
    pub aisle: Option<i64>,
    pub discount_percent: Option<u32>,
}

impl Product {
    /// Returns true if at least one unit is on the shelf.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock_count > 0
    }

    /// Brand used for grouping; products without one belong to the house brand.
    pub fn brand_or_house(&self) -> &str {
        self.brand.as_deref().filter(|b| !b.is_empty()).unwrap_or(HOUSE_BRAND)
    }

    pub fn default_size(&self) -> &str {
        self.sizes.first().map(String::as_str).unwrap_or(DEFAULT_SIZE)
    }

    pub fn image_or_placeholder(&self) -> &str {
        self.image_url.as_deref().unwrap_or(DEFAULT_PRODUCT_IMAGE)
    }
}

/// A shopper record as the store keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShopperProfile {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub loyalty_points: i64,
    /// Raw tier label; interpreted by [`LoyaltyTier::from_label`].
    pub loyalty_tier: Option<String>,
}

/// One row of a shopper's mobile cart, joined with its product and owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub line_id: String,
    pub quantity: Option<u32>,
    pub product: Product,
    pub user: ShopperProfile,
}

/// Catalog products of one brand, as shown on the browse screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BrandGroup {
    pub brand: String,
    pub products: Vec<Product>,
}

// =============================================================================
// User Session
// =============================================================================

/// The paired shopper. Created on pairing, destroyed on return to Idle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub user_id: String,
    pub display_name: String,
    pub avatar_ref: String,
    pub loyalty_points: u32,
    pub loyalty_tier: LoyaltyTier,
}

impl UserSession {
    /// Fallback session used when pairing finds nothing or the store fails.
    pub fn guest(session_id: &str) -> Self {
        UserSession {
            user_id: session_id.to_string(),
            display_name: GUEST_DISPLAY_NAME.to_string(),
            avatar_ref: DEFAULT_AVATAR.to_string(),
            loyalty_points: 0,
            loyalty_tier: LoyaltyTier::Bronze,
        }
    }

    /// Builds a session from the store's shopper record.
    /// Negative point balances are treated as zero.
    pub fn from_profile(profile: &ShopperProfile, avatar_ref: String) -> Self {
        UserSession {
            user_id: profile.id.clone(),
            display_name: profile.name.clone(),
            avatar_ref,
            loyalty_points: u32::try_from(profile.loyalty_points.max(0)).unwrap_or(u32::MAX),
            loyalty_tier: LoyaltyTier::from_label(profile.loyalty_tier.as_deref()),
        }
    }

    #[inline]
    pub fn is_gold_member(&self) -> bool {
        self.loyalty_tier == LoyaltyTier::Gold
    }

    #[inline]
    pub fn is_guest(&self) -> bool {
        self.display_name == GUEST_DISPLAY_NAME && self.loyalty_points == 0
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// Where a product can be picked up in this store.
///
/// A location exists exactly when the product is in stock; the enum makes the
/// other combinations unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "availability", rename_all = "snake_case")]
pub enum StockStatus {
    InStore { location: String },
    OutOfStock,
}

/// One line of the shopper's cart, or a catalog product being inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub line_id: String,
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub unit_price: Money,
    /// Always at least 1.
    pub quantity: u32,
    pub image_ref: String,
    pub stock: StockStatus,
}

impl CartItem {
    /// Builds a cart item from a product.
    ///
    /// `location` is only kept when `in_stock` is true, and an in-stock item
    /// without a known place gets a generic "Ask an associate" location so
    /// the invariant holds either way.
    pub fn from_product(
        line_id: impl Into<String>,
        product: &Product,
        quantity: u32,
        in_stock: bool,
        location: Option<String>,
    ) -> Self {
        let stock = if in_stock {
            StockStatus::InStore {
                location: location.unwrap_or_else(|| "Ask an associate".to_string()),
            }
        } else {
            StockStatus::OutOfStock
        };

        CartItem {
            line_id: line_id.into(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            size: product.default_size().to_string(),
            unit_price: product.price,
            quantity: quantity.max(1),
            image_ref: product.image_or_placeholder().to_string(),
            stock,
        }
    }

    /// `unit_price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn in_stock(&self) -> bool {
        matches!(self.stock, StockStatus::InStore { .. })
    }

    pub fn location(&self) -> Option<&str> {
        match &self.stock {
            StockStatus::InStore { location } => Some(location),
            StockStatus::OutOfStock => None,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the shopper says they will pay. Payment itself is simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Upi,
    Cash,
}

impl FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card" | "credit" | "debit" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(CoreError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Upi => write!(f, "upi"),
            PaymentMethod::Cash => write!(f, "cash"),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// Whether the store accepted the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Persisted by the store; `order_id` is the store's id.
    Confirmed,
    /// The store could not be reached; `order_id` was generated locally.
    PendingSync,
}

/// A line written to the store after the order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        OrderLine {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// The receipt of a completed checkout. Immutable once created.
///
/// Snapshot pattern: every figure is frozen at completion, so later cart or
/// session changes never alter what the confirmation screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub total: Money,
    pub item_count: u32,
    pub points_earned: u32,
    pub discount_applied: Money,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    /// Lines picked up at the counter.
    pub in_store_count: u32,
    /// Names of the lines shipped home (out of stock here).
    pub delivery_items: Vec<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
