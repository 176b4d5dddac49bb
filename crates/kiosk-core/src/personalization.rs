//! # Personalization Policy
//!
//! Demo-only shopper personalization, isolated behind one trait so the
//! screen controller never matches on names itself.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PersonalizationPolicy                               │
//! │                                                                         │
//! │   avatar_for(name, url)      ──► which picture the welcome screen shows │
//! │   forces_out_of_stock(name)  ──► demo product that is never on shelf    │
//! │   segment_for(name)          ──► catalog filter on the browse screen    │
//! │                                                                         │
//! │   DemoPersonalization  = the showroom rules                             │
//! │   NoPersonalization    = store data as-is                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Product;
use crate::DEFAULT_AVATAR;

/// Catalog segment inferred for a shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ShopperSegment {
    Women,
    Men,
}

impl ShopperSegment {
    fn path_marker(&self) -> &'static str {
        match self {
            ShopperSegment::Women => "/women/",
            ShopperSegment::Men => "/men/",
        }
    }
}

/// Returns true if a product belongs to the segment, judged by its image path.
///
/// With no segment every product matches.
pub fn matches_segment(product: &Product, segment: Option<ShopperSegment>) -> bool {
    match segment {
        None => true,
        Some(segment) => product
            .image_url
            .as_deref()
            .is_some_and(|url| url.to_lowercase().contains(segment.path_marker())),
    }
}

/// Personalization hooks consulted by the screen controller.
pub trait PersonalizationPolicy: Send + Sync {
    /// Avatar shown for a shopper, given the avatar the store holds.
    fn avatar_for(&self, display_name: &str, stored_avatar: Option<&str>) -> String;

    /// Products that must show as out of stock regardless of shelf count.
    fn forces_out_of_stock(&self, product_name: &str) -> bool;

    /// Catalog segment to filter browse results by, if one can be inferred.
    fn segment_for(&self, display_name: &str) -> Option<ShopperSegment>;
}

// =============================================================================
// Demo Rules
// =============================================================================

const DEMO_AVATARS: &[(&str, &str)] = &[
    ("aarav", "/aarav.jpg"),
    ("rohan", "/rohan.jpg"),
    ("priya", "/priya.jpg"),
];

const DEMO_OUT_OF_STOCK: &[&str] = &["w white floral", "white floral printed round neck"];

const WOMEN_NAMES: &[&str] = &[
    "priya", "priyanka", "sneha", "kavya", "ananya", "meera", "divya", "neha", "shreya",
];

const MEN_NAMES: &[&str] = &[
    "aarav", "rohan", "rahul", "arjun", "vikram", "aditya", "siddharth", "karan",
];

/// Showroom rules for the demo personas.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoPersonalization;

impl PersonalizationPolicy for DemoPersonalization {
    fn avatar_for(&self, display_name: &str, stored_avatar: Option<&str>) -> String {
        let name = display_name.to_lowercase();
        DEMO_AVATARS
            .iter()
            .find(|(persona, _)| name.contains(persona))
            .map(|(_, avatar)| avatar.to_string())
            .or_else(|| stored_avatar.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string())
    }

    fn forces_out_of_stock(&self, product_name: &str) -> bool {
        let name = product_name.to_lowercase();
        DEMO_OUT_OF_STOCK.iter().any(|pattern| name.contains(pattern))
    }

    fn segment_for(&self, display_name: &str) -> Option<ShopperSegment> {
        let name = display_name.to_lowercase();
        if WOMEN_NAMES.iter().any(|n| name.contains(n)) {
            Some(ShopperSegment::Women)
        } else if MEN_NAMES.iter().any(|n| name.contains(n)) {
            Some(ShopperSegment::Men)
        } else {
            None
        }
    }
}

/// Uses store data unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersonalization;

impl PersonalizationPolicy for NoPersonalization {
    fn avatar_for(&self, _display_name: &str, stored_avatar: Option<&str>) -> String {
        stored_avatar.unwrap_or(DEFAULT_AVATAR).to_string()
    }

    fn forces_out_of_stock(&self, _product_name: &str) -> bool {
        false
    }

    fn segment_for(&self, _display_name: &str) -> Option<ShopperSegment> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product_with_image(url: Option<&str>) -> Product {
        Product {
            id: "p".into(),
            name: "Tee".into(),
            brand: None,
            product_type: None,
            price: Money::from_major(499),
            sizes: vec![],
            image_url: url.map(str::to_string),
            stock_count: 1,
            aisle: None,
            discount_percent: None,
        }
    }

    #[test]
    fn test_demo_avatar_overrides_store() {
        let policy = DemoPersonalization;
        assert_eq!(policy.avatar_for("Priya Sharma", Some("/db.jpg")), "/priya.jpg");
        assert_eq!(policy.avatar_for("Meera", Some("/db.jpg")), "/db.jpg");
        assert_eq!(policy.avatar_for("Meera", None), DEFAULT_AVATAR);
    }

    #[test]
    fn test_demo_forced_out_of_stock() {
        let policy = DemoPersonalization;
        assert!(policy.forces_out_of_stock("W White Floral Printed Round Neck Cotton Top"));
        assert!(!policy.forces_out_of_stock("Blue Denim Jacket"));
        assert!(!NoPersonalization.forces_out_of_stock("W White Floral Top"));
    }

    #[test]
    fn test_segments() {
        let policy = DemoPersonalization;
        assert_eq!(policy.segment_for("Aarav Mehta"), Some(ShopperSegment::Men));
        assert_eq!(policy.segment_for("Priyanka"), Some(ShopperSegment::Women));
        assert_eq!(policy.segment_for("Guest"), None);
        assert_eq!(NoPersonalization.segment_for("Aarav"), None);
    }

    #[test]
    fn test_matches_segment_by_image_path() {
        let men = product_with_image(Some("/data/men/shirt.jpg"));
        let women = product_with_image(Some("/data/women/kurta.jpg"));
        let bare = product_with_image(None);

        assert!(matches_segment(&men, Some(ShopperSegment::Men)));
        assert!(!matches_segment(&women, Some(ShopperSegment::Men)));
        assert!(matches_segment(&women, Some(ShopperSegment::Women)));
        assert!(!matches_segment(&bare, Some(ShopperSegment::Women)));
        assert!(matches_segment(&bare, None));
    }
}
