//! Shelf locations for in-stock products.
//!
//! The store has no real planogram feed, so the kiosk resolves locations
//! through [`LocationResolver`]. [`RandomAisles`] keeps a recorded aisle and
//! makes up the rest.

use rand::seq::SliceRandom;
use rand::Rng;

use kiosk_core::Product;

const AISLE_COUNT: i64 = 6;
const SIDES: &[&str] = &["Right", "Left", "Center"];

/// Where to send a shopper for a product.
pub trait LocationResolver: Send + Sync {
    fn locate(&self, product: &Product) -> String;
}

/// Mock locations: `Aisle 1-6, Left|Right|Center`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAisles;

impl LocationResolver for RandomAisles {
    fn locate(&self, product: &Product) -> String {
        let mut rng = rand::thread_rng();
        let aisle = product
            .aisle
            .filter(|aisle| *aisle > 0)
            .unwrap_or_else(|| rng.gen_range(1..=AISLE_COUNT));
        let side = SIDES.choose(&mut rng).copied().unwrap_or("Center");
        format!("Aisle {}, {}", aisle, side)
    }
}

/// Always the same place. For tests and fixed showroom setups.
#[derive(Debug, Clone)]
pub struct FixedLocation(pub String);

impl LocationResolver for FixedLocation {
    fn locate(&self, _product: &Product) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_core::Money;

    fn product(aisle: Option<i64>) -> Product {
        Product {
            id: "p-1".into(),
            name: "Oxford Shirt".into(),
            brand: None,
            product_type: None,
            price: Money::from_major(999),
            sizes: vec![],
            image_url: None,
            stock_count: 3,
            aisle,
            discount_percent: None,
        }
    }

    #[test]
    fn test_random_location_shape() {
        for _ in 0..50 {
            let location = RandomAisles.locate(&product(None));
            let (aisle, side) = location
                .strip_prefix("Aisle ")
                .and_then(|rest| rest.split_once(", "))
                .unwrap();
            let aisle: i64 = aisle.parse().unwrap();
            assert!((1..=6).contains(&aisle));
            assert!(SIDES.contains(&side));
        }
    }

    #[test]
    fn test_recorded_aisle_is_kept() {
        for _ in 0..20 {
            assert!(RandomAisles.locate(&product(Some(9))).starts_with("Aisle 9, "));
        }
    }

    #[test]
    fn test_fixed_location() {
        let resolver = FixedLocation("Aisle 3, Right".into());
        assert_eq!(resolver.locate(&product(None)), "Aisle 3, Right");
    }
}
