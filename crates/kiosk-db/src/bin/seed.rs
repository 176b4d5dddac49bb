//! # Seed Data Generator
//!
//! Populates a kiosk database with the showroom personas, a small fashion
//! catalog and one mobile cart per persona.
//!
//! ## Usage
//! ```bash
//! cargo run -p kiosk-db --bin seed
//! cargo run -p kiosk-db --bin seed -- --db ./data/kiosk.db
//! ```
//!
//! ## Generated Sessions
//! | Session id   | Shopper | Tier   | Notes                                |
//! |--------------|---------|--------|--------------------------------------|
//! | `SESS-AARAV` | Aarav   | Silver | all items in stock                   |
//! | `SESS-ROHAN` | Rohan   | Gold   | one blazer out of stock              |
//! | `SESS-PRIYA` | Priya   | Gold   | floral top shown as out of stock     |

use std::env;

use kiosk_core::{Money, Product, ShopperProfile};
use kiosk_db::{Database, DbConfig};

/// (id, name, brand, type, price ₹, sizes, image, stock, aisle)
type ProductSeed = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    i64,
    &'static [&'static str],
    &'static str,
    i64,
    Option<i64>,
);

const PRODUCTS: &[ProductSeed] = &[
    ("P-001", "Oversized Graphic Tee", "Bewakoof", "T-Shirt", 699, &["S", "M", "L"], "/data/men/graphic-tee.jpg", 12, Some(2)),
    ("P-002", "Slim Fit Cargo Joggers", "Bewakoof", "Joggers", 1299, &["M", "L"], "/data/men/joggers.jpg", 6, None),
    ("P-003", "Textured Slim Fit Blazer", "Van Heusen", "Blazer", 5999, &["38", "40", "42"], "/data/men/blazer.jpg", 0, None),
    ("P-004", "Oxford Formal Shirt", "Louis Philippe", "Shirt", 2199, &["39", "40", "42"], "/data/men/oxford.jpg", 8, Some(4)),
    ("P-005", "Pleated Formal Trousers", "Allen Solly", "Trousers", 2499, &["30", "32", "34"], "/data/men/trousers.jpg", 4, None),
    ("P-006", "W White Floral Printed Round Neck Cotton Top", "W", "Top", 1499, &["XS", "S", "M"], "/data/women/floral-top.jpg", 7, Some(5)),
    ("P-007", "Chanderi Silk Kurta Set", "Aurelia", "Kurta", 3299, &["S", "M", "L"], "/data/women/kurta-set.jpg", 3, None),
    ("P-008", "Embroidered Dupatta", "W", "Dupatta", 999, &[], "/data/women/dupatta.jpg", 10, Some(6)),
    ("P-009", "Everyday Crew Socks (3 pack)", "", "Socks", 299, &["Free"], "/data/men/socks.jpg", 40, None),
];

const USERS: &[(&str, &str, &str, i64)] = &[
    ("U-AARAV", "Aarav Mehta", "Silver", 320),
    ("U-ROHAN", "Rohan Kapoor", "Gold", 1500),
    ("U-PRIYA", "Priya Sharma", "Gold", 2400),
];

/// (session id, user id, product id, quantity)
const CART_LINES: &[(&str, &str, &str, Option<u32>)] = &[
    ("SESS-AARAV", "U-AARAV", "P-001", Some(2)),
    ("SESS-AARAV", "U-AARAV", "P-002", None),
    ("SESS-ROHAN", "U-ROHAN", "P-004", Some(1)),
    ("SESS-ROHAN", "U-ROHAN", "P-003", Some(1)),
    ("SESS-PRIYA", "U-PRIYA", "P-006", Some(1)),
    ("SESS-PRIYA", "U-PRIYA", "P-007", Some(1)),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./kiosk_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kiosk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kiosk_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kiosk Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for &(id, name, brand, product_type, price, sizes, image, stock, aisle) in PRODUCTS {
        let product = Product {
            id: id.to_string(),
            name: name.to_string(),
            brand: (!brand.is_empty()).then(|| brand.to_string()),
            product_type: Some(product_type.to_string()),
            price: Money::from_major(price),
            sizes: sizes.iter().map(|s| s.to_string()).collect(),
            image_url: Some(image.to_string()),
            stock_count: stock,
            aisle,
            discount_percent: None,
        };
        db.products().insert(&product).await?;
    }
    println!("✓ Inserted {} products", PRODUCTS.len());

    for &(id, name, tier, points) in USERS {
        let profile = ShopperProfile {
            id: id.to_string(),
            name: name.to_string(),
            avatar_url: None,
            loyalty_points: points,
            loyalty_tier: Some(tier.to_string()),
        };
        db.users().insert(&profile).await?;
    }
    println!("✓ Inserted {} shoppers", USERS.len());

    for &(session_id, user_id, product_id, quantity) in CART_LINES {
        db.carts().add_line(session_id, user_id, product_id, quantity).await?;
    }
    println!("✓ Inserted {} cart lines", CART_LINES.len());

    println!();
    println!("Pair the kiosk with one of: SESS-AARAV, SESS-ROHAN, SESS-PRIYA");

    db.close().await;
    Ok(())
}
