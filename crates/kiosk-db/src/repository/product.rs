//! # Product Repository
//!
//! The store catalog. Prices are stored in paise and sizes as a JSON array.
//!
//! ```text
//! products row                             kiosk_core::Product
//! ┌───────────────────────────────┐        ┌──────────────────────────┐
//! │ price_paise  INTEGER          │ ─────► │ price: Money             │
//! │ sizes        TEXT '["S","M"]' │ ─────► │ sizes: Vec<String>       │
//! │ stock_count  INTEGER          │ ─────► │ stock_count: i64         │
//! └───────────────────────────────┘        └──────────────────────────┘
//! ```
//! Rows with a negative price never leave this module.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use kiosk_core::validation::validate_price_minor;
use kiosk_core::{Money, Product};

/// Raw `products` row.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub product_type: Option<String>,
    pub price_paise: i64,
    pub sizes: String,
    pub image_url: Option<String>,
    pub stock_count: i64,
    pub aisle: Option<i64>,
    pub discount_percent: Option<i64>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        validate_price_minor(row.price_paise)
            .map_err(|e| DbError::invalid_row("product", &row.id, e))?;

        // a malformed sizes column only loses the size list
        let sizes = serde_json::from_str(&row.sizes).unwrap_or_else(|e| {
            warn!(product_id = %row.id, error = %e, "Unreadable sizes column");
            Vec::new()
        });

        Ok(Product {
            id: row.id,
            name: row.name,
            brand: row.brand,
            product_type: row.product_type,
            price: Money::from_minor(row.price_paise),
            sizes,
            image_url: row.image_url,
            stock_count: row.stock_count,
            aisle: row.aisle,
            discount_percent: row.discount_percent.and_then(|d| u32::try_from(d).ok()),
        })
    }
}

/// Converts rows, dropping the ones that fail validation.
pub(crate) fn valid_products(rows: Vec<ProductRow>) -> Vec<Product> {
    rows.into_iter()
        .filter_map(|row| match Product::try_from(row) {
            Ok(product) => Some(product),
            Err(e) => {
                warn!(error = %e, "Skipping catalog row");
                None
            }
        })
        .collect()
}

/// Repository for catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the whole catalog ordered by brand, then name.
    ///
    /// Products without a brand sort first; the caller files them under
    /// the house brand.
    pub async fn list_catalog(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, brand, product_type, price_paise, sizes,
                   image_url, stock_count, aisle, discount_percent
            FROM products
            ORDER BY COALESCE(brand, ''), name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let products = valid_products(rows);
        debug!(count = products.len(), "Catalog loaded");
        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, brand, product_type, price_paise, sizes,
                   image_url, stock_count, aisle, discount_percent
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts a product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let sizes = serde_json::to_string(&product.sizes)
            .map_err(|e| DbError::invalid_row("product", &product.id, e))?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, brand, product_type, price_paise, sizes,
                image_url, stock_count, aisle, discount_percent, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.product_type)
        .bind(product.price.minor())
        .bind(sizes)
        .bind(&product.image_url)
        .bind(product.stock_count)
        .bind(product.aisle)
        .bind(product.discount_percent.map(i64::from))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts catalog products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_catalog_ordered_by_brand() {
        let db = fixtures::database().await;
        let products = db.products();

        products.insert(&fixtures::product("p-1", "Oxford Shirt", Some("Peter England"), 1499, 3)).await.unwrap();
        products.insert(&fixtures::product("p-2", "Chinos", Some("Allen Solly"), 1999, 0)).await.unwrap();
        products.insert(&fixtures::product("p-3", "Basic Tee", None, 499, 9)).await.unwrap();

        let catalog = products.list_catalog().await.unwrap();
        let ids: Vec<_> = catalog.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p-3", "p-2", "p-1"]);
        assert_eq!(catalog[1].sizes, vec!["S".to_string(), "M".to_string()]);
        assert_eq!(products.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_negative_price_rows_are_skipped() {
        let db = fixtures::database().await;
        db.products().insert(&fixtures::product("p-1", "Shirt", None, 100, 1)).await.unwrap();

        sqlx::query(
            "INSERT INTO products (id, name, price_paise, created_at) VALUES ('bad', 'Broken', -5, '2025-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let catalog = db.products().list_catalog().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(db.products().get_by_id("bad").await.is_err());
    }

    #[tokio::test]
    async fn test_get_by_id_round_trips_price() {
        let db = fixtures::database().await;
        db.products().insert(&fixtures::product("p-9", "Kurta", Some("W"), 2199, 2)).await.unwrap();

        let product = db.products().get_by_id("p-9").await.unwrap().unwrap();
        assert_eq!(product.price, Money::from_major(2199));
        assert!(product.in_stock());
    }
}
