//! # Cart Repository
//!
//! Mobile-app carts keyed by the app session id the kiosk pairs with.
//!
//! ## Pairing Lookup
//! ```text
//! scanned session id
//!       │
//!       ▼
//! cart ──JOIN── products ──JOIN── users
//!       │
//!       ▼
//! Vec<CartLine> (line + product + owner), oldest line first
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRow;
use kiosk_core::validation::validate_quantity;
use kiosk_core::{CartLine, Product, ShopperProfile};

/// One joined row of a session cart.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    line_id: String,
    quantity: Option<i64>,
    #[sqlx(flatten)]
    product: ProductRow,
    user_id: String,
    user_name: String,
    user_avatar_url: Option<String>,
    user_loyalty_points: i64,
    user_loyalty_tier: Option<String>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = DbError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let quantity = match row.quantity {
            None => None,
            Some(q) => {
                validate_quantity(q).map_err(|e| DbError::invalid_row("cart", &row.line_id, e))?;
                u32::try_from(q).ok()
            }
        };

        Ok(CartLine {
            line_id: row.line_id,
            quantity,
            product: Product::try_from(row.product)?,
            user: ShopperProfile {
                id: row.user_id,
                name: row.user_name,
                avatar_url: row.user_avatar_url,
                loyalty_points: row.user_loyalty_points,
                loyalty_tier: row.user_loyalty_tier,
            },
        })
    }
}

/// Repository for session carts.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Returns every line of a session's cart with its product and owner.
    ///
    /// Lines that fail validation (negative price, quantity outside 1..=999)
    /// are skipped and logged; the rest of the cart still loads.
    pub async fn lines_for_session(&self, session_id: &str) -> DbResult<Vec<CartLine>> {
        debug!(session_id = %session_id, "Looking up session cart");

        let rows = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT
                c.id              AS line_id,
                c.quantity        AS quantity,
                p.id              AS id,
                p.name            AS name,
                p.brand           AS brand,
                p.product_type    AS product_type,
                p.price_paise     AS price_paise,
                p.sizes           AS sizes,
                p.image_url       AS image_url,
                p.stock_count     AS stock_count,
                p.aisle           AS aisle,
                p.discount_percent AS discount_percent,
                u.id              AS user_id,
                u.name            AS user_name,
                u.avatar_url      AS user_avatar_url,
                u.loyalty_points  AS user_loyalty_points,
                u.loyalty_tier    AS user_loyalty_tier
            FROM cart c
            INNER JOIN products p ON p.id = c.product_id
            INNER JOIN users u ON u.id = c.user_id
            WHERE c.session_id = ?1
            ORDER BY c.created_at, c.rowid
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let lines: Vec<CartLine> = rows
            .into_iter()
            .filter_map(|row| match CartLine::try_from(row) {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Skipping cart line");
                    None
                }
            })
            .collect();

        debug!(session_id = %session_id, count = lines.len(), "Session cart loaded");
        Ok(lines)
    }

    /// Adds a line to a session cart. Returns the new line id.
    pub async fn add_line(
        &self,
        session_id: &str,
        user_id: &str,
        product_id: &str,
        quantity: Option<u32>,
    ) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO cart (id, session_id, user_id, product_id, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(session_id)
        .bind(user_id)
        .bind(product_id)
        .bind(quantity.map(i64::from))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Deletes a shopper's lines from a session cart. Returns rows removed.
    pub async fn clear(&self, session_id: &str, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart WHERE session_id = ?1 AND user_id = ?2")
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        debug!(
            session_id = %session_id,
            removed = result.rows_affected(),
            "Session cart cleared"
        );
        Ok(result.rows_affected())
    }
}
