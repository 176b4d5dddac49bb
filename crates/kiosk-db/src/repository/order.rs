//! # Order Repository
//!
//! Orders written by the kiosk checkout, plus their lines.
//!
//! ## Write Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(user, session, total, discount) ──► orders row ──► order id     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  add_lines(order id, lines)             ──► order_items rows (one tx)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartRepository::clear(session, user)   ──► cart rows deleted           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Each step is its own call; the kiosk decides what a failure means.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kiosk_core::{Money, OrderLine};

/// An order as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredOrder {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub total: Money,
    pub discount: Money,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    session_id: String,
    total_paise: i64,
    discount_paise: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for StoredOrder {
    fn from(row: OrderRow) -> Self {
        StoredOrder {
            id: row.id,
            user_id: row.user_id,
            session_id: row.session_id,
            total: Money::from_minor(row.total_paise),
            discount: Money::from_minor(row.discount_paise),
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    product_id: String,
    quantity: i64,
    unit_price_paise: i64,
}

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order header. Returns the generated order id.
    pub async fn create(
        &self,
        user_id: &str,
        session_id: &str,
        total: Money,
        discount: Money,
    ) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, session_id, total_paise, discount_paise, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 'confirmed', ?6)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(session_id)
        .bind(total.minor())
        .bind(discount.minor())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(order_id = %id, session_id = %session_id, total = %total, "Order created");
        Ok(id)
    }

    /// Writes all lines of an order in one transaction.
    pub async fn add_lines(&self, order_id: &str, lines: &[OrderLine]) -> DbResult<()> {
        debug!(order_id = %order_id, count = lines.len(), "Writing order lines");

        let mut tx = self.pool.begin().await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, unit_price_paise)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(order_id)
            .bind(&line.product_id)
            .bind(i64::from(line.quantity))
            .bind(line.unit_price.minor())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StoredOrder>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, session_id, total_paise, discount_paise, status, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredOrder::from))
    }

    /// Lines of an order, in insertion order.
    pub async fn lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT product_id, quantity, unit_price_paise
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let quantity = u32::try_from(row.quantity)
                    .map_err(|e| DbError::invalid_row("order_item", &row.product_id, e))?;
                Ok(OrderLine {
                    product_id: row.product_id,
                    quantity,
                    unit_price: Money::from_minor(row.unit_price_paise),
                })
            })
            .collect()
    }
}
