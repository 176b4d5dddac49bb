//! # User Repository
//!
//! Shopper profiles. The kiosk only reads them (through cart lookups); the
//! seed binary and tests write them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kiosk_core::ShopperProfile;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    avatar_url: Option<String>,
    loyalty_points: i64,
    loyalty_tier: Option<String>,
}

impl From<UserRow> for ShopperProfile {
    fn from(row: UserRow) -> Self {
        ShopperProfile {
            id: row.id,
            name: row.name,
            avatar_url: row.avatar_url,
            loyalty_points: row.loyalty_points,
            loyalty_tier: row.loyalty_tier,
        }
    }
}

/// Repository for shopper profiles.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a shopper profile.
    pub async fn insert(&self, user: &ShopperProfile) -> DbResult<()> {
        debug!(id = %user.id, "Inserting shopper");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, avatar_url, loyalty_points, loyalty_tier, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .bind(user.loyalty_points)
        .bind(&user.loyalty_tier)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a shopper by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ShopperProfile>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, avatar_url, loyalty_points, loyalty_tier
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShopperProfile::from))
    }
}
