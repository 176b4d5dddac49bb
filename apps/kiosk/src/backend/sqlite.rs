//! [`StoreBackend`] over the kiosk SQLite database.

use async_trait::async_trait;
use tracing::debug;

use super::{BackendResult, StoreBackend};
use kiosk_core::{CartLine, Money, OrderLine, Product};
use kiosk_db::Database;

/// Store backend reading and writing the local SQLite store.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    db: Database,
}

impl SqliteBackend {
    pub fn new(db: Database) -> Self {
        SqliteBackend { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl StoreBackend for SqliteBackend {
    async fn lookup_session_cart(&self, session_id: &str) -> BackendResult<Vec<CartLine>> {
        Ok(self.db.carts().lines_for_session(session_id).await?)
    }

    async fn list_catalog(&self) -> BackendResult<Vec<Product>> {
        Ok(self.db.products().list_catalog().await?)
    }

    async fn create_order(
        &self,
        user_id: &str,
        session_id: &str,
        total: Money,
        discount: Money,
    ) -> BackendResult<String> {
        Ok(self.db.orders().create(user_id, session_id, total, discount).await?)
    }

    async fn create_order_lines(&self, order_id: &str, lines: &[OrderLine]) -> BackendResult<()> {
        Ok(self.db.orders().add_lines(order_id, lines).await?)
    }

    async fn clear_cart(&self, session_id: &str, user_id: &str) -> BackendResult<()> {
        let removed = self.db.carts().clear(session_id, user_id).await?;
        debug!(session_id = %session_id, removed, "Remote cart cleared");
        Ok(())
    }
}
