//! # Store Backend
//!
//! The narrow query/mutation interface the kiosk uses to reach store data.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         StoreBackend                                    │
//! │                                                                         │
//! │  lookup_session_cart(session)   ─► lines | empty | error  (pairing)     │
//! │  list_catalog()                 ─► products               (browse)      │
//! │  create_order(user, session, total, discount) ─► order id (checkout)    │
//! │  create_order_lines(order, lines)             ─► ok       best effort   │
//! │  clear_cart(session, user)                    ─► ok       best effort   │
//! │                                                                         │
//! │       ┌──────────────────┐          ┌──────────────────┐                │
//! │       │  SqliteBackend   │          │  MemoryBackend   │                │
//! │       │  (kiosk-db)      │          │  demos + tests   │                │
//! │       └──────────────────┘          └──────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No method's error is ever shown to the shopper. The controller degrades
//! to a guest session, an empty catalog or a locally numbered order.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use kiosk_core::{CartLine, Money, OrderLine, Product};
use kiosk_db::DbError;

pub use memory::{MemoryBackend, Operation};
pub use sqlite::SqliteBackend;

/// Collaborator failures.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store rejected the request: {0}")]
    Rejected(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Store operations used by the screen controller.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Cart lines of a mobile session, each with its product and owner.
    async fn lookup_session_cart(&self, session_id: &str) -> BackendResult<Vec<CartLine>>;

    /// The full catalog.
    async fn list_catalog(&self) -> BackendResult<Vec<Product>>;

    /// Creates an order header and returns the store's order id.
    async fn create_order(
        &self,
        user_id: &str,
        session_id: &str,
        total: Money,
        discount: Money,
    ) -> BackendResult<String>;

    async fn create_order_lines(&self, order_id: &str, lines: &[OrderLine]) -> BackendResult<()>;

    /// Removes the shopper's lines from the mobile session cart.
    async fn clear_cart(&self, session_id: &str, user_id: &str) -> BackendResult<()>;
}
