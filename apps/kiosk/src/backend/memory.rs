//! In-memory [`StoreBackend`] for demos and tests.
//!
//! Any operation can be set to fail, which is how the degraded paths
//! (guest fallback, locally numbered orders) are exercised.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{BackendError, BackendResult, StoreBackend};
use kiosk_core::{CartLine, Money, OrderLine, Product};

/// Backend operations, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LookupSessionCart,
    ListCatalog,
    CreateOrder,
    CreateOrderLines,
    ClearCart,
}

/// An order header as recorded by [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedOrder {
    pub order_id: String,
    pub user_id: String,
    pub session_id: String,
    pub total: Money,
    pub discount: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    carts: HashMap<String, Vec<CartLine>>,
    catalog: Vec<Product>,
    orders: Vec<RecordedOrder>,
    order_lines: HashMap<String, Vec<OrderLine>>,
    failing: HashSet<Operation>,
    calls: Vec<Operation>,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mobile session cart.
    pub fn with_cart(self, session_id: impl Into<String>, lines: Vec<CartLine>) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.carts.insert(session_id.into(), lines);
        }
        self
    }

    pub fn with_catalog(self, products: Vec<Product>) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.catalog = products;
        }
        self
    }

    /// Makes `op` fail until [`MemoryBackend::recover`] is called.
    pub fn fail(&self, op: Operation) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.insert(op);
        }
    }

    pub fn recover(&self, op: Operation) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.remove(&op);
        }
    }

    pub fn orders(&self) -> Vec<RecordedOrder> {
        self.inner.lock().map(|inner| inner.orders.clone()).unwrap_or_default()
    }

    pub fn order_lines(&self, order_id: &str) -> Vec<OrderLine> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.order_lines.get(order_id).cloned())
            .unwrap_or_default()
    }

    pub fn cart(&self, session_id: &str) -> Vec<CartLine> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.carts.get(session_id).cloned())
            .unwrap_or_default()
    }

    /// Every operation attempted so far, in call order.
    pub fn calls(&self) -> Vec<Operation> {
        self.inner.lock().map(|inner| inner.calls.clone()).unwrap_or_default()
    }

    /// Records the call and returns the state, or the injected failure.
    fn begin(&self, op: Operation) -> BackendResult<MutexGuard<'_, Inner>> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| BackendError::Unavailable("memory store poisoned".into()))?;
        inner.calls.push(op);
        if inner.failing.contains(&op) {
            return Err(BackendError::Unavailable(format!("{:?} failed (injected)", op)));
        }
        Ok(inner)
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn lookup_session_cart(&self, session_id: &str) -> BackendResult<Vec<CartLine>> {
        let inner = self.begin(Operation::LookupSessionCart)?;
        Ok(inner.carts.get(session_id).cloned().unwrap_or_default())
    }

    async fn list_catalog(&self) -> BackendResult<Vec<Product>> {
        let inner = self.begin(Operation::ListCatalog)?;
        Ok(inner.catalog.clone())
    }

    async fn create_order(
        &self,
        user_id: &str,
        session_id: &str,
        total: Money,
        discount: Money,
    ) -> BackendResult<String> {
        let mut inner = self.begin(Operation::CreateOrder)?;
        if total.is_negative() {
            return Err(BackendError::Rejected(format!("negative total {}", total)));
        }
        let order_id = format!("MEM-{:04}", inner.orders.len() + 1);
        inner.orders.push(RecordedOrder {
            order_id: order_id.clone(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            total,
            discount,
            created_at: Utc::now(),
        });
        Ok(order_id)
    }

    async fn create_order_lines(&self, order_id: &str, lines: &[OrderLine]) -> BackendResult<()> {
        let mut inner = self.begin(Operation::CreateOrderLines)?;
        if !inner.orders.iter().any(|order| order.order_id == order_id) {
            return Err(BackendError::Rejected(format!("unknown order {}", order_id)));
        }
        inner
            .order_lines
            .entry(order_id.to_string())
            .or_default()
            .extend_from_slice(lines);
        Ok(())
    }

    async fn clear_cart(&self, session_id: &str, user_id: &str) -> BackendResult<()> {
        let mut inner = self.begin(Operation::ClearCart)?;
        if let Some(lines) = inner.carts.get_mut(session_id) {
            lines.retain(|line| line.user.id != user_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_session_is_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.lookup_session_cart("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_and_recovery() {
        let backend = MemoryBackend::new();
        backend.fail(Operation::CreateOrder);
        assert!(backend
            .create_order("u", "s", Money::from_major(1), Money::zero())
            .await
            .is_err());

        backend.recover(Operation::CreateOrder);
        let id = backend
            .create_order("u", "s", Money::from_major(1), Money::zero())
            .await
            .unwrap();
        assert_eq!(id, "MEM-0001");
        assert_eq!(backend.calls(), vec![Operation::CreateOrder, Operation::CreateOrder]);
    }

    #[tokio::test]
    async fn test_lines_need_an_order() {
        let backend = MemoryBackend::new();
        let lines = vec![OrderLine {
            product_id: "p".into(),
            quantity: 1,
            unit_price: Money::zero(),
        }];
        assert!(backend.create_order_lines("missing", &lines).await.is_err());
    }
}
