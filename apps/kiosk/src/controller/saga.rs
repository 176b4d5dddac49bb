//! # Order Completion
//!
//! The three remote writes behind "Confirm payment".
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. create_order ──── ok ──► order id (Confirmed)                       │
//! │        │                        │                                       │
//! │        │ error                  ▼                                       │
//! │        │               2. create_order_lines ── error ─► warn, go on    │
//! │        │                        │                                       │
//! │        │                        ▼                                       │
//! │        │               3. clear_cart ── error ─► warn, keep local cart  │
//! │        ▼                                                                │
//! │  ORD-<year>-<1000..9999> (PendingSync), steps 2 and 3 skipped           │
//! │                                                                         │
//! │  Either way the shopper reaches Confirmation.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is rolled back. Only step 1 decides which id the receipt shows.

use chrono::{Datelike, Utc};
use rand::Rng;
use tracing::{info, warn};

use crate::backend::StoreBackend;
use kiosk_core::pricing::{self, CheckoutSummary};
use kiosk_core::{CartItem, Order, OrderLine, OrderStatus, PaymentMethod};

/// Everything frozen at the moment the shopper confirmed.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub user_id: String,
    pub session_id: String,
    pub items: Vec<CartItem>,
    pub summary: CheckoutSummary,
    pub payment_method: PaymentMethod,
}

/// The receipt plus whether the mobile cart was emptied.
#[derive(Debug, Clone)]
pub struct SagaOutcome {
    pub order: Order,
    pub cart_cleared: bool,
}

/// Runs the completion writes. Never fails.
pub async fn complete_order(backend: &dyn StoreBackend, request: CheckoutRequest) -> SagaOutcome {
    let CheckoutRequest {
        user_id,
        session_id,
        items,
        summary,
        payment_method,
    } = request;

    let created = backend
        .create_order(&user_id, &session_id, summary.total, summary.loyalty_discount)
        .await;

    let (order_id, status, cart_cleared) = match created {
        Ok(order_id) => {
            let lines: Vec<OrderLine> = items.iter().map(OrderLine::from).collect();
            if let Err(e) = backend.create_order_lines(&order_id, &lines).await {
                warn!(order_id = %order_id, error = %e, "Failed to write order lines");
            }

            let cart_cleared = match backend.clear_cart(&session_id, &user_id).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Failed to clear mobile cart");
                    false
                }
            };

            (order_id, OrderStatus::Confirmed, cart_cleared)
        }
        Err(e) => {
            let order_id = local_order_id();
            warn!(
                order_id = %order_id,
                session_id = %session_id,
                error = %e,
                "Order not persisted, using local order number"
            );
            (order_id, OrderStatus::PendingSync, false)
        }
    };

    let order = Order {
        order_id,
        total: summary.total,
        item_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
        points_earned: pricing::points_earned(summary.total),
        discount_applied: summary.loyalty_discount,
        status,
        payment_method,
        in_store_count: u32::try_from(items.iter().filter(|item| item.in_stock()).count())
            .unwrap_or(u32::MAX),
        delivery_items: summary.delivery_items,
        created_at: Utc::now(),
    };

    info!(
        order_id = %order.order_id,
        status = ?order.status,
        total = %order.total,
        points_earned = order.points_earned,
        "Order completed"
    );

    SagaOutcome { order, cart_cleared }
}

/// `ORD-<year>-<4 digits>`, shown when the store could not take the order.
pub fn local_order_id() -> String {
    let number = rand::thread_rng().gen_range(1000..=9999);
    format!("ORD-{}-{}", Utc::now().year(), number)
}
