//! # Kiosk Events
//!
//! Everything the screen controller reacts to.
//!
//! ```text
//! ┌──────────────────────────────┐      ┌──────────────────────────────────┐
//! │  KioskEvent (shopper input)  │      │  InternalEvent (async results)   │
//! │  scan, tap, pay, back, exit  │      │  pairing, catalog, order, ticks  │
//! └──────────────┬───────────────┘      └─────────────────┬────────────────┘
//!                │                                        │ tagged with the
//!                ▼                                        ▼ session epoch
//!        ┌───────────────────────────────────────────────────────┐
//!        │         KioskRuntime (one event loop per device)      │
//!        └───────────────────────────────────────────────────────┘
//! ```
//!
//! Internal events carry the epoch of the session that started them; the
//! controller drops any whose epoch no longer matches.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::backend::BackendResult;
use kiosk_core::{CartLine, Order, PaymentMethod, Product};

/// Shopper input, as sent by the kiosk frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KioskEvent {
    /// QR scan or manual entry of the mobile-app session id.
    PairingRequested { session_id: String },
    /// A cart line was tapped.
    ProductChosen { line_id: String },
    /// A catalog product was tapped on the browse screen.
    CatalogProductChosen { product_id: String },
    /// "Find my items": jump to the first item on the shelf.
    FindRequested,
    BrowseRequested,
    CheckoutRequested,
    /// Home delivery for an out-of-stock item.
    DeliveryChosen,
    PaymentMethodSelected { method: PaymentMethod },
    PaymentConfirmed,
    BackRequested,
    AssistantRequested,
    ExitRequested,
    DoneRequested,
    /// Pointer, touch or key input with no other meaning.
    Activity,
}

impl KioskEvent {
    /// Short name used in logs and guard messages.
    pub fn name(&self) -> &'static str {
        match self {
            KioskEvent::PairingRequested { .. } => "pairing",
            KioskEvent::ProductChosen { .. } => "product selection",
            KioskEvent::CatalogProductChosen { .. } => "catalog selection",
            KioskEvent::FindRequested => "find",
            KioskEvent::BrowseRequested => "browse",
            KioskEvent::CheckoutRequested => "checkout",
            KioskEvent::DeliveryChosen => "home delivery",
            KioskEvent::PaymentMethodSelected { .. } => "payment method",
            KioskEvent::PaymentConfirmed => "payment",
            KioskEvent::BackRequested => "back",
            KioskEvent::AssistantRequested => "assistant",
            KioskEvent::ExitRequested => "exit",
            KioskEvent::DoneRequested => "done",
            KioskEvent::Activity => "activity",
        }
    }
}

/// Results of work the controller started, delivered back to its loop.
#[derive(Debug)]
pub enum InternalEvent {
    PairingResolved {
        epoch: u64,
        result: BackendResult<Vec<CartLine>>,
    },
    CatalogLoaded {
        epoch: u64,
        result: BackendResult<Vec<Product>>,
    },
    OrderSettled {
        epoch: u64,
        order: Order,
        cart_cleared: bool,
    },
    IdleTick {
        epoch: u64,
    },
    AutoReturnElapsed {
        epoch: u64,
    },
}

impl InternalEvent {
    pub fn epoch(&self) -> u64 {
        match self {
            InternalEvent::PairingResolved { epoch, .. }
            | InternalEvent::CatalogLoaded { epoch, .. }
            | InternalEvent::OrderSettled { epoch, .. }
            | InternalEvent::IdleTick { epoch }
            | InternalEvent::AutoReturnElapsed { epoch } => *epoch,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InternalEvent::PairingResolved { .. } => "pairing resolved",
            InternalEvent::CatalogLoaded { .. } => "catalog loaded",
            InternalEvent::OrderSettled { .. } => "order settled",
            InternalEvent::IdleTick { .. } => "idle tick",
            InternalEvent::AutoReturnElapsed { .. } => "auto return",
        }
    }
}

/// Outcome of an accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// The event was applied (possibly without changing screens).
    Applied,
    /// The event belonged to a session that has since been reset.
    Stale,
    /// Accepted with a message for the shopper and no transition.
    Notice(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event: KioskEvent =
            serde_json::from_str(r#"{"type":"pairing_requested","session_id":"SESS-1"}"#).unwrap();
        assert_eq!(
            event,
            KioskEvent::PairingRequested {
                session_id: "SESS-1".into()
            }
        );

        let event: KioskEvent =
            serde_json::from_str(r#"{"type":"payment_method_selected","method":"upi"}"#).unwrap();
        assert_eq!(
            event,
            KioskEvent::PaymentMethodSelected {
                method: PaymentMethod::Upi
            }
        );
    }

    #[test]
    fn test_internal_epoch() {
        assert_eq!(InternalEvent::IdleTick { epoch: 7 }.epoch(), 7);
        assert_eq!(InternalEvent::AutoReturnElapsed { epoch: 2 }.name(), "auto return");
    }
}
