//! # Session Store
//!
//! Everything the kiosk knows about the current shopper.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           SessionStore                                  │
//! │                                                                         │
//! │  kiosk_session_id   KIOSK-<base36 ms>-<8 hex>   regenerated on reset    │
//! │  linked_session_id  scanned mobile session      None while idle         │
//! │  screen             Screen                      Idle after reset        │
//! │  epoch              u64                         +1 on every reset       │
//! │  user               Option<UserSession>                                 │
//! │  cart               Vec<CartItem>               insertion order         │
//! │  selected           Option<CartItem>            at most one             │
//! │  payment_method     Option<PaymentMethod>       checkout only           │
//! │  order              Option<Order>               frozen receipt          │
//! │  catalog            Vec<BrandGroup>             browse results          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the screen controller holds a `&mut SessionStore`; observers get
//! [`KioskSnapshot`] copies.

use chrono::Utc;
use serde::Serialize;
use ts_rs::TS;

use kiosk_core::{BrandGroup, CartItem, CheckoutSummary, Order, PaymentMethod, Screen, UserSession};

/// The process-wide kiosk session.
#[derive(Debug)]
pub struct SessionStore {
    kiosk_session_id: String,
    linked_session_id: Option<String>,
    screen: Screen,
    epoch: u64,
    user: Option<UserSession>,
    cart: Vec<CartItem>,
    selected: Option<CartItem>,
    payment_method: Option<PaymentMethod>,
    order: Option<Order>,
    catalog: Vec<BrandGroup>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            kiosk_session_id: generate_kiosk_session_id(),
            linked_session_id: None,
            screen: Screen::Idle,
            epoch: 0,
            user: None,
            cart: Vec::new(),
            selected: None,
            payment_method: None,
            order: None,
            catalog: Vec::new(),
        }
    }

    /// Back to the home screen with nothing remembered.
    ///
    /// Bumps the epoch so results of work started before the reset are
    /// recognized as stale.
    pub fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = SessionStore::new();
        self.epoch = epoch;
    }

    // =========================================================================
    // Setters
    // =========================================================================

    pub fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn link_session(&mut self, session_id: String) {
        self.linked_session_id = Some(session_id);
    }

    /// Installs the paired shopper and their cart in one step.
    pub fn start_shopping(&mut self, user: UserSession, cart: Vec<CartItem>) {
        self.user = Some(user);
        self.cart = cart;
        self.selected = None;
    }

    pub fn select(&mut self, item: CartItem) {
        self.selected = Some(item);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_payment_method(&mut self, method: Option<PaymentMethod>) {
        self.payment_method = method;
    }

    pub fn set_catalog(&mut self, catalog: Vec<BrandGroup>) {
        self.catalog = catalog;
    }

    pub fn complete_order(&mut self, order: Order) {
        self.order = Some(order);
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn kiosk_session_id(&self) -> &str {
        &self.kiosk_session_id
    }

    pub fn linked_session_id(&self) -> Option<&str> {
        self.linked_session_id.as_deref()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn user(&self) -> Option<&UserSession> {
        self.user.as_ref()
    }

    pub fn cart(&self) -> &[CartItem] {
        &self.cart
    }

    pub fn selected(&self) -> Option<&CartItem> {
        self.selected.as_ref()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn catalog(&self) -> &[BrandGroup] {
        &self.catalog
    }

    pub fn cart_item(&self, line_id: &str) -> Option<&CartItem> {
        self.cart.iter().find(|item| item.line_id == line_id)
    }

    pub fn first_in_stock(&self) -> Option<&CartItem> {
        self.cart.iter().find(|item| item.in_stock())
    }

    /// Copies the store for observers.
    pub fn snapshot(
        &self,
        idle_remaining: String,
        checkout: Option<CheckoutSummary>,
        processing_payment: bool,
    ) -> KioskSnapshot {
        KioskSnapshot {
            screen: self.screen,
            kiosk_session_id: self.kiosk_session_id.clone(),
            linked_session_id: self.linked_session_id.clone(),
            epoch: self.epoch,
            user: self.user.clone(),
            cart: self.cart.clone(),
            selected_product: self.selected.clone(),
            payment_method: self.payment_method,
            processing_payment,
            checkout,
            order: self.order.clone(),
            catalog: self.catalog.clone(),
            idle_remaining,
        }
    }
}

/// What the kiosk frontend renders.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct KioskSnapshot {
    pub screen: Screen,
    pub kiosk_session_id: String,
    pub linked_session_id: Option<String>,
    #[ts(type = "number")]
    pub epoch: u64,
    pub user: Option<UserSession>,
    pub cart: Vec<CartItem>,
    pub selected_product: Option<CartItem>,
    pub payment_method: Option<PaymentMethod>,
    pub processing_payment: bool,
    /// Priced cart, present on the checkout screen.
    pub checkout: Option<CheckoutSummary>,
    pub order: Option<Order>,
    pub catalog: Vec<BrandGroup>,
    /// Idle countdown as `m:ss`.
    pub idle_remaining: String,
}

impl Default for KioskSnapshot {
    fn default() -> Self {
        SessionStore::new().snapshot(String::new(), None, false)
    }
}

/// `KIOSK-<base36 epoch millis>-<8 random hex digits>`, uppercase.
pub fn generate_kiosk_session_id() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    format!("KIOSK-{}-{:08X}", to_base36(millis), rand::random::<u32>())
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
