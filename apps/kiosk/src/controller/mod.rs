//! # Screen Controller
//!
//! The kiosk state machine. Every change to the session goes through
//! [`ScreenController::handle`] (shopper input) or
//! [`ScreenController::handle_internal`] (results of work it started).
//!
//! ## Screen Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Idle ──scan──► Loading ──resolved──► Welcome                          │
//! │    ▲                                  │  │  │  │                        │
//! │    │            ┌──── item in stock ──┘  │  │  └── checkout (cart > 0)  │
//! │    │            ▼                        │  │            │              │
//! │    │         Locate ◄─── other item      │  browse       ▼              │
//! │    │                                     │  │       Checkout ──pay──┐   │
//! │    │         OutOfStock ◄── no stock ────┘  ▼            ▲          │   │
//! │    │            │                        Browse ─► Locate|OutOfStock│   │
//! │    │            └──── home delivery ─────────────────────┘          │   │
//! │    │                                                                ▼   │
//! │    ├──── idle timeout / exit (any screen but Idle)        Confirmation  │
//! │    └──── 30 s or "done" ◄───────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stale Results
//! Pairing lookups, catalog loads, payment processing and timers run as
//! [`ScheduledTask`]s and report back with the epoch they started in. A
//! return to Idle aborts them and bumps the epoch, so anything still in
//! flight is discarded on arrival.

mod saga;

#[cfg(test)]
mod tests;

pub use saga::{complete_order, local_order_id, CheckoutRequest, SagaOutcome};

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::backend::{BackendResult, StoreBackend};
use crate::error::GuardViolation;
use crate::events::{Handled, InternalEvent, KioskEvent};
use crate::idle::IdleMonitor;
use crate::location::{LocationResolver, RandomAisles};
use crate::state::{KioskSnapshot, SessionStore, Timing};
use crate::timer::ScheduledTask;
use kiosk_core::personalization::matches_segment;
use kiosk_core::validation::validate_session_id;
use kiosk_core::{
    pricing, BrandGroup, CartItem, CartLine, NoPersonalization, Order, PaymentMethod,
    PersonalizationPolicy, Product, Screen, ShopperSegment, UserSession,
};

/// Answer to the shopping assistant button.
pub const ASSISTANT_NOTICE: &str = "Our shopping assistant is coming soon. Please ask a store associate for help.";

type GuardResult = Result<Handled, GuardViolation>;

/// Owns the session and every task started on its behalf.
pub struct ScreenController {
    store: SessionStore,
    idle: IdleMonitor,
    timing: Timing,
    backend: Arc<dyn StoreBackend>,
    personalization: Arc<dyn PersonalizationPolicy>,
    locations: Arc<dyn LocationResolver>,
    events: UnboundedSender<InternalEvent>,

    pairing: Option<ScheduledTask>,
    catalog_load: Option<ScheduledTask>,
    payment: Option<ScheduledTask>,
    auto_return: Option<ScheduledTask>,
}

impl ScreenController {
    /// Creates a controller on the home screen.
    ///
    /// The receiver yields the controller's internal events; feed each one
    /// back through [`ScreenController::handle_internal`].
    pub fn new(backend: Arc<dyn StoreBackend>) -> (Self, UnboundedReceiver<InternalEvent>) {
        let (events, internal_rx) = mpsc::unbounded_channel();
        let timing = Timing::default();

        let controller = ScreenController {
            store: SessionStore::new(),
            idle: IdleMonitor::new(timing.idle_timeout),
            timing,
            backend,
            personalization: Arc::new(NoPersonalization),
            locations: Arc::new(RandomAisles),
            events,
            pairing: None,
            catalog_load: None,
            payment: None,
            auto_return: None,
        };
        (controller, internal_rx)
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.idle = IdleMonitor::new(timing.idle_timeout);
        self.timing = timing;
        self
    }

    pub fn with_personalization(mut self, policy: Arc<dyn PersonalizationPolicy>) -> Self {
        self.personalization = policy;
        self
    }

    pub fn with_locations(mut self, locations: Arc<dyn LocationResolver>) -> Self {
        self.locations = locations;
        self
    }

    // =========================================================================
    // Shopper Input
    // =========================================================================

    /// Applies shopper input. A rejected event leaves the session untouched,
    /// apart from counting as activity.
    pub fn handle(&mut self, event: KioskEvent) -> GuardResult {
        let screen = self.store.screen();
        let name = event.name();
        if !screen.is_idle() {
            self.idle.touch();
        }

        let result = match event {
            KioskEvent::PairingRequested { session_id } => self.start_pairing(session_id),
            KioskEvent::ProductChosen { line_id } => self.choose_cart_item(&line_id),
            KioskEvent::CatalogProductChosen { product_id } => self.choose_catalog_product(&product_id),
            KioskEvent::FindRequested => self.find_first_in_stock(),
            KioskEvent::BrowseRequested => self.browse(),
            KioskEvent::CheckoutRequested => self.open_checkout(),
            KioskEvent::DeliveryChosen => self.choose_delivery(),
            KioskEvent::PaymentMethodSelected { method } => self.select_payment_method(method),
            KioskEvent::PaymentConfirmed => self.confirm_payment(),
            KioskEvent::BackRequested => self.back(),
            KioskEvent::AssistantRequested => self.assistant(),
            KioskEvent::ExitRequested => self.exit(),
            KioskEvent::DoneRequested => self.done(),
            KioskEvent::Activity => Ok(Handled::Applied),
        };

        if let Err(violation) = &result {
            debug!(screen = %screen, event = name, reason = %violation, "Event rejected");
        }
        result
    }

    fn not_allowed(&self, event: &'static str) -> GuardViolation {
        GuardViolation::NotAllowed {
            screen: self.store.screen(),
            event,
        }
    }

    fn require(&self, allowed: &[Screen], event: &'static str) -> Result<(), GuardViolation> {
        if allowed.contains(&self.store.screen()) {
            Ok(())
        } else {
            Err(self.not_allowed(event))
        }
    }

    fn start_pairing(&mut self, session_id: String) -> GuardResult {
        self.require(&[Screen::Idle], "pairing")?;
        let session_id = validate_session_id(&session_id)?;

        self.store.link_session(session_id.clone());
        self.enter(Screen::Loading);

        let epoch = self.store.epoch();
        self.idle.arm(epoch, self.events.clone());

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let delay = self.timing.loading_delay;
        info!(session_id = %session_id, epoch, "Pairing started");

        self.pairing = Some(ScheduledTask::spawn(async move {
            let (_, result) = tokio::join!(
                tokio::time::sleep(delay),
                backend.lookup_session_cart(&session_id)
            );
            let _ = events.send(InternalEvent::PairingResolved { epoch, result });
        }));

        Ok(Handled::Applied)
    }

    fn choose_cart_item(&mut self, line_id: &str) -> GuardResult {
        self.require(&[Screen::Welcome, Screen::Locate], "product selection")?;
        let item = self
            .store
            .cart_item(line_id)
            .cloned()
            .ok_or_else(|| GuardViolation::UnknownCartLine(line_id.to_string()))?;
        self.show_item(item);
        Ok(Handled::Applied)
    }

    fn choose_catalog_product(&mut self, product_id: &str) -> GuardResult {
        self.require(&[Screen::Browse], "catalog selection")?;
        let product = self
            .store
            .catalog()
            .iter()
            .flat_map(|group| group.products.iter())
            .find(|product| product.id == product_id)
            .cloned()
            .ok_or_else(|| GuardViolation::UnknownProduct(product_id.to_string()))?;

        let item = self.item_for(product.id.clone(), &product, 1);
        self.show_item(item);
        Ok(Handled::Applied)
    }

    fn find_first_in_stock(&mut self) -> GuardResult {
        self.require(&[Screen::Welcome], "find")?;
        let item = self
            .store
            .first_in_stock()
            .cloned()
            .ok_or(GuardViolation::NothingInStock)?;
        self.show_item(item);
        Ok(Handled::Applied)
    }

    /// Locate for items on the shelf, OutOfStock for the rest.
    fn show_item(&mut self, item: CartItem) {
        let next = if item.in_stock() {
            Screen::Locate
        } else {
            Screen::OutOfStock
        };
        debug!(product_id = %item.product_id, in_stock = item.in_stock(), "Product selected");
        self.store.select(item);
        self.enter(next);
    }

    fn browse(&mut self) -> GuardResult {
        self.require(&[Screen::Welcome], "browse")?;
        self.store.set_catalog(Vec::new());
        self.enter(Screen::Browse);

        let epoch = self.store.epoch();
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        self.catalog_load = Some(ScheduledTask::spawn(async move {
            let result = backend.list_catalog().await;
            let _ = events.send(InternalEvent::CatalogLoaded { epoch, result });
        }));

        Ok(Handled::Applied)
    }

    fn open_checkout(&mut self) -> GuardResult {
        self.require(&[Screen::Welcome], "checkout")?;
        if self.store.cart().is_empty() {
            return Err(GuardViolation::EmptyCart);
        }
        self.store.set_payment_method(None);
        self.enter(Screen::Checkout);
        Ok(Handled::Applied)
    }

    fn choose_delivery(&mut self) -> GuardResult {
        self.require(&[Screen::OutOfStock], "home delivery")?;
        self.store.set_payment_method(None);
        self.enter(Screen::Checkout);
        Ok(Handled::Applied)
    }

    fn select_payment_method(&mut self, method: PaymentMethod) -> GuardResult {
        self.require(&[Screen::Checkout], "payment method")?;
        if self.payment.is_some() {
            return Err(GuardViolation::CheckoutInProgress);
        }
        self.store.set_payment_method(Some(method));
        Ok(Handled::Applied)
    }

    fn confirm_payment(&mut self) -> GuardResult {
        self.require(&[Screen::Checkout], "payment")?;
        if self.payment.is_some() {
            return Err(GuardViolation::CheckoutInProgress);
        }
        let payment_method = self
            .store
            .payment_method()
            .ok_or(GuardViolation::NoPaymentMethod)?;

        let session_id = self.store.linked_session_id().unwrap_or_default().to_string();
        let user = self
            .store
            .user()
            .cloned()
            .unwrap_or_else(|| UserSession::guest(&session_id));
        let items = self.store.cart().to_vec();
        let request = CheckoutRequest {
            user_id: user.user_id.clone(),
            session_id,
            summary: pricing::summarize(&items, &user),
            items,
            payment_method,
        };

        info!(
            session_id = %request.session_id,
            total = %request.summary.total,
            method = %payment_method,
            "Processing payment"
        );

        let epoch = self.store.epoch();
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let delay = self.timing.payment_delay;
        self.payment = Some(ScheduledTask::spawn(async move {
            tokio::time::sleep(delay).await;
            let SagaOutcome { order, cart_cleared } = complete_order(backend.as_ref(), request).await;
            let _ = events.send(InternalEvent::OrderSettled {
                epoch,
                order,
                cart_cleared,
            });
        }));

        Ok(Handled::Applied)
    }

    fn back(&mut self) -> GuardResult {
        self.require(
            &[Screen::Locate, Screen::OutOfStock, Screen::Browse, Screen::Checkout],
            "back",
        )?;
        if self.payment.is_some() {
            return Err(GuardViolation::CheckoutInProgress);
        }
        self.catalog_load = None;
        self.store.clear_selection();
        self.store.set_payment_method(None);
        self.enter(Screen::Welcome);
        Ok(Handled::Applied)
    }

    fn assistant(&mut self) -> GuardResult {
        self.require(&[Screen::Welcome], "assistant")?;
        info!("Shopping assistant requested");
        Ok(Handled::Notice(ASSISTANT_NOTICE.to_string()))
    }

    fn exit(&mut self) -> GuardResult {
        if self.store.screen().is_idle() {
            return Err(GuardViolation::AlreadyIdle);
        }
        self.return_home("exit requested");
        Ok(Handled::Applied)
    }

    fn done(&mut self) -> GuardResult {
        self.require(&[Screen::Confirmation], "done")?;
        self.return_home("done");
        Ok(Handled::Applied)
    }

    // =========================================================================
    // Internal Events
    // =========================================================================

    /// Applies the result of work this controller started.
    pub fn handle_internal(&mut self, event: InternalEvent) -> Handled {
        let current = self.store.epoch();
        if event.epoch() != current {
            debug!(
                event = event.name(),
                event_epoch = event.epoch(),
                current_epoch = current,
                "Discarding stale event"
            );
            return Handled::Stale;
        }

        let screen = self.store.screen();
        match event {
            InternalEvent::PairingResolved { result, .. } if screen == Screen::Loading => {
                self.finish_pairing(result);
                Handled::Applied
            }
            InternalEvent::CatalogLoaded { result, .. } if screen == Screen::Browse => {
                self.catalog_load = None;
                self.install_catalog(result);
                Handled::Applied
            }
            InternalEvent::OrderSettled {
                order, cart_cleared, ..
            } if screen == Screen::Checkout => {
                self.show_confirmation(order, cart_cleared);
                Handled::Applied
            }
            InternalEvent::IdleTick { .. } if !screen.is_idle() => {
                if self.idle.on_tick() {
                    self.return_home("idle timeout");
                }
                Handled::Applied
            }
            InternalEvent::AutoReturnElapsed { .. } if screen == Screen::Confirmation => {
                self.return_home("confirmation timeout");
                Handled::Applied
            }
            other => {
                debug!(event = other.name(), screen = %screen, "Ignoring event for another screen");
                Handled::Stale
            }
        }
    }

    fn finish_pairing(&mut self, result: BackendResult<Vec<CartLine>>) {
        self.pairing = None;
        let session_id = self.store.linked_session_id().unwrap_or_default().to_string();

        let (user, cart) = match result {
            Ok(lines) if !lines.is_empty() => {
                let owner = &lines[0].user;
                let avatar = self
                    .personalization
                    .avatar_for(&owner.name, owner.avatar_url.as_deref());
                let user = UserSession::from_profile(owner, avatar);
                let cart: Vec<CartItem> = lines
                    .iter()
                    .map(|line| {
                        self.item_for(line.line_id.clone(), &line.product, line.quantity.unwrap_or(1))
                    })
                    .collect();
                (user, cart)
            }
            Ok(_) => {
                info!(session_id = %session_id, "No cart for session, continuing as guest");
                (UserSession::guest(&session_id), Vec::new())
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Cart lookup failed, continuing as guest");
                (UserSession::guest(&session_id), Vec::new())
            }
        };

        info!(
            session_id = %session_id,
            user = %user.display_name,
            tier = %user.loyalty_tier,
            items = cart.len(),
            "Shopper paired"
        );
        self.store.start_shopping(user, cart);
        self.enter(Screen::Welcome);
    }

    fn install_catalog(&mut self, result: BackendResult<Vec<Product>>) {
        let products = match result {
            Ok(products) => products,
            Err(e) => {
                warn!(error = %e, "Catalog load failed, showing an empty catalog");
                Vec::new()
            }
        };
        let segment = self
            .store
            .user()
            .and_then(|user| self.personalization.segment_for(&user.display_name));
        let catalog = group_catalog(products, segment);
        debug!(brands = catalog.len(), ?segment, "Catalog loaded");
        self.store.set_catalog(catalog);
    }

    fn show_confirmation(&mut self, order: Order, cart_cleared: bool) {
        self.payment = None;
        if cart_cleared {
            self.store.clear_cart();
        }
        self.store.complete_order(order);
        self.enter(Screen::Confirmation);

        self.auto_return = Some(ScheduledTask::after(
            self.timing.confirmation_return,
            self.events.clone(),
            InternalEvent::AutoReturnElapsed {
                epoch: self.store.epoch(),
            },
        ));
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Cart item for a product, with stock and shelf location resolved.
    fn item_for(&self, line_id: String, product: &Product, quantity: u32) -> CartItem {
        let in_stock = product.in_stock() && !self.personalization.forces_out_of_stock(&product.name);
        let location = in_stock.then(|| self.locations.locate(product));
        CartItem::from_product(line_id, product, quantity, in_stock, location)
    }

    fn enter(&mut self, screen: Screen) {
        let from = self.store.screen();
        self.store.set_screen(screen);
        debug!(from = %from, to = %screen, epoch = self.store.epoch(), "Screen changed");
    }

    /// Full reset. Aborts every task and timer of the old session.
    fn return_home(&mut self, reason: &'static str) {
        self.pairing = None;
        self.catalog_load = None;
        self.payment = None;
        self.auto_return = None;
        self.idle.disarm();

        let from = self.store.screen();
        self.store.reset();
        info!(
            reason,
            from = %from,
            epoch = self.store.epoch(),
            kiosk_session_id = %self.store.kiosk_session_id(),
            "Returned to home screen"
        );
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn screen(&self) -> Screen {
        self.store.screen()
    }

    pub fn is_processing_payment(&self) -> bool {
        self.payment.is_some()
    }

    pub fn snapshot(&self) -> KioskSnapshot {
        let checkout = match (self.store.screen(), self.store.user()) {
            (Screen::Checkout, Some(user)) => Some(pricing::summarize(self.store.cart(), user)),
            _ => None,
        };
        self.store
            .snapshot(self.idle.countdown().display(), checkout, self.is_processing_payment())
    }
}

/// Groups products by brand (house brand when missing), brands sorted by
/// name, keeping only the shopper's segment when one is known.
pub fn group_catalog(products: Vec<Product>, segment: Option<ShopperSegment>) -> Vec<BrandGroup> {
    let mut groups: BTreeMap<String, Vec<Product>> = BTreeMap::new();
    for product in products
        .into_iter()
        .filter(|product| matches_segment(product, segment))
    {
        groups
            .entry(product.brand_or_house().to_string())
            .or_default()
            .push(product);
    }
    groups
        .into_iter()
        .map(|(brand, products)| BrandGroup { brand, products })
        .collect()
}
