//! Screen controller scenarios, run on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use super::*;
use crate::backend::{MemoryBackend, Operation};
use crate::location::FixedLocation;
use kiosk_core::{
    DemoPersonalization, LoyaltyTier, Money, OrderStatus, ShopperProfile, StockStatus,
};

const SHELF: &str = "Aisle 3, Right";

// =============================================================================
// Fixtures
// =============================================================================

fn product(id: &str, name: &str, brand: Option<&str>, price_major: i64, stock: i64, image: &str) -> Product {
    Product {
        id: id.into(),
        name: name.into(),
        brand: brand.map(str::to_string),
        product_type: None,
        price: Money::from_major(price_major),
        sizes: vec!["M".into(), "L".into()],
        image_url: Some(image.into()),
        stock_count: stock,
        aisle: None,
        discount_percent: None,
    }
}

fn shopper(name: &str, tier: &str, points: i64) -> ShopperProfile {
    ShopperProfile {
        id: format!("u-{}", name.to_lowercase()),
        name: name.into(),
        avatar_url: None,
        loyalty_points: points,
        loyalty_tier: Some(tier.into()),
    }
}

fn line(line_id: &str, product: Product, user: &ShopperProfile, quantity: Option<u32>) -> CartLine {
    CartLine {
        line_id: line_id.into(),
        quantity,
        product,
        user: user.clone(),
    }
}

fn shirt(stock: i64) -> Product {
    product("p-shirt", "Oxford Formal Shirt", Some("Louis Philippe"), 1000, stock, "/data/men/oxford.jpg")
}

struct Kiosk {
    ctl: ScreenController,
    rx: UnboundedReceiver<InternalEvent>,
    backend: Arc<MemoryBackend>,
}

impl Kiosk {
    fn new(backend: MemoryBackend) -> Self {
        Self::with_policy(backend, Arc::new(NoPersonalization))
    }

    fn with_policy(backend: MemoryBackend, policy: Arc<dyn PersonalizationPolicy>) -> Self {
        let backend = Arc::new(backend);
        let (ctl, rx) = ScreenController::new(backend.clone());
        let ctl = ctl
            .with_personalization(policy)
            .with_locations(Arc::new(FixedLocation(SHELF.into())));
        Kiosk { ctl, rx, backend }
    }

    fn send(&mut self, event: KioskEvent) -> GuardResult {
        self.ctl.handle(event)
    }

    /// Feeds internal events until `done` holds. Paused time auto-advances
    /// to the next timer whenever the loop would otherwise wait.
    async fn pump_until(&mut self, done: impl Fn(&ScreenController) -> bool) {
        while !done(&self.ctl) {
            let event = self.rx.recv().await.unwrap();
            self.ctl.handle_internal(event);
        }
    }

    async fn pair(&mut self, session_id: &str) {
        self.send(KioskEvent::PairingRequested {
            session_id: session_id.into(),
        })
        .unwrap();
        assert_eq!(self.ctl.screen(), Screen::Loading);
        self.pump_until(|ctl| ctl.screen() == Screen::Welcome).await;
    }

    async fn pay(&mut self, method: PaymentMethod) -> Order {
        self.send(KioskEvent::PaymentMethodSelected { method }).unwrap();
        self.send(KioskEvent::PaymentConfirmed).unwrap();
        self.pump_until(|ctl| ctl.screen() == Screen::Confirmation).await;
        self.ctl.store().order().cloned().unwrap()
    }
}

fn single_item_cart(tier: &str, points: i64) -> MemoryBackend {
    let user = shopper("Rohan", tier, points);
    MemoryBackend::new().with_cart("SESS-1", vec![line("l-1", shirt(5), &user, Some(1))])
}

// =============================================================================
// Checkout Pricing
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_bronze_checkout_order() {
    let mut kiosk = Kiosk::new(single_item_cart("Bronze", 50));
    kiosk.pair("SESS-1").await;

    kiosk.send(KioskEvent::CheckoutRequested).unwrap();
    let summary = kiosk.ctl.snapshot().checkout.unwrap();
    assert_eq!(summary.loyalty_discount, Money::from_major(50));
    assert_eq!(summary.total, Money::from_major(950));

    let order = kiosk.pay(PaymentMethod::Card).await;
    assert_eq!(order.total, Money::from_major(950));
    assert_eq!(order.discount_applied, Money::from_major(50));
    assert_eq!(order.points_earned, 47);
    assert_eq!(order.status, OrderStatus::Confirmed);

    let recorded = kiosk.backend.orders();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].user_id, "u-rohan");
    assert_eq!(recorded[0].session_id, "SESS-1");
    assert_eq!(recorded[0].total, Money::from_major(950));
}

#[tokio::test(start_paused = true)]
async fn test_gold_discount_capped_by_tier() {
    let mut kiosk = Kiosk::new(single_item_cart("Gold", 500));
    kiosk.pair("SESS-1").await;
    kiosk.send(KioskEvent::CheckoutRequested).unwrap();

    let order = kiosk.pay(PaymentMethod::Upi).await;
    assert_eq!(order.discount_applied, Money::from_major(300));
    assert_eq!(order.total, Money::from_major(700));
    assert_eq!(order.points_earned, 35);
    assert_eq!(order.payment_method, PaymentMethod::Upi);
}

#[tokio::test(start_paused = true)]
async fn test_empty_cart_checkout() {
    let catalog = vec![product("p-blazer", "Textured Blazer", None, 5999, 0, "/data/men/blazer.jpg")];
    let mut kiosk = Kiosk::new(MemoryBackend::new().with_catalog(catalog));
    kiosk.pair("SESS-EMPTY").await;

    // Checkout button needs something in the cart.
    assert_eq!(kiosk.send(KioskEvent::CheckoutRequested), Err(GuardViolation::EmptyCart));
    assert_eq!(kiosk.ctl.screen(), Screen::Welcome);

    // Home delivery of a browsed product reaches checkout with an empty cart.
    kiosk.send(KioskEvent::BrowseRequested).unwrap();
    kiosk.pump_until(|ctl| !ctl.store().catalog().is_empty()).await;
    kiosk
        .send(KioskEvent::CatalogProductChosen {
            product_id: "p-blazer".into(),
        })
        .unwrap();
    assert_eq!(kiosk.ctl.screen(), Screen::OutOfStock);
    kiosk.send(KioskEvent::DeliveryChosen).unwrap();

    let summary = kiosk.ctl.snapshot().checkout.unwrap();
    assert_eq!(summary.subtotal, Money::zero());

    let order = kiosk.pay(PaymentMethod::Cash).await;
    assert_eq!(order.total, Money::zero());
    assert_eq!(order.discount_applied, Money::zero());
    assert_eq!(order.points_earned, 0);
    assert_eq!(order.item_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_points_frozen_after_completion() {
    let user = shopper("Rohan", "Silver", 100);
    let backend = MemoryBackend::new().with_cart(
        "SESS-1",
        vec![
            line("l-1", shirt(5), &user, Some(2)),
            line("l-2", product("p-2", "Chinos", None, 1500, 0, "/data/men/chinos.jpg"), &user, None),
        ],
    );
    let mut kiosk = Kiosk::new(backend);
    kiosk.pair("SESS-1").await;
    kiosk.send(KioskEvent::CheckoutRequested).unwrap();

    // subtotal 3500, Silver cap 700, points 100 -> total 3400
    let order = kiosk.pay(PaymentMethod::Card).await;
    assert_eq!(order.total, Money::from_major(3400));
    assert_eq!(order.points_earned, 170);
    assert_eq!(order.item_count, 2);
    assert_eq!(order.in_store_count, 1);
    assert_eq!(order.delivery_items, vec!["Chinos".to_string()]);

    // The remote cart was cleared, so the local one is too; the receipt stays.
    assert!(kiosk.ctl.store().cart().is_empty());
    assert!(kiosk.backend.cart("SESS-1").is_empty());
    assert_eq!(kiosk.ctl.store().order().unwrap().points_earned, 170);
    assert_eq!(kiosk.backend.order_lines(&order.order_id).len(), 2);
}

// =============================================================================
// Item Selection
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_stock_decides_locate_or_out_of_stock() {
    let user = shopper("Aarav", "Silver", 0);
    let backend = MemoryBackend::new().with_cart(
        "SESS-1",
        vec![
            line("in", shirt(5), &user, Some(1)),
            line("out", product("p-2", "Blazer", None, 5999, 0, "/data/men/blazer.jpg"), &user, Some(1)),
        ],
    );
    let mut kiosk = Kiosk::new(backend);
    kiosk.pair("SESS-1").await;

    kiosk.send(KioskEvent::ProductChosen { line_id: "out".into() }).unwrap();
    assert_eq!(kiosk.ctl.screen(), Screen::OutOfStock);
    assert_eq!(kiosk.ctl.store().selected().unwrap().stock, StockStatus::OutOfStock);

    kiosk.send(KioskEvent::BackRequested).unwrap();
    assert!(kiosk.ctl.store().selected().is_none());

    kiosk.send(KioskEvent::ProductChosen { line_id: "in".into() }).unwrap();
    assert_eq!(kiosk.ctl.screen(), Screen::Locate);
    assert_eq!(kiosk.ctl.store().selected().unwrap().location(), Some(SHELF));

    // From Locate another line can be picked; the same stock rule applies.
    kiosk.send(KioskEvent::ProductChosen { line_id: "out".into() }).unwrap();
    assert_eq!(kiosk.ctl.screen(), Screen::OutOfStock);

    assert_eq!(
        kiosk.send(KioskEvent::ProductChosen { line_id: "in".into() }),
        Err(GuardViolation::NotAllowed {
            screen: Screen::OutOfStock,
            event: "product selection"
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_cart_items_keep_location_invariant() {
    let user = shopper("Priya Sharma", "Gold", 2400);
    let backend = MemoryBackend::new().with_cart(
        "SESS-P",
        vec![
            line(
                "floral",
                product("p-6", "W White Floral Printed Round Neck Cotton Top", Some("W"), 1499, 7, "/data/women/top.jpg"),
                &user,
                Some(1),
            ),
            line("kurta", product("p-7", "Kurta Set", Some("Aurelia"), 3299, 3, "/data/women/kurta.jpg"), &user, None),
        ],
    );
    let mut kiosk = Kiosk::with_policy(backend, Arc::new(DemoPersonalization));
    kiosk.pair("SESS-P").await;

    let cart = kiosk.ctl.store().cart();
    for item in cart {
        assert_eq!(item.location().is_some(), item.in_stock());
        assert!(item.quantity >= 1);
    }
    // Forced out of stock by the showroom rules despite 7 on the shelf.
    assert!(!cart[0].in_stock());
    assert_eq!(cart[1].location(), Some(SHELF));

    let user = kiosk.ctl.store().user().unwrap();
    assert_eq!(user.avatar_ref, "/priya.jpg");
    assert!(user.is_gold_member());
}

#[tokio::test(start_paused = true)]
async fn test_find_picks_first_shelf_item() {
    let user = shopper("Aarav", "Bronze", 0);
    let backend = MemoryBackend::new()
        .with_cart(
            "SESS-1",
            vec![
                line("a", product("p-1", "Blazer", None, 5999, 0, "/x.jpg"), &user, None),
                line("b", shirt(2), &user, None),
            ],
        )
        .with_cart(
            "SESS-2",
            vec![line("c", product("p-1", "Blazer", None, 5999, 0, "/x.jpg"), &user, None)],
        );

    let mut kiosk = Kiosk::new(backend);
    kiosk.pair("SESS-1").await;
    kiosk.send(KioskEvent::FindRequested).unwrap();
    assert_eq!(kiosk.ctl.screen(), Screen::Locate);
    assert_eq!(kiosk.ctl.store().selected().unwrap().line_id, "b");

    kiosk.send(KioskEvent::ExitRequested).unwrap();
    kiosk.pair("SESS-2").await;
    assert_eq!(kiosk.send(KioskEvent::FindRequested), Err(GuardViolation::NothingInStock));
    assert_eq!(kiosk.ctl.screen(), Screen::Welcome);
}

#[tokio::test(start_paused = true)]
async fn test_browse_groups_catalog_for_shopper() {
    let user = shopper("Priya Sharma", "Gold", 0);
    let catalog = vec![
        product("p-1", "Graphic Tee", Some("Bewakoof"), 699, 4, "/data/men/tee.jpg"),
        product("p-2", "Kurta Set", Some("Aurelia"), 3299, 3, "/data/women/kurta.jpg"),
        product("p-3", "Dupatta", None, 999, 0, "/data/women/dupatta.jpg"),
        product("p-4", "Silk Saree", Some("Aurelia"), 8999, 1, "/data/women/saree.jpg"),
    ];
    let backend = MemoryBackend::new()
        .with_cart("SESS-P", vec![line("l", shirt(1), &user, None)])
        .with_catalog(catalog);
    let mut kiosk = Kiosk::with_policy(backend, Arc::new(DemoPersonalization));
    kiosk.pair("SESS-P").await;

    kiosk.send(KioskEvent::BrowseRequested).unwrap();
    assert_eq!(kiosk.ctl.screen(), Screen::Browse);
    kiosk.pump_until(|ctl| !ctl.store().catalog().is_empty()).await;

    let catalog = kiosk.ctl.store().catalog();
    let brands: Vec<&str> = catalog.iter().map(|g| g.brand.as_str()).collect();
    assert_eq!(brands, vec!["ABFRL", "Aurelia"]);
    assert_eq!(catalog[1].products.len(), 2);

    kiosk
        .send(KioskEvent::CatalogProductChosen {
            product_id: "p-4".into(),
        })
        .unwrap();
    assert_eq!(kiosk.ctl.screen(), Screen::Locate);
    let selected = kiosk.ctl.store().selected().unwrap();
    assert_eq!(selected.quantity, 1);
    assert_eq!(selected.size, "M");

    // Browsing selects; it does not add to the cart.
    assert_eq!(kiosk.ctl.store().cart().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_catalog_failure_is_empty() {
    let backend = MemoryBackend::new().with_catalog(vec![shirt(3)]);
    backend.fail(Operation::ListCatalog);
    let mut kiosk = Kiosk::new(backend);
    kiosk.pair("SESS-1").await;

    kiosk.send(KioskEvent::BrowseRequested).unwrap();
    kiosk.pump_until(|ctl| ctl.catalog_load.is_none()).await;

    assert_eq!(kiosk.ctl.screen(), Screen::Browse);
    assert!(kiosk.ctl.store().catalog().is_empty());
    assert_eq!(
        kiosk.send(KioskEvent::CatalogProductChosen { product_id: "p-shirt".into() }),
        Err(GuardViolation::UnknownProduct("p-shirt".into()))
    );
}

// =============================================================================
// Pairing
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_unknown_session_pairs_as_guest() {
    let mut kiosk = Kiosk::new(MemoryBackend::new());
    kiosk.pair("SESS-NOBODY").await;

    let user = kiosk.ctl.store().user().unwrap();
    assert_eq!(user.display_name, "Guest");
    assert_eq!(user.loyalty_tier, LoyaltyTier::Bronze);
    assert_eq!(user.loyalty_points, 0);
    assert!(kiosk.ctl.store().cart().is_empty());
    assert_eq!(kiosk.ctl.store().linked_session_id(), Some("SESS-NOBODY"));
}

#[tokio::test(start_paused = true)]
async fn test_lookup_failure_pairs_as_guest() {
    let backend = single_item_cart("Gold", 500);
    backend.fail(Operation::LookupSessionCart);
    let mut kiosk = Kiosk::new(backend);

    let start = Instant::now();
    kiosk.pair("SESS-1").await;

    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert!(kiosk.ctl.store().user().unwrap().is_guest());
    assert!(kiosk.ctl.store().cart().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_session_id_is_rejected() {
    let mut kiosk = Kiosk::new(MemoryBackend::new());

    for bad in ["", "   ", "SESS 1"] {
        let result = kiosk.send(KioskEvent::PairingRequested { session_id: bad.into() });
        assert!(matches!(result, Err(GuardViolation::InvalidSessionId(_))));
    }
    assert_eq!(kiosk.ctl.screen(), Screen::Idle);
    assert!(kiosk.ctl.store().linked_session_id().is_none());

    kiosk
        .send(KioskEvent::PairingRequested {
            session_id: "  SESS-1 ".into(),
        })
        .unwrap();
    assert_eq!(kiosk.ctl.store().linked_session_id(), Some("SESS-1"));
}

#[tokio::test(start_paused = true)]
async fn test_pairing_result_after_reset_is_discarded() {
    let mut kiosk = Kiosk::new(single_item_cart("Gold", 500));

    kiosk
        .send(KioskEvent::PairingRequested {
            session_id: "SESS-1".into(),
        })
        .unwrap();
    kiosk.send(KioskEvent::ExitRequested).unwrap();
    assert_eq!(kiosk.ctl.screen(), Screen::Idle);

    // The in-flight lookup was aborted; nothing arrives even after its delay.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(kiosk.rx.try_recv().is_err());

    // A late result from the old session is dropped by the epoch check.
    let stale = InternalEvent::PairingResolved {
        epoch: 0,
        result: Ok(kiosk.backend.cart("SESS-1")),
    };
    let before = kiosk.ctl.snapshot();
    assert_eq!(kiosk.ctl.handle_internal(stale), Handled::Stale);
    assert_eq!(kiosk.ctl.snapshot(), before);

    // Also when the kiosk has since been paired again.
    kiosk.pair("SESS-1").await;
    let stale = InternalEvent::PairingResolved {
        epoch: 0,
        result: Ok(Vec::new()),
    };
    assert_eq!(kiosk.ctl.handle_internal(stale), Handled::Stale);
    assert_eq!(kiosk.ctl.store().cart().len(), 1);
}

// =============================================================================
// Order Completion
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_order_failure_still_confirms() {
    let backend = single_item_cart("Bronze", 50);
    backend.fail(Operation::CreateOrder);
    let mut kiosk = Kiosk::new(backend);
    kiosk.pair("SESS-1").await;
    kiosk.send(KioskEvent::CheckoutRequested).unwrap();

    let order = kiosk.pay(PaymentMethod::Card).await;

    assert_eq!(order.status, OrderStatus::PendingSync);
    assert!(order.order_id.starts_with("ORD-"));
    assert_eq!(order.total, Money::from_major(950));
    assert_eq!(order.points_earned, 47);
    // Nothing was cleared remotely, so the local cart stays until reset.
    assert_eq!(kiosk.ctl.store().cart().len(), 1);
    assert_eq!(kiosk.backend.cart("SESS-1").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_clear_failure_keeps_store_order() {
    let backend = single_item_cart("Bronze", 50);
    backend.fail(Operation::ClearCart);
    let mut kiosk = Kiosk::new(backend);
    kiosk.pair("SESS-1").await;
    kiosk.send(KioskEvent::CheckoutRequested).unwrap();

    let order = kiosk.pay(PaymentMethod::Card).await;

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.order_id, "MEM-0001");
    assert_eq!(kiosk.ctl.store().cart().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_checkout_guards() {
    let mut kiosk = Kiosk::new(single_item_cart("Silver", 10));
    kiosk.pair("SESS-1").await;
    kiosk.send(KioskEvent::CheckoutRequested).unwrap();

    assert_eq!(kiosk.send(KioskEvent::PaymentConfirmed), Err(GuardViolation::NoPaymentMethod));
    assert_eq!(kiosk.ctl.screen(), Screen::Checkout);

    kiosk
        .send(KioskEvent::PaymentMethodSelected {
            method: PaymentMethod::Cash,
        })
        .unwrap();
    assert!(!kiosk.ctl.is_processing_payment());
    kiosk.send(KioskEvent::PaymentConfirmed).unwrap();
    assert!(kiosk.ctl.is_processing_payment());
    assert!(kiosk.ctl.snapshot().processing_payment);

    assert_eq!(kiosk.send(KioskEvent::PaymentConfirmed), Err(GuardViolation::CheckoutInProgress));
    assert_eq!(kiosk.send(KioskEvent::BackRequested), Err(GuardViolation::CheckoutInProgress));
    assert!(matches!(
        kiosk.send(KioskEvent::BrowseRequested),
        Err(GuardViolation::NotAllowed { .. })
    ));

    kiosk.pump_until(|ctl| ctl.screen() == Screen::Confirmation).await;
    assert!(!kiosk.ctl.is_processing_payment());
    assert_eq!(kiosk.backend.orders().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_back_from_checkout_drops_payment_choice() {
    let mut kiosk = Kiosk::new(single_item_cart("Silver", 10));
    kiosk.pair("SESS-1").await;
    kiosk.send(KioskEvent::CheckoutRequested).unwrap();
    kiosk
        .send(KioskEvent::PaymentMethodSelected {
            method: PaymentMethod::Upi,
        })
        .unwrap();

    kiosk.send(KioskEvent::BackRequested).unwrap();
    assert_eq!(kiosk.ctl.screen(), Screen::Welcome);
    assert!(kiosk.ctl.store().payment_method().is_none());
    assert!(kiosk.ctl.snapshot().checkout.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_exit_during_payment_abandons_order() {
    let mut kiosk = Kiosk::new(single_item_cart("Gold", 500));
    kiosk.pair("SESS-1").await;
    kiosk.send(KioskEvent::CheckoutRequested).unwrap();
    kiosk
        .send(KioskEvent::PaymentMethodSelected {
            method: PaymentMethod::Card,
        })
        .unwrap();
    kiosk.send(KioskEvent::PaymentConfirmed).unwrap();

    kiosk.send(KioskEvent::ExitRequested).unwrap();
    assert!(!kiosk.ctl.is_processing_payment());
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(kiosk.ctl.screen(), Screen::Idle);
    assert!(kiosk.backend.orders().is_empty());
    assert!(kiosk.ctl.store().order().is_none());
}

// =============================================================================
// Timers and Reset
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_fires_once_at_300s() {
    let mut kiosk = Kiosk::new(single_item_cart("Gold", 500));
    let start = Instant::now();
    kiosk.pair("SESS-1").await;

    kiosk.pump_until(|ctl| ctl.screen().is_idle()).await;

    assert_eq!(start.elapsed(), Duration::from_secs(300));
    assert_eq!(kiosk.ctl.store().epoch(), 1);
    assert!(kiosk.ctl.store().user().is_none());

    // No ticker survives the reset.
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert!(kiosk.rx.try_recv().is_err());
    assert_eq!(kiosk.ctl.store().epoch(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_activity_restarts_idle_countdown() {
    let mut kiosk = Kiosk::new(single_item_cart("Gold", 500));
    let start = Instant::now();
    kiosk.pair("SESS-1").await;

    kiosk
        .pump_until(|ctl| ctl.snapshot().idle_remaining == "3:20")
        .await;
    assert_eq!(start.elapsed(), Duration::from_secs(100));

    kiosk.send(KioskEvent::Activity).unwrap();
    assert_eq!(kiosk.ctl.snapshot().idle_remaining, "5:00");

    kiosk.pump_until(|ctl| ctl.screen().is_idle()).await;
    assert_eq!(start.elapsed(), Duration::from_secs(400));
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_returns_home_after_30s() {
    let mut kiosk = Kiosk::new(single_item_cart("Bronze", 50));
    kiosk.pair("SESS-1").await;
    kiosk.send(KioskEvent::CheckoutRequested).unwrap();
    kiosk.pay(PaymentMethod::Card).await;

    let confirmed_at = Instant::now();
    let kiosk_id = kiosk.ctl.store().kiosk_session_id().to_string();
    kiosk.pump_until(|ctl| ctl.screen().is_idle()).await;

    assert_eq!(confirmed_at.elapsed(), Duration::from_secs(30));
    assert_ne!(kiosk.ctl.store().kiosk_session_id(), kiosk_id);
    assert!(kiosk.ctl.store().order().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_done_returns_home_immediately() {
    let mut kiosk = Kiosk::new(single_item_cart("Bronze", 50));
    kiosk.pair("SESS-1").await;
    assert!(matches!(
        kiosk.send(KioskEvent::DoneRequested),
        Err(GuardViolation::NotAllowed { .. })
    ));

    kiosk.send(KioskEvent::CheckoutRequested).unwrap();
    kiosk.pay(PaymentMethod::Card).await;
    kiosk.send(KioskEvent::DoneRequested).unwrap();

    assert_eq!(kiosk.ctl.screen(), Screen::Idle);
    // The auto-return timer went with the session.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(kiosk.rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_reset_from_every_screen() {
    let user = shopper("Aarav", "Silver", 10);
    let backend = MemoryBackend::new()
        .with_cart("SESS-1", vec![line("l-1", shirt(3), &user, None)])
        .with_catalog(vec![shirt(3)]);
    let mut kiosk = Kiosk::new(backend);

    let paths: Vec<Vec<KioskEvent>> = vec![
        vec![],
        vec![KioskEvent::ProductChosen { line_id: "l-1".into() }],
        vec![KioskEvent::BrowseRequested],
        vec![KioskEvent::CheckoutRequested],
    ];

    let mut seen_ids = vec![kiosk.ctl.store().kiosk_session_id().to_string()];
    for path in paths {
        kiosk.pair("SESS-1").await;
        for event in path {
            kiosk.send(event).unwrap();
        }
        kiosk.send(KioskEvent::ExitRequested).unwrap();

        let store = kiosk.ctl.store();
        assert_eq!(store.screen(), Screen::Idle);
        assert!(store.user().is_none());
        assert!(store.cart().is_empty());
        assert!(store.selected().is_none());
        assert!(!seen_ids.contains(&store.kiosk_session_id().to_string()));
        seen_ids.push(store.kiosk_session_id().to_string());
    }

    assert_eq!(kiosk.send(KioskEvent::ExitRequested), Err(GuardViolation::AlreadyIdle));
}

#[tokio::test(start_paused = true)]
async fn test_assistant_is_a_notice() {
    let mut kiosk = Kiosk::new(MemoryBackend::new());
    kiosk.pair("SESS-1").await;

    let handled = kiosk.send(KioskEvent::AssistantRequested).unwrap();
    assert_eq!(handled, Handled::Notice(ASSISTANT_NOTICE.to_string()));
    assert_eq!(kiosk.ctl.screen(), Screen::Welcome);
}

#[test]
fn test_group_catalog_without_segment() {
    let products = vec![
        product("p-1", "Tee", Some("Bewakoof"), 699, 1, "/data/men/a.jpg"),
        product("p-2", "Kurta", Some(""), 999, 1, "/data/women/b.jpg"),
        product("p-3", "Joggers", Some("Bewakoof"), 1299, 1, "/data/men/c.jpg"),
    ];
    let groups = group_catalog(products, None);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].brand, "ABFRL");
    assert_eq!(groups[1].brand, "Bewakoof");
    assert_eq!(groups[1].products.len(), 2);

    let women = group_catalog(groups[1].products.clone(), Some(ShopperSegment::Women));
    assert!(women.is_empty());
}
