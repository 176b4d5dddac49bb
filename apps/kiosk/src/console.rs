//! # Console Driver
//!
//! Line-oriented stand-in for the touch screen, used for demos and manual
//! testing. Each stdin line becomes one [`KioskEvent`].
//!
//! ```text
//! scan SESS-AARAV   pairing            item 2        pick cart line 2
//! find              first shelf item   product P-004 pick from catalog
//! browse            open catalog       deliver       home delivery
//! checkout          open checkout      pay upi       choose method
//! confirm           pay                back / exit / done / help / quit
//! ```

use std::fmt::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::error::{KioskError, KioskResult, Rejection};
use crate::events::{Handled, KioskEvent};
use crate::runtime::KioskHandle;
use crate::state::KioskSnapshot;
use kiosk_core::{PaymentMethod, Screen, StockStatus};

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Event(KioskEvent),
    /// Cart line by its 1-based position on screen.
    Item(usize),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  scan <session id>   pair with a mobile session
  find                locate the first item on the shelf
  item <n>            select cart line n
  browse              browse the catalog
  product <id>        select a catalog product
  checkout            open checkout
  deliver             home delivery for an out-of-stock item
  pay card|upi|cash   choose a payment method
  confirm             confirm payment
  assistant           ask the shopping assistant
  back | exit | done  navigation
  help | quit";

/// Parses one input line.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(ConsoleCommand::Event(KioskEvent::Activity));
    };
    let arg = words.next();

    let event = match (verb.to_lowercase().as_str(), arg) {
        ("scan" | "pair", Some(id)) => KioskEvent::PairingRequested {
            session_id: id.to_string(),
        },
        ("scan" | "pair", None) => return Err("usage: scan <session id>".into()),
        ("item", Some(n)) => {
            let position = n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("not a cart position: {}", n))?;
            return Ok(ConsoleCommand::Item(position));
        }
        ("item", None) => return Err("usage: item <n>".into()),
        ("product", Some(id)) => KioskEvent::CatalogProductChosen {
            product_id: id.to_string(),
        },
        ("product", None) => return Err("usage: product <id>".into()),
        ("pay", Some(method)) => KioskEvent::PaymentMethodSelected {
            method: method.parse::<PaymentMethod>().map_err(|e| e.to_string())?,
        },
        ("pay", None) => return Err("usage: pay card|upi|cash".into()),
        ("find", _) => KioskEvent::FindRequested,
        ("browse", _) => KioskEvent::BrowseRequested,
        ("checkout", _) => KioskEvent::CheckoutRequested,
        ("deliver", _) => KioskEvent::DeliveryChosen,
        ("confirm", _) => KioskEvent::PaymentConfirmed,
        ("back", _) => KioskEvent::BackRequested,
        ("assistant", _) => KioskEvent::AssistantRequested,
        ("exit", _) => KioskEvent::ExitRequested,
        ("done", _) => KioskEvent::DoneRequested,
        ("help" | "?", _) => return Ok(ConsoleCommand::Help),
        ("quit" | "q", _) => return Ok(ConsoleCommand::Quit),
        (other, _) => return Err(format!("unknown command: {} (try help)", other)),
    };
    Ok(ConsoleCommand::Event(event))
}

/// Renders the current screen as text.
pub fn render(snapshot: &KioskSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {} ──", snapshot.screen);

    match snapshot.screen {
        Screen::Idle => {
            let _ = writeln!(out, "Scan to start. Kiosk session {}", snapshot.kiosk_session_id);
        }
        Screen::Loading => {
            let _ = writeln!(
                out,
                "Loading session {}…",
                snapshot.linked_session_id.as_deref().unwrap_or_default()
            );
        }
        Screen::Welcome => {
            if let Some(user) = &snapshot.user {
                let _ = writeln!(
                    out,
                    "Welcome, {} ({} · {} points)",
                    user.display_name, user.loyalty_tier, user.loyalty_points
                );
            }
            if snapshot.cart.is_empty() {
                let _ = writeln!(out, "Your cart is empty.");
            }
            for (i, item) in snapshot.cart.iter().enumerate() {
                let stock = match &item.stock {
                    StockStatus::InStore { location } => location.as_str(),
                    StockStatus::OutOfStock => "out of stock",
                };
                let _ = writeln!(
                    out,
                    "  {}. {} ({}) x{}  {}  [{}]",
                    i + 1,
                    item.name,
                    item.size,
                    item.quantity,
                    item.line_total(),
                    stock
                );
            }
        }
        Screen::Locate | Screen::OutOfStock => {
            if let Some(item) = &snapshot.selected_product {
                match item.location() {
                    Some(location) => {
                        let _ = writeln!(out, "{} is at {}", item.name, location);
                    }
                    None => {
                        let _ = writeln!(out, "{} is not in this store. Deliver it home?", item.name);
                    }
                }
            }
        }
        Screen::Browse => {
            if snapshot.catalog.is_empty() {
                let _ = writeln!(out, "Loading catalog…");
            }
            for group in &snapshot.catalog {
                let _ = writeln!(out, "{}", group.brand);
                for product in &group.products {
                    let _ = writeln!(out, "  {}  {}  {}", product.id, product.name, product.price);
                }
            }
        }
        Screen::Checkout => {
            if let Some(summary) = &snapshot.checkout {
                let _ = writeln!(out, "Subtotal          {}", summary.subtotal);
                let _ = writeln!(
                    out,
                    "Loyalty discount -{} (up to {}%)",
                    summary.loyalty_discount,
                    summary.tier_rate.percentage()
                );
                let _ = writeln!(out, "Delivery          {}", summary.delivery_fee);
                let _ = writeln!(out, "Total             {}", summary.total);
                for name in &summary.delivery_items {
                    let _ = writeln!(out, "  ships home: {}", name);
                }
            }
            match (snapshot.processing_payment, snapshot.payment_method) {
                (true, _) => {
                    let _ = writeln!(out, "Processing payment…");
                }
                (false, Some(method)) => {
                    let _ = writeln!(out, "Paying by {}. Type confirm.", method);
                }
                (false, None) => {
                    let _ = writeln!(out, "Choose: pay card|upi|cash");
                }
            }
        }
        Screen::Confirmation => {
            if let Some(order) = &snapshot.order {
                let _ = writeln!(out, "Order {} confirmed", order.order_id);
                let _ = writeln!(out, "Items: {}  Total: {}", order.item_count, order.total);
                let _ = writeln!(out, "You earned {} points", order.points_earned);
            }
        }
    }

    if !snapshot.screen.is_idle() {
        let _ = writeln!(out, "(idle reset in {})", snapshot.idle_remaining);
    }
    out
}

/// Reads commands from stdin until `quit` or end of input.
pub async fn run_console(handle: KioskHandle) -> KioskResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut snapshots = handle.subscribe();
    let mut last_screen = handle.snapshot().screen;

    println!("{}", render(&handle.snapshot()));
    println!("Type help for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "Failed to read console input");
                        break;
                    }
                };

                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{}", message);
                        continue;
                    }
                };

                let event = match command {
                    ConsoleCommand::Quit => break,
                    ConsoleCommand::Help => {
                        println!("{}", HELP);
                        continue;
                    }
                    ConsoleCommand::Item(position) => {
                        match handle.snapshot().cart.get(position - 1) {
                            Some(item) => KioskEvent::ProductChosen { line_id: item.line_id.clone() },
                            None => {
                                println!("No cart line {}", position);
                                continue;
                            }
                        }
                    }
                    ConsoleCommand::Event(event) => event,
                };

                match handle.dispatch(event).await {
                    Ok(Handled::Notice(message)) => println!("{}", message),
                    Ok(_) => {}
                    Err(KioskError::Rejected(violation)) => {
                        let rejection = Rejection::from(&violation);
                        println!("[{}] {}", rejection.code, rejection.message);
                    }
                    Err(e) => return Err(e),
                }

                let snapshot = handle.snapshot();
                last_screen = snapshot.screen;
                println!("{}", render(&snapshot));
            }

            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if snapshot.screen != last_screen {
                    last_screen = snapshot.screen;
                    println!("{}", render(&snapshot));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionStore;
    use kiosk_core::{CartItem, Money, UserSession};

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("scan SESS-AARAV").unwrap(),
            ConsoleCommand::Event(KioskEvent::PairingRequested {
                session_id: "SESS-AARAV".into()
            })
        );
        assert_eq!(parse_command("item 2").unwrap(), ConsoleCommand::Item(2));
        assert_eq!(
            parse_command("PAY upi").unwrap(),
            ConsoleCommand::Event(KioskEvent::PaymentMethodSelected {
                method: PaymentMethod::Upi
            })
        );
        assert_eq!(parse_command("").unwrap(), ConsoleCommand::Event(KioskEvent::Activity));
        assert_eq!(parse_command("quit").unwrap(), ConsoleCommand::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("scan").is_err());
        assert!(parse_command("item 0").is_err());
        assert!(parse_command("item two").is_err());
        assert!(parse_command("pay bitcoin").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_render_welcome() {
        let mut store = SessionStore::new();
        store.set_screen(Screen::Welcome);
        store.start_shopping(
            UserSession::guest("SESS-1"),
            vec![CartItem {
                line_id: "l-1".into(),
                product_id: "p-1".into(),
                name: "Graphic Tee".into(),
                size: "M".into(),
                unit_price: Money::from_major(699),
                quantity: 2,
                image_ref: "/placeholder.jpg".into(),
                stock: StockStatus::InStore {
                    location: "Aisle 2, Left".into(),
                },
            }],
        );

        let text = render(&store.snapshot("4:12".into(), None, false));
        assert!(text.contains("── welcome ──"));
        assert!(text.contains("Welcome, Guest (Bronze · 0 points)"));
        assert!(text.contains("1. Graphic Tee (M) x2  ₹1398.00  [Aisle 2, Left]"));
        assert!(text.contains("(idle reset in 4:12)"));
    }

    #[test]
    fn test_render_idle_shows_kiosk_id() {
        let store = SessionStore::new();
        let snapshot = store.snapshot("5:00".into(), None, false);
        let text = render(&snapshot);
        assert!(text.contains(&snapshot.kiosk_session_id));
        assert!(!text.contains("idle reset"));
    }
}
