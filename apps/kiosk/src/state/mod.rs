//! # Kiosk State
//!
//! ## State Components
//! - [`session::SessionStore`] - The current shopper, cart and screen
//! - [`config::KioskConfig`] - Kiosk configuration
//!
//! The store is owned by the screen controller and never shared; the
//! runtime publishes [`KioskSnapshot`] copies through a watch channel.

pub mod config;
pub mod session;

pub use config::{KioskConfig, Timing};
pub use session::{KioskSnapshot, SessionStore};
