//! # Kiosk Error Types
//!
//! Two families of errors live here:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Error Flow in the Kiosk                             │
//! │                                                                         │
//! │  Shopper input ──► ScreenController::handle                             │
//! │                          │                                              │
//! │                          ├── guard fails ──► GuardViolation             │
//! │                          │                   (no transition, logged     │
//! │                          │                    at debug, shown as a      │
//! │                          │                    notice by the frontend)   │
//! │                          │                                              │
//! │                          └── ok ──► transition + snapshot published     │
//! │                                                                         │
//! │  Startup / plumbing ──► KioskError                                      │
//! │                         (config, database, closed runtime channel)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Collaborator failures (`BackendError`) never reach the shopper; the
//! controller degrades instead. See [`crate::backend`].

use serde::Serialize;
use thiserror::Error;

use kiosk_core::{Screen, ValidationError};
use kiosk_db::DbError;

/// A rejected transition. The session is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardViolation {
    #[error("Invalid session id: {0}")]
    InvalidSessionId(#[from] ValidationError),

    #[error("{event} is not available on the {screen} screen")]
    NotAllowed { screen: Screen, event: &'static str },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Nothing in the cart is on the shelf")]
    NothingInStock,

    #[error("Choose a payment method first")]
    NoPaymentMethod,

    #[error("Payment is already being processed")]
    CheckoutInProgress,

    #[error("No cart line with id {0}")]
    UnknownCartLine(String),

    #[error("No catalog product with id {0}")]
    UnknownProduct(String),

    #[error("The kiosk is already on the home screen")]
    AlreadyIdle,
}

impl GuardViolation {
    /// Machine-readable code for the frontend.
    pub fn code(&self) -> &'static str {
        match self {
            GuardViolation::InvalidSessionId(_) => "INVALID_SESSION_ID",
            GuardViolation::NotAllowed { .. } => "NOT_ALLOWED",
            GuardViolation::EmptyCart => "EMPTY_CART",
            GuardViolation::NothingInStock => "NOTHING_IN_STOCK",
            GuardViolation::NoPaymentMethod => "NO_PAYMENT_METHOD",
            GuardViolation::CheckoutInProgress => "CHECKOUT_IN_PROGRESS",
            GuardViolation::UnknownCartLine(_) => "UNKNOWN_CART_LINE",
            GuardViolation::UnknownProduct(_) => "UNKNOWN_PRODUCT",
            GuardViolation::AlreadyIdle => "ALREADY_IDLE",
        }
    }
}

/// What the frontend receives when an event is rejected.
///
/// ```json
/// { "code": "EMPTY_CART", "message": "Cart is empty" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub code: &'static str,
    pub message: String,
}

impl From<&GuardViolation> for Rejection {
    fn from(violation: &GuardViolation) -> Self {
        Rejection {
            code: violation.code(),
            message: violation.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from the kiosk runtime and its startup.
#[derive(Debug, Error)]
pub enum KioskError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error(transparent)]
    Rejected(#[from] GuardViolation),

    #[error("Kiosk runtime is not running")]
    ChannelClosed,
}

pub type KioskResult<T> = Result<T, KioskError>;
