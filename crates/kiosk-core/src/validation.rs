//! # Validation Module
//!
//! Input validation for identifiers and store data reaching the kiosk.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Scanner / keypad ──► validate_session_id ──► Idle → Loading            │
//! │                              │                                          │
//! │                              └── Err → GuardViolation, no transition    │
//! │                                                                         │
//! │  Store rows ──► validate_price_minor / validate_quantity ──► CartItem   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_SESSION_ID_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a scanned or typed pairing identifier.
///
/// ## Rules
/// - Surrounding whitespace is trimmed
/// - Must not be empty
/// - At most 64 characters
/// - No whitespace or control characters inside
///
/// ## Returns
/// The trimmed identifier.
///
/// ## Example
/// ```rust
/// use kiosk_core::validation::validate_session_id;
///
/// assert_eq!(validate_session_id("  sess-42 ").unwrap(), "sess-42");
/// assert!(validate_session_id("").is_err());
/// assert!(validate_session_id("two words").is_err());
/// ```
pub fn validate_session_id(id: &str) -> ValidationResult<String> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "session_id".to_string(),
        });
    }

    if id.chars().count() > MAX_SESSION_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "session_id".to_string(),
            max: MAX_SESSION_ID_LEN,
        });
    }

    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidFormat {
            field: "session_id".to_string(),
            reason: "must not contain whitespace or control characters".to_string(),
        });
    }

    Ok(id.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in minor units. Zero is allowed (free items).
pub fn validate_price_minor(minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a cart line quantity (1..=999).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
