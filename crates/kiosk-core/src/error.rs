//! # Error Types
//!
//! Domain-specific error types for kiosk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kiosk-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule failures                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kiosk-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  kiosk app errors                                                      │
//! │  ├── BackendError     - Store round trip failed                        │
//! │  ├── GuardViolation   - Event not allowed on the current screen        │
//! │  └── KioskError       - What the driver sees                           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BackendError → KioskError         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A payment method label the kiosk does not offer.
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// A product arrived from the store with a price below zero.
    ///
    /// ## When This Occurs
    /// - Bad catalog data entered upstream
    /// - A sync bug writing a refund amount into the price column
    #[error("Product {product_id} has negative price {price_minor}")]
    NegativePrice { product_id: String, price_minor: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. whitespace inside an id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::NegativePrice {
            product_id: "p-9".to_string(),
            price_minor: -100,
        };
        assert_eq!(err.to_string(), "Product p-9 has negative price -100");

        let err = ValidationError::TooLong {
            field: "session_id".to_string(),
            max: 64,
        };
        assert_eq!(err.to_string(), "session_id must be at most 64 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "session_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
