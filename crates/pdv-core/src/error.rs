//! # Error Types
//!
//! Domain-specific error types for pdv-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pdv-core errors (this file)                                            │
//! │  ├── CoreError        - Cart / ledger rule violations                   │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  pdv-db errors                                                          │
//! │  └── DbError          - Store failures, NotFound, no-op updates         │
//! │                                                                         │
//! │  apps/api errors                                                        │
//! │  └── ApiError         - What HTTP callers see (code + message)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and ledger rule violations.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Finalize was requested with no line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// A line index does not exist in the cart.
    #[error("No cart line at position {index} (cart has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    /// Line items could not be encoded for the sale body.
    #[error("Could not encode line items: {0}")]
    Encoding(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any store call; they are user-facing messages.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value does not fit the numeric range.
    #[error("{field} is too large")]
    TooLarge { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid date, NaN amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
        assert_eq!(
            CoreError::LineOutOfRange { index: 3, len: 1 }.to_string(),
            "No cart line at position 3 (cart has 1 lines)"
        );
        assert_eq!(
            CoreError::Encoding("boom".to_string()).to_string(),
            "Could not encode line items: boom"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");

        let err = ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        };
        assert_eq!(err.to_string(), "stock must not be negative");

        let err = ValidationError::TooLarge {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity is too large");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("quantity").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
