//! # Validation Module
//!
//! Input validation run before anything reaches the store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend form                                                 │
//! │  └── Immediate user feedback, never hits the network                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                           │
//! │  ├── Body deserialization                                               │
//! │  └── THIS MODULE: field rules (400 before any SQL)                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  └── NOT NULL constraints                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale totals are deliberately NOT checked here: the ledger records the
//! client's arithmetic verbatim.

use chrono::NaiveDate;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product name.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use pdv_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Coca Cola 600ml").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a unit price: finite and zero or more (free items allowed).
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock count.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Validates a cart quantity: a positive integer.
///
/// ```rust
/// use pdv_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an amount that must be strictly positive (expenses, legacy prices).
pub fn validate_positive_amount(field: &str, amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if amount <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// A sale must carry its finalize timestamp. The format is free-form.
pub fn validate_sale_date(date: &str) -> ValidationResult<()> {
    if date.trim().is_empty() {
        return Err(ValidationError::required("date"));
    }

    Ok(())
}

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn validate_calendar_date(field: &str, date: &str) -> ValidationResult<NaiveDate> {
    let date = date.trim();
    if date.is_empty() {
        return Err(ValidationError::required(field));
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Coca Cola 600ml").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(10.99).is_ok());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_stock_and_quantity() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-3).is_err());
        assert!(validate_quantity(5).is_ok());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_calendar_date() {
        let date = validate_calendar_date("fecha", "2025-09-20").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 9, 20).unwrap());

        assert!(validate_calendar_date("fecha", "20/09/2025").is_err());
        assert_eq!(
            validate_calendar_date("fecha", ""),
            Err(ValidationError::required("fecha"))
        );
    }
}
