//! # Validation Module
//!
//! Input validation utilities for AutoNexus billing.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI arguments (clap)                                         │
//! │  └── Type validation (numbers, enums)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Business rule validation, before any network call                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: REST API (remote)                                            │
//! │  └── Authoritative checks (stock, uniqueness) → 400/409/422            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use nexus_core::validation::{validate_customer_name, validate_quantity};
//!
//! validate_customer_name("Nimal Perera").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use rust_decimal::Decimal;

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a customer name.
///
/// ## Rules
/// - Must not be blank
/// - At most 100 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required("customer name", name, 100)
}

/// Validates a customer phone number.
///
/// ## Rules
/// - Must not be blank
/// - Digits plus `+`, `-`, spaces and parentheses only
///
/// ## Example
/// ```rust
/// use nexus_core::validation::validate_phone;
///
/// assert!(validate_phone("+94 77 123 4567").is_ok());
/// assert!(validate_phone("").is_err());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    required("customer phone", phone, 30)?;

    let phone = phone.trim();
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
        || !phone.chars().any(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidFormat {
            field: "customer phone".to_string(),
            reason: "must contain only digits, spaces, '+', '-' and parentheses".to_string(),
        });
    }

    Ok(())
}

/// Validates an optional email address. Blank is accepted.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(());
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a product, category or brand name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    required(field, name, 200)
}

/// Validates a remote record id as used in REST paths.
///
/// ## Rules
/// - Must not be blank
/// - At most 64 characters
/// - No `/`, `?` or `#` (the id is spliced into a URL path)
pub fn validate_id(id: &str) -> ValidationResult<()> {
    required("id", id, 64)?;

    if id.contains(['/', '?', '#']) || id.trim() != id {
        return Err(ValidationError::InvalidFormat {
            field: "id".to_string(),
            reason: "must not contain '/', '?', '#' or surrounding whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Example
/// ```rust
/// use nexus_core::money::Money;
/// use nexus_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(4599)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock count (must be ≥ 0).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a rating on the 0–5 scale.
pub fn validate_rating(rating: Decimal) -> ValidationResult<()> {
    if rating < Decimal::ZERO || rating > Decimal::from(5) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 0,
            max: 5,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
