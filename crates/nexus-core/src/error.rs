//! # Error Types
//!
//! Domain-specific error types for nexus-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  nexus-core errors (this file)                                         │
//! │  ├── CoreError        - Bill and access rule violations                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  nexus-api errors (separate crate)                                     │
//! │  └── ApiClientError   - REST call failures                             │
//! │                                                                         │
//! │  App errors (in nexus-billing)                                         │
//! │  └── CommandError     - What the user sees (code + message)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CommandError → Notice             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, ID, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. A failed operation never
/// mutates the draft it was called on.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The product has no stock at all.
    #[error("{name} is out of stock")]
    StockExhausted { product_id: String, name: String },

    /// Adding one more unit would go past the product's stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Add "Brake Pads" (in bill: 4, stock: 4)
    ///      │
    ///      ▼
    /// StockLimitReached { name: "Brake Pads", stock: 4 }
    ///      │
    ///      ▼
    /// Notice: "Cannot add more Brake Pads. Stock limit reached."
    /// ```
    #[error("Cannot add more {name}. Stock limit reached.")]
    StockLimitReached {
        product_id: String,
        name: String,
        stock: i64,
    },

    /// A quantity update asked for more than the product's stock.
    #[error("Cannot exceed stock limit of {available} for {name}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Product cannot be found in a listing.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Bill has reached the maximum number of distinct lines.
    #[error("Bill cannot have more than {max} line items")]
    CartTooLarge { max: usize },

    /// Bill status cannot move to the requested status.
    ///
    /// ## When This Occurs
    /// - Re-opening a Paid bill as Pending
    /// - Submitting a draft straight to Cancelled
    #[error("Bill cannot move from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// The signed-in identity is not allowed to perform an admin action.
    #[error("Access denied for {email}: administrator role required")]
    AccessDenied { email: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation, before any network call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// A collection that must hold entries is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparsable number, bad email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_messages() {
        let err = CoreError::StockExhausted {
            product_id: "p1".to_string(),
            name: "Brake Pads".to_string(),
        };
        assert_eq!(err.to_string(), "Brake Pads is out of stock");

        let err = CoreError::StockLimitReached {
            product_id: "p1".to_string(),
            name: "Brake Pads".to_string(),
            stock: 4,
        };
        assert_eq!(
            err.to_string(),
            "Cannot add more Brake Pads. Stock limit reached."
        );

        let err = CoreError::InsufficientStock {
            product_id: "p2".to_string(),
            name: "Engine Oil".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Cannot exceed stock limit of 3 for Engine Oil"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer name".to_string(),
        };
        assert_eq!(err.to_string(), "customer name is required");

        let err = ValidationError::Empty {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items must contain at least one entry");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "phone".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
