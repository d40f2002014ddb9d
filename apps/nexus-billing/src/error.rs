//! # Command Error Type
//!
//! Unified error type for billing commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in AutoNexus Billing                      │
//! │                                                                         │
//! │  nexus bill save                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, CommandError>                                         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Draft invalid? ─── ValidationError::Required ──┐               │  │
//! │  │         │                                       │               │  │
//! │  │         ▼                                       ▼               │  │
//! │  │  REST failure? ─── ApiClientError::Status ── CommandError ─────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The message becomes an error notice on the session; the code picks    │
//! │  the process exit status.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use nexus_api::ApiClientError;
use nexus_core::{CoreError, ValidationError};

use crate::state::ConfigError;

/// Error returned from billing commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "STOCK_LIMIT",
///   "message": "Cannot add more Brake Pads. Stock limit reached."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Message shown to the operator
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing or malformed input, rejected before any network call
    ValidationError,

    /// Product has no stock at all
    StockExhausted,

    /// Quantity would exceed the product's stock
    StockLimit,

    /// Resource not found (404)
    NotFound,

    /// The store refused the change (409)
    Conflict,

    /// Transport failure or unexpected response
    NetworkError,

    /// Operation needs the admin role
    AccessDenied,

    /// Configuration could not be loaded or saved
    ConfigError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit status for this category.
    pub const fn exit_code(&self) -> u8 {
        match self {
            ErrorCode::ValidationError => 2,
            ErrorCode::StockExhausted | ErrorCode::StockLimit => 3,
            ErrorCode::NotFound => 4,
            ErrorCode::Conflict => 5,
            ErrorCode::NetworkError => 6,
            ErrorCode::AccessDenied => 7,
            ErrorCode::ConfigError => 78,
            ErrorCode::Internal => 1,
        }
    }
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CommandError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        CommandError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CommandError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CommandError::new(ErrorCode::Internal, message)
    }

    /// Prefixes the message, keeping the code.
    ///
    /// `"Failed to delete bill"` + `"bill b1 not found"` →
    /// `"Failed to delete bill: bill b1 not found"`.
    pub fn context(self, prefix: &str) -> Self {
        CommandError {
            code: self.code,
            message: format!("{}: {}", prefix, self.message),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::StockExhausted { .. } => ErrorCode::StockExhausted,
            CoreError::StockLimitReached { .. } | CoreError::InsufficientStock { .. } => {
                ErrorCode::StockLimit
            }
            CoreError::ProductNotFound(_) => ErrorCode::NotFound,
            CoreError::CartTooLarge { .. } => ErrorCode::ValidationError,
            CoreError::InvalidStatusTransition { .. } => ErrorCode::ValidationError,
            CoreError::AccessDenied { .. } => ErrorCode::AccessDenied,
            // Show the field message without the "Validation error:" prefix
            CoreError::Validation(e) => return CommandError::from(e.clone()),
        };
        CommandError::new(code, err.to_string())
    }
}

impl From<ValidationError> for CommandError {
    fn from(err: ValidationError) -> Self {
        CommandError::validation(err.to_string())
    }
}

impl From<ApiClientError> for CommandError {
    fn from(err: ApiClientError) -> Self {
        match err {
            ApiClientError::NotFound { resource } => {
                CommandError::new(ErrorCode::NotFound, format!("{} not found", resource))
            }
            ApiClientError::Conflict { resource, message } => CommandError::new(
                ErrorCode::Conflict,
                format!("Store rejected {}: {}", resource, message),
            ),
            ApiClientError::Rejected { message, .. } => CommandError::validation(message),
            ApiClientError::Invalid(e) => CommandError::from(e),
            ApiClientError::InvalidUrl(url) => {
                CommandError::new(ErrorCode::ConfigError, format!("Invalid API URL: {}", url))
            }
            other if other.is_transport() => {
                tracing::error!(error = %other, "AutoNexus API unreachable");
                CommandError::new(
                    ErrorCode::NetworkError,
                    format!("Cannot reach the AutoNexus API: {}", other),
                )
            }
            other => {
                tracing::error!(error = %other, "REST request failed");
                CommandError::new(ErrorCode::NetworkError, other.to_string())
            }
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!(error = %err, "I/O failure");
        CommandError::internal(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::validation(format!("Invalid JSON: {}", err))
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_errors_map_to_stock_codes() {
        let err = CommandError::from(CoreError::StockExhausted {
            product_id: "p1".into(),
            name: "Brake Pads".into(),
        });
        assert_eq!(err.code, ErrorCode::StockExhausted);
        assert_eq!(err.message, "Brake Pads is out of stock");

        let err = CommandError::from(CoreError::StockLimitReached {
            product_id: "p1".into(),
            name: "Brake Pads".into(),
            stock: 2,
        });
        assert_eq!(err.code, ErrorCode::StockLimit);
    }

    #[test]
    fn test_validation_message_has_no_prefix() {
        let err = CommandError::from(CoreError::Validation(ValidationError::Required {
            field: "customer name".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "customer name is required");
    }

    #[test]
    fn test_api_errors_map_by_status() {
        let err = CommandError::from(ApiClientError::from_status(404, "bill b1", ""));
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = CommandError::from(ApiClientError::from_status(409, "bill", "out of stock"));
        assert_eq!(err.code, ErrorCode::Conflict);

        let err = CommandError::from(ApiClientError::from_status(503, "bills", "down"));
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert!(!err.message.starts_with("Cannot reach"));
    }

    #[tokio::test]
    async fn test_unreachable_api_names_the_api() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let api = nexus_api::ApiClient::new(&nexus_api::ApiConfig::new(format!(
            "http://127.0.0.1:{port}/api"
        )))
        .unwrap();

        let err = nexus_api::BillStore::list_bills(&api.bills(), 10)
            .await
            .unwrap_err();
        let err = CommandError::from(err);
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert!(err.message.starts_with("Cannot reach the AutoNexus API: "));
    }

    #[test]
    fn test_serializes_screaming_code() {
        let err = CommandError::new(ErrorCode::AccessDenied, "nope");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"ACCESS_DENIED","message":"nope"}"#);
    }
}
