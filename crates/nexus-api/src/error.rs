//! # REST Client Error Types
//!
//! Error types for calls to the external REST API.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  HTTP response (status + body) / reqwest::Error                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiClientError (this module) ← Adds resource context + category       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CommandError (in app) ← code + message                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Notice shown to the user, auto-dismissed                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Mapping
//! ```text
//! 404        → NotFound
//! 409        → Conflict   (the store is the stock authority)
//! 400, 422   → Rejected   (body text kept)
//! other      → Status
//! ```

use nexus_core::ValidationError;
use thiserror::Error;

/// Longest error body kept in a message.
const MAX_BODY_CHARS: usize = 300;

/// REST call failures.
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// The resource does not exist.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The store refused the change because of its current state.
    ///
    /// ## When This Occurs
    /// - Stock sold out between listing and saving the bill
    /// - Concurrent edit of the same bill
    #[error("{resource} conflict: {message}")]
    Conflict { resource: String, message: String },

    /// The store rejected the request body.
    #[error("{resource} rejected ({status}): {message}")]
    Rejected {
        resource: String,
        status: u16,
        message: String,
    },

    /// Any other non-success status.
    #[error("{resource} request failed with status {status}: {message}")]
    Status {
        resource: String,
        status: u16,
        message: String,
    },

    /// Transport failure (connect, timeout, TLS, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL cannot be used.
    #[error("invalid API url: {0}")]
    InvalidUrl(String),

    /// A request argument failed validation before anything was sent.
    #[error("invalid request: {0}")]
    Invalid(#[from] ValidationError),

    /// A success response whose body could not be read.
    #[error("unexpected {resource} response: {message}")]
    Decode { resource: String, message: String },
}

impl ApiClientError {
    /// Maps a non-success status to an error.
    ///
    /// `body` is the raw response text; a JSON `message` or `error` field is
    /// preferred when present.
    pub fn from_status(status: u16, resource: impl Into<String>, body: &str) -> Self {
        let resource = resource.into();
        let message = body_message(body);

        match status {
            404 => ApiClientError::NotFound { resource },
            409 => ApiClientError::Conflict { resource, message },
            400 | 422 => ApiClientError::Rejected {
                resource,
                status,
                message,
            },
            _ => ApiClientError::Status {
                resource,
                status,
                message,
            },
        }
    }

    /// Whether the failure happened below HTTP (no usable response).
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiClientError::Http(_))
    }

    /// Creates a Decode error.
    pub fn decode(resource: impl Into<String>, message: impl Into<String>) -> Self {
        ApiClientError::Decode {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

fn body_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        });

    let text = from_json.unwrap_or_else(|| body.trim().to_string());
    if text.is_empty() {
        return "no details".to_string();
    }
    if text.chars().count() > MAX_BODY_CHARS {
        let mut cut: String = text.chars().take(MAX_BODY_CHARS).collect();
        cut.push('…');
        return cut;
    }
    text
}

/// Result type for REST calls.
pub type ApiResult<T> = Result<T, ApiClientError>;
