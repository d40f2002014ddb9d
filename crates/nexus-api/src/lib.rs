//! # nexus-api: REST Client for AutoNexus Billing
//!
//! This crate provides access to the external AutoNexus REST API, which is
//! the system of record for products, categories, brands and bills.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     AutoNexus Billing Data Flow                         │
//! │                                                                         │
//! │  Billing command (save bill)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     nexus-api (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   ApiClient   │    │  Repositories │    │    Traits    │  │   │
//! │  │   │  (client.rs)  │    │  (bill.rs …)  │    │  (store.rs)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ reqwest       │◄───│ BillRepo      │───►│ BillStore    │  │   │
//! │  │   │ base URL      │    │ ProductRepo   │    │ ProductCat.. │  │   │
//! │  │   │ timeout       │    │ Category/Brand│    │ + mocks      │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     REST API (external)                         │   │
//! │  │                  http://localhost:5000/api                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - HTTP client and endpoint configuration
//! - [`store`] - Store traits (and their `mockall` doubles)
//! - [`error`] - REST error types and status mapping
//! - [`repository`] - Trait implementations over HTTP
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nexus_api::{ApiClient, ApiConfig, BillStore};
//!
//! let api = ApiClient::new(&ApiConfig::default())?;
//! let bills = api.bills().list_bills(100).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod error;
pub mod repository;
pub mod store;
mod wire;

#[cfg(test)]
mod stub;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{ApiClient, ApiConfig, DEFAULT_BASE_URL};
pub use error::{ApiClientError, ApiResult};
pub use store::{BillStore, BrandRegistry, CategoryRegistry, ProductCatalog, BILL_LIST_LIMIT};
pub use store::{MockBillStore, MockBrandRegistry, MockCategoryRegistry, MockProductCatalog};

// Repository re-exports for convenience
pub use repository::{BillRepository, BrandRepository, CategoryRepository, ProductRepository};
