//! # nexus-core: Pure Business Logic for AutoNexus Billing
//!
//! This crate is the **heart** of AutoNexus billing. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     AutoNexus Billing Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    nexus CLI (apps/nexus-billing)               │   │
//! │  │    products ──► cart ──► bill save/generate/pay ──► receipt     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ nexus-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  money  │ │  bill   │ │ catalog │ │ access  │ │ receipt │  │   │
//! │  │   │ Money   │ │ Draft   │ │ Query   │ │ Policy  │ │  text   │  │   │
//! │  │   │ Percent │ │ Totals  │ │ Page    │ │ Role    │ │         │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO FILES • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    nexus-api (REST client)                      │   │
//! │  │          bills, products, categories, brands, PDFs              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Bill, LineItem, Category, Brand)
//! - [`money`] - Decimal `Money` and `Percent`
//! - [`bill`] - The bill aggregator and totals
//! - [`catalog`] - Product search, filter, sort, pagination
//! - [`access`] - Admin access policy
//! - [`receipt`] - Plain-text receipt rendering
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use nexus_core::bill::BillDraft;
//! use nexus_core::money::{Money, Percent};
//! use nexus_core::types::Product;
//!
//! let mut draft = BillDraft::new(Percent::from_whole(5));
//! let pads = Product::new("p1", "Brake Pads", Money::from_cents(4599), 4);
//! draft.add_item(&pads).unwrap();
//! draft.add_item(&pads).unwrap();
//!
//! let totals = draft.totals().rounded();
//! assert_eq!(totals.subtotal, Money::from_cents(9198));
//! assert_eq!(totals.total, Money::from_cents(9658)); // 91.98 + 4.599 tax
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod bill;
pub mod catalog;
pub mod error;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{AccessPolicy, Identity, Role};
pub use bill::{compute_totals, BillDraft, BillTotals, StockAdjustment};
pub use catalog::{Page, ProductQuery, ProductSort};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percent};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed on a single bill.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity accepted for one line.
///
/// ## Business Reason
/// Catches typing 1000 instead of 10. Stock is checked separately.
pub const MAX_ITEM_QUANTITY: i64 = 999;
