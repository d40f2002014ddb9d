//! # Commands Module
//!
//! Every operation the CLI exposes.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── catalog.rs  ◄─── Product, category and brand listings
//! ├── cart.rs     ◄─── Line items on the draft
//! ├── bill.rs     ◄─── Customer, rates, save, bills, PDF, receipt
//! └── admin.rs    ◄─── Catalog maintenance (admin only)
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  nexus cart add p-123                                                   │
//! │         │                                                               │
//! │         │ (clap)                                                        │
//! │         ▼                                                               │
//! │  async fn add_to_cart(                                                  │
//! │      session: &mut BillingSession,   ◄── restored from session.json    │
//! │      catalog: &dyn ProductCatalog,   ◄── REST repo, or a mock in tests │
//! │      product_id: &str,                                                  │
//! │  ) -> CommandResult<i64>                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Error or success notice recorded on the session, which is saved       │
//! │  back to disk before the process exits.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands take the store traits as `&dyn` so tests can pass the `mockall`
//! doubles from `nexus-api`.

pub mod admin;
pub mod bill;
pub mod cart;
pub mod catalog;
