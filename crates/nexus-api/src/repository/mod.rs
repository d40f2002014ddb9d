//! # Repository Module
//!
//! REST repository implementations for AutoNexus billing.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern hides the REST API behind a clean trait.       │
//! │                                                                         │
//! │  Billing command                                                       │
//! │       │                                                                 │
//! │       │  store.create_bill(&payload)                                   │
//! │       ▼                                                                 │
//! │  BillStore (trait, store.rs)                                           │
//! │       │                                                                 │
//! │       ├── BillRepository      (this module, reqwest)                   │
//! │       └── MockBillStore       (mockall, tests)                         │
//! │       │                                                                 │
//! │       │  POST /bills                                                    │
//! │       ▼                                                                 │
//! │  REST API                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`BillRepository`] - Bill CRUD and PDF rendering
//! - [`ProductRepository`] - Product listing and admin CRUD
//! - [`CategoryRepository`] - Category registry
//! - [`BrandRepository`] - Brand registry

pub mod bill;
pub mod brand;
pub mod category;
pub mod product;

pub use bill::BillRepository;
pub use brand::BrandRepository;
pub use category::CategoryRepository;
pub use product::ProductRepository;
