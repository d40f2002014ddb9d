//! # Store Traits
//!
//! The seams between the billing app and the REST API.
//!
//! ```text
//! ┌──────────────────────┐        ┌─────────────────────────────────────┐
//! │  nexus-billing       │        │  nexus-api                          │
//! │  commands            │──uses─►│  BillStore        ◄── BillRepository│
//! │                      │        │  ProductCatalog   ◄── ProductRepo…  │
//! │  tests               │──uses─►│  Mock* (mockall)                    │
//! └──────────────────────┘        └─────────────────────────────────────┘
//! ```
//!
//! The store is the authority for stock and for persisted bills; callers
//! treat their own copies as advisory.

use async_trait::async_trait;
use mockall::automock;

use nexus_core::catalog::{Page, ProductQuery};
use nexus_core::{Bill, BillPayload, Brand, BrandForm, Category, CategoryForm, Product, ProductForm};

use crate::error::ApiResult;

/// Number of bills fetched for the bills list.
pub const BILL_LIST_LIMIT: u32 = 100;

/// Persisted bills.
#[automock]
#[async_trait]
pub trait BillStore: Send + Sync {
    /// Most recent bills, at most `limit`.
    async fn list_bills(&self, limit: u32) -> ApiResult<Vec<Bill>>;

    async fn get_bill(&self, id: &str) -> ApiResult<Bill>;

    /// Creates a bill; the store assigns id, number and totals.
    async fn create_bill(&self, payload: &BillPayload) -> ApiResult<Bill>;

    /// Replaces an existing bill.
    async fn update_bill(&self, id: &str, payload: &BillPayload) -> ApiResult<Bill>;

    async fn delete_bill(&self, id: &str) -> ApiResult<()>;

    /// Asks the store to render the bill's PDF.
    async fn generate_pdf(&self, id: &str) -> ApiResult<()>;

    /// Fetches a previously generated PDF.
    async fn download_pdf(&self, id: &str) -> ApiResult<Vec<u8>>;
}

/// The product catalog.
#[automock]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// One page of products matching `query`.
    async fn list_products(&self, query: &ProductQuery) -> ApiResult<Page<Product>>;

    /// Every product the billing screen may offer.
    async fn list_purchasable(&self) -> ApiResult<Vec<Product>>;

    async fn get_product(&self, id: &str) -> ApiResult<Product>;

    async fn create_product(&self, form: &ProductForm) -> ApiResult<Product>;

    async fn update_product(&self, id: &str, form: &ProductForm) -> ApiResult<Product>;

    async fn delete_product(&self, id: &str) -> ApiResult<()>;
}

/// Product categories.
#[automock]
#[async_trait]
pub trait CategoryRegistry: Send + Sync {
    async fn list_categories(&self) -> ApiResult<Vec<Category>>;

    async fn create_category(&self, form: &CategoryForm) -> ApiResult<Category>;

    async fn update_category(&self, id: &str, form: &CategoryForm) -> ApiResult<Category>;

    async fn delete_category(&self, id: &str) -> ApiResult<()>;
}

/// Product brands.
#[automock]
#[async_trait]
pub trait BrandRegistry: Send + Sync {
    async fn list_brands(&self) -> ApiResult<Vec<Brand>>;

    async fn create_brand(&self, form: &BrandForm) -> ApiResult<Brand>;

    async fn update_brand(&self, id: &str, form: &BrandForm) -> ApiResult<Brand>;

    async fn delete_brand(&self, id: &str) -> ApiResult<()>;
}
