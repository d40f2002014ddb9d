//! # Domain Types
//!
//! Core domain types used throughout AutoNexus billing.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Bill       │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  _id            │   │  _id            │   │  product (snap) │       │
//! │  │  name, brand    │   │  billNumber     │   │  quantity       │       │
//! │  │  price, stock   │   │  customer       │   │  unitPrice      │       │
//! │  │  status         │   │  items, totals  │   │  totalPrice     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ProductStatus   │   │   BillStatus    │   │ Category/Brand  │       │
//! │  │  In Stock       │   │  Draft          │   │  registries     │       │
//! │  │  Limited Stock  │   │  Pending        │   │  owned by the   │       │
//! │  │  Out of Stock   │   │  Paid           │   │  REST API       │       │
//! │  │  Pre-Order      │   │  Cancelled      │   └─────────────────┘       │
//! │  │  Discontinued   │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Every type here is exchanged with the REST API as JSON: camelCase field
//! names, `_id` for identities, money as plain numbers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::money::{Money, Percent};
use crate::validation;

fn default_true() -> bool {
    true
}

// =============================================================================
// Product Status
// =============================================================================

/// Availability status of a product, as the catalog reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProductStatus {
    #[default]
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Limited Stock")]
    LimitedStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(rename = "Pre-Order")]
    PreOrder,
    #[serde(rename = "Discontinued")]
    Discontinued,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 5] = [
        ProductStatus::InStock,
        ProductStatus::LimitedStock,
        ProductStatus::OutOfStock,
        ProductStatus::PreOrder,
        ProductStatus::Discontinued,
    ];

    /// The exact string used on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::InStock => "In Stock",
            ProductStatus::LimitedStock => "Limited Stock",
            ProductStatus::OutOfStock => "Out of Stock",
            ProductStatus::PreOrder => "Pre-Order",
            ProductStatus::Discontinued => "Discontinued",
        }
    }

    /// Whether the billing screen offers products with this status.
    pub const fn is_sellable(&self) -> bool {
        !matches!(self, ProductStatus::OutOfStock | ProductStatus::Discontinued)
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ValidationError;

    /// Accepts the wire string, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProductStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: ProductStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Product
// =============================================================================

/// Technical details shown on the product page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Specifications {
    pub weight: String,
    pub dimensions: String,
    pub material: String,
    pub color: String,
    pub warranty: String,
    pub compatibility: Vec<String>,
    pub part_number: String,
    pub origin: String,
}

/// A product as listed by the external catalog.
///
/// The catalog owns this record. A bill line keeps a read-only snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identity.
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Selling price.
    pub price: Money,

    /// Price before discount, shown struck through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,

    #[serde(default)]
    pub status: ProductStatus,

    /// Average review score, 0–5.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::money::decimal_number::option"
    )]
    pub rating: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,

    #[serde(default)]
    pub image: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<Specifications>,

    /// Units available. A missing count means none.
    #[serde(default)]
    pub stock: i64,

    /// Advertised discount percentage (display only, not applied to bills).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::money::decimal_number::option"
    )]
    pub discount: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub featured: bool,

    /// Soft-delete flag. Absent means active.
    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Creates a minimal product record (mostly for tests and fixtures).
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, stock: i64) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            subcategory: None,
            brand: None,
            model: None,
            year: None,
            price,
            original_price: None,
            status: ProductStatus::InStock,
            rating: None,
            reviews: None,
            image: String::new(),
            images: Vec::new(),
            badge: None,
            description: None,
            specifications: None,
            stock,
            discount: None,
            tags: Vec::new(),
            featured: false,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    /// Whether the product can be offered on the billing screen.
    ///
    /// Active, and neither Out of Stock nor Discontinued. The stock count is
    /// checked separately when the product is added.
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.status.is_sellable()
    }

    /// Brand name, or an empty string.
    pub fn brand_name(&self) -> &str {
        self.brand.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Admin Forms
// =============================================================================

/// Editable product fields, sent on create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub price: Money,
    #[serde(default)]
    pub original_price: Option<Money>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default, with = "crate::money::decimal_number::option")]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub badge: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specifications: Specifications,
    #[serde(default)]
    pub stock: i64,
    #[serde(default, with = "crate::money::decimal_number::option")]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ProductForm {
    /// Checks the form before it is sent.
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("name", &self.name)?;
        validation::validate_name("category", &self.category)?;
        validation::validate_price(self.price)?;
        if let Some(original) = self.original_price {
            validation::validate_price(original)?;
        }
        validation::validate_stock(self.stock)?;
        if let Some(rating) = self.rating {
            validation::validate_rating(rating)?;
        }
        if let Some(discount) = self.discount {
            Percent::new(discount)?;
        }
        Ok(())
    }
}

/// A subcategory inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subcategory {
    pub name: String,
    pub description: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// Editable category fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

impl CategoryForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("name", &self.name)?;
        for sub in &self.subcategories {
            validation::validate_name("subcategory name", &sub.name)?;
        }
        Ok(())
    }
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
}

/// Editable brand fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BrandForm {
    pub name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
}

impl BrandForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("name", &self.name)?;
        let website = self.website.trim();
        if !website.is_empty() && !(website.starts_with("http://") || website.starts_with("https://")) {
            return Err(ValidationError::InvalidFormat {
                field: "website".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Customer
// =============================================================================

/// The customer a bill is made out to.
///
/// Name and phone are required at submission; email and address are optional
/// and travel as empty strings when unset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Customer {
            name: name.into(),
            phone: phone.into(),
            ..Customer::default()
        }
    }
}

// =============================================================================
// Bill Status
// =============================================================================

/// Lifecycle of a bill.
///
/// ```text
///   Draft ──► Pending ──► Paid
///     │          │
///     │          ▼
///     └────► Cancelled
///     (Draft may also go straight to Paid)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BillStatus {
    #[default]
    Draft,
    Pending,
    Paid,
    Cancelled,
}

impl BillStatus {
    pub const ALL: [BillStatus; 4] = [
        BillStatus::Draft,
        BillStatus::Pending,
        BillStatus::Paid,
        BillStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Draft => "Draft",
            BillStatus::Pending => "Pending",
            BillStatus::Paid => "Paid",
            BillStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether a bill in this status may be saved with `next`.
    pub fn can_transition_to(&self, next: BillStatus) -> bool {
        use BillStatus::*;
        match (self, next) {
            (Draft, _) => true,
            (Pending, Pending | Paid | Cancelled) => true,
            (Paid, Paid) => true,
            (Cancelled, Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BillStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: BillStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product-quantity pairing within a bill.
///
/// Uses the snapshot pattern: `unit_price` is frozen when the product is
/// first added, so a later catalog price change does not reprice the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product: Product,
    pub quantity: i64,
    pub unit_price: Money,
    /// Always `unit_price × quantity`.
    pub total_price: Money,
}

impl LineItem {
    /// Creates a line for one unit of `product` at its current price.
    pub fn new(product: Product) -> Self {
        let unit_price = product.price;
        LineItem {
            product,
            quantity: 1,
            unit_price,
            total_price: unit_price,
        }
    }

    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Sets the quantity and recomputes the line total.
    pub(crate) fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.total_price = self.unit_price.multiply_quantity(quantity);
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A bill as persisted by the bill store.
///
/// Totals are computed by the store from the submitted payload; the client
/// recomputes them locally with [`crate::bill::compute_totals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable number assigned by the store.
    #[serde(default)]
    pub bill_number: String,

    #[serde(default)]
    pub customer: Customer,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub subtotal: Money,

    #[serde(default)]
    pub tax: Money,

    #[serde(default)]
    pub tax_rate: Percent,

    #[serde(default)]
    pub discount: Percent,

    #[serde(default)]
    pub discount_amount: Money,

    #[serde(default)]
    pub total: Money,

    #[serde(default)]
    pub status: BillStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub notes: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,

    #[serde(default)]
    pub pdf_generated: bool,
}

impl Bill {
    /// Sum of line quantities.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// Display label: the bill number, else the id, else `"(unsaved)"`.
    pub fn label(&self) -> &str {
        if !self.bill_number.is_empty() {
            &self.bill_number
        } else {
            self.id.as_deref().unwrap_or("(unsaved)")
        }
    }
}

/// The body sent to the bill store on create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPayload {
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub tax_rate: Percent,
    pub discount: Percent,
    pub notes: String,
    pub status: BillStatus,
}

// =============================================================================
// Unit Tests
// =============================================================================
