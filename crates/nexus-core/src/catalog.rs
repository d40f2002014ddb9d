//! # Catalog Query
//!
//! Search, filter, sort and pagination over product listings.
//!
//! ## Two Ways to Run a Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ProductQuery ──► to_query_pairs() ──► GET /products?page=1&limit=12…  │
//! │       │                                  (remote does the work)         │
//! │       │                                                                 │
//! │       └────────► apply(&[Product]) ──► Page<Product>                    │
//! │                                  (local: filter → sort → paginate)      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The selection lists offer "All Categories", "All Brands" and "All Status";
//! those sentinels (and blank values) mean "no filter".

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::types::{Product, ProductStatus};
use crate::validation::validate_search_query;

/// Selection value meaning "any category".
pub const ALL_CATEGORIES: &str = "All Categories";
/// Selection value meaning "any brand".
pub const ALL_BRANDS: &str = "All Brands";
/// Selection value meaning "any status".
pub const ALL_STATUS: &str = "All Status";

/// Products per page on the catalog screen.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

// =============================================================================
// Sorting
// =============================================================================

/// Direction of a remote sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort options offered on the catalog screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    /// Name A→Z.
    #[default]
    Name,
    /// Price, lowest first.
    PriceLow,
    /// Price, highest first.
    PriceHigh,
    /// Rating, best first.
    Rating,
    /// Most recently created first.
    Newest,
    /// Featured products first.
    Featured,
}

impl ProductSort {
    pub const ALL: [ProductSort; 6] = [
        ProductSort::Name,
        ProductSort::PriceLow,
        ProductSort::PriceHigh,
        ProductSort::Rating,
        ProductSort::Newest,
        ProductSort::Featured,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductSort::Name => "name",
            ProductSort::PriceLow => "price-low",
            ProductSort::PriceHigh => "price-high",
            ProductSort::Rating => "rating",
            ProductSort::Newest => "newest",
            ProductSort::Featured => "featured",
        }
    }

    /// The `sortBy` field and `sortOrder` the REST API expects.
    pub const fn remote(&self) -> (&'static str, SortOrder) {
        match self {
            ProductSort::Name => ("name", SortOrder::Asc),
            ProductSort::PriceLow => ("price", SortOrder::Asc),
            ProductSort::PriceHigh => ("price", SortOrder::Desc),
            ProductSort::Rating => ("rating", SortOrder::Desc),
            ProductSort::Newest => ("createdAt", SortOrder::Desc),
            ProductSort::Featured => ("featured", SortOrder::Desc),
        }
    }

    /// Compares two products in this sort's order.
    ///
    /// Missing ratings and dates sort last.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            ProductSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            ProductSort::PriceLow => a.price.cmp(&b.price),
            ProductSort::PriceHigh => b.price.cmp(&a.price),
            ProductSort::Rating => desc_some_first(a.rating, b.rating),
            ProductSort::Newest => desc_some_first(a.created_at, b.created_at),
            ProductSort::Featured => b.featured.cmp(&a.featured),
        }
    }
}

fn desc_some_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProductSort::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: ProductSort::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Price Range
// =============================================================================

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

impl PriceRange {
    pub fn new(min: Money, max: Money) -> ValidationResult<Self> {
        if min.is_negative() || max < min {
            return Err(ValidationError::InvalidFormat {
                field: "price range".to_string(),
                reason: format!("expected 0 ≤ min ≤ max, got {min}..{max}"),
            });
        }
        Ok(PriceRange { min, max })
    }

    pub fn contains(&self, price: Money) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PriceRange {
    /// The slider range of the catalog screen: 0 to 100 000.
    fn default() -> Self {
        PriceRange {
            min: Money::zero(),
            max: Money::from_major(100_000),
        }
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of results.
///
/// `current` is 1-based; `pages` is at least 1 even when nothing matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current: u32,
    pub pages: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Wraps an unpaginated list as a single page.
    pub fn single(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Page {
            items,
            current: 1,
            pages: 1,
            total,
        }
    }
}

// =============================================================================
// Product Query
// =============================================================================

/// A product listing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub status: Option<ProductStatus>,
    pub featured_only: bool,
    pub price_range: Option<PriceRange>,
    pub sort: ProductSort,
    pub page: u32,
    pub limit: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductQuery {
            search: None,
            category: None,
            brand: None,
            status: None,
            featured_only: false,
            price_range: None,
            sort: ProductSort::Name,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Treats blanks and the "All …" sentinel as no filter.
fn active_filter<'a>(value: &'a Option<String>, sentinel: &str) -> Option<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != sentinel)
}

/// Parses a status selection; `"All Status"` and blank give `None`.
pub fn parse_status_filter(value: &str) -> ValidationResult<Option<ProductStatus>> {
    let value = value.trim();
    if value.is_empty() || value == ALL_STATUS {
        return Ok(None);
    }
    value.parse().map(Some)
}

impl ProductQuery {
    /// Sets the search text, trimmed. Blank clears it.
    pub fn with_search(mut self, search: &str) -> ValidationResult<Self> {
        let search = validate_search_query(search)?;
        self.search = (!search.is_empty()).then_some(search);
        Ok(self)
    }

    /// Checks paging values before a query is run.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.page == 0 {
            return Err(ValidationError::MustBePositive {
                field: "page".to_string(),
            });
        }
        if self.limit == 0 || self.limit > 1000 {
            return Err(ValidationError::OutOfRange {
                field: "limit".to_string(),
                min: 1,
                max: 1000,
            });
        }
        Ok(())
    }

    /// Whether a product passes every filter of this query.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = [product.name.as_str(), product.brand_name(), product.category.as_str()]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(category) = active_filter(&self.category, ALL_CATEGORIES) {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }

        if let Some(brand) = active_filter(&self.brand, ALL_BRANDS) {
            if !product.brand_name().eq_ignore_ascii_case(brand) {
                return false;
            }
        }

        if let Some(status) = self.status {
            if product.status != status {
                return false;
            }
        }

        if self.featured_only && !product.featured {
            return false;
        }

        if let Some(range) = &self.price_range {
            if !range.contains(product.price) {
                return false;
            }
        }

        true
    }

    /// Filters, sorts and paginates a listing locally.
    pub fn apply(&self, products: &[Product]) -> Page<Product> {
        let mut matched: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        matched.sort_by(|a, b| self.sort.compare(a, b));

        let limit = self.limit.max(1) as usize;
        let total = matched.len();
        let pages = total.div_ceil(limit).max(1);
        let current = (self.page.max(1) as usize).min(pages);

        let items = matched
            .into_iter()
            .skip((current - 1) * limit)
            .take(limit)
            .cloned()
            .collect();

        Page {
            items,
            current: current as u32,
            pages: pages as u32,
            total: total as u64,
        }
    }

    /// Query parameters for `GET /products`.
    ///
    /// Filters left at their "All …" value are omitted; the price range is
    /// always applied locally.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];

        if let Some(category) = active_filter(&self.category, ALL_CATEGORIES) {
            pairs.push(("category", category.to_string()));
        }
        if let Some(brand) = active_filter(&self.brand, ALL_BRANDS) {
            pairs.push(("brand", brand.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if self.featured_only {
            pairs.push(("featured", "true".to_string()));
        }

        let (sort_by, order) = self.sort.remote();
        pairs.push(("sortBy", sort_by.to_string()));
        pairs.push(("sortOrder", order.as_str().to_string()));
        pairs
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
