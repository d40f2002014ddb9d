//! Response envelopes used by the REST API.
//!
//! Listing endpoints answer either with a wrapper object or with a bare
//! array, depending on the server version. Both shapes are accepted.

use serde::Deserialize;

use nexus_core::catalog::Page;
use nexus_core::{Bill, Product};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Pagination {
    #[serde(default)]
    pub current: Option<u32>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// `GET /products`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductList {
    Paged {
        products: Vec<Product>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
    Bare(Vec<Product>),
}

impl ProductList {
    pub fn into_page(self) -> Page<Product> {
        match self {
            ProductList::Bare(products) => Page::single(products),
            ProductList::Paged {
                products,
                pagination,
            } => {
                let pagination = pagination.unwrap_or_default();
                let total = pagination.total.unwrap_or(products.len() as u64);
                Page {
                    items: products,
                    current: pagination.current.unwrap_or(1).max(1),
                    pages: pagination.pages.unwrap_or(1).max(1),
                    total,
                }
            }
        }
    }

    pub fn into_items(self) -> Vec<Product> {
        match self {
            ProductList::Bare(products) | ProductList::Paged { products, .. } => products,
        }
    }
}

/// `GET /bills`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum BillList {
    Wrapped { bills: Vec<Bill> },
    Bare(Vec<Bill>),
}

impl BillList {
    pub fn into_items(self) -> Vec<Bill> {
        match self {
            BillList::Wrapped { bills } | BillList::Bare(bills) => bills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT: &str = r#"{"_id": "p1", "name": "Brake Pads", "price": 45.99, "stock": 4, "status": "In Stock"}"#;

    #[test]
    fn test_paged_product_list() {
        let json = format!(
            r#"{{"products": [{PRODUCT}], "pagination": {{"current": 2, "pages": 5, "total": 49}}}}"#
        );
        let page = serde_json::from_str::<ProductList>(&json).unwrap().into_page();

        assert_eq!(page.items.len(), 1);
        assert_eq!((page.current, page.pages, page.total), (2, 5, 49));
    }

    #[test]
    fn test_bare_product_list() {
        let json = format!("[{PRODUCT}, {PRODUCT}]");
        let page = serde_json::from_str::<ProductList>(&json).unwrap().into_page();
        assert_eq!((page.current, page.pages, page.total), (1, 1, 2));
    }

    #[test]
    fn test_products_without_pagination() {
        let json = format!(r#"{{"products": [{PRODUCT}]}}"#);
        let page = serde_json::from_str::<ProductList>(&json).unwrap().into_page();
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_bill_list_shapes() {
        let wrapped: BillList = serde_json::from_str(r#"{"bills": [{"billNumber": "B-1"}]}"#).unwrap();
        assert_eq!(wrapped.into_items()[0].bill_number, "B-1");

        let bare: BillList = serde_json::from_str("[]").unwrap();
        assert!(bare.into_items().is_empty());
    }
}
