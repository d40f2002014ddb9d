//! # Product Repository
//!
//! REST operations for the product catalog.
//!
//! ## Endpoints
//! ```text
//! GET    /products?page=&limit=&category=&brand=&status=&search=&featured=&sortBy=&sortOrder=
//! GET    /products?limit=1000          ← billing screen (filtered to purchasable)
//! GET    /products/{id}
//! POST   /products
//! PUT    /products/{id}
//! DELETE /products/{id}
//! ```
//!
//! Searching, filtering and sorting happen on the server. The price range is
//! applied to the returned page locally, as the catalog screen does.

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info};

use nexus_core::catalog::{Page, ProductQuery};
use nexus_core::validation::validate_id;
use nexus_core::{Product, ProductForm};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::store::ProductCatalog;
use crate::wire::ProductList;

/// Listing size used to load every product for billing.
pub const PURCHASABLE_LIMIT: u32 = 1000;

/// Repository for catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = api.products();
///
/// // Billing list
/// let products = repo.list_purchasable().await?;
///
/// // Catalog page
/// let page = repo.list_products(&ProductQuery::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    client: ApiClient,
}

impl ProductRepository {
    pub fn new(client: ApiClient) -> Self {
        ProductRepository { client }
    }
}

#[async_trait]
impl ProductCatalog for ProductRepository {
    async fn list_products(&self, query: &ProductQuery) -> ApiResult<Page<Product>> {
        query.validate()?;

        let pairs = query.to_query_pairs();
        let url = self
            .client
            .endpoint_with_query(&["products"], pairs.as_slice())?;
        let list: ProductList = self.client.get_json("products", url).await?;

        let mut page = list.into_page();
        if let Some(range) = &query.price_range {
            page.items.retain(|product| range.contains(product.price));
        }

        debug!(
            count = page.items.len(),
            page = page.current,
            pages = page.pages,
            "Listed products"
        );
        Ok(page)
    }

    async fn list_purchasable(&self) -> ApiResult<Vec<Product>> {
        let limit = PURCHASABLE_LIMIT.to_string();
        let url = self
            .client
            .endpoint_with_query(&["products"], &[("limit", limit.as_str())])?;
        let list: ProductList = self.client.get_json("products", url).await?;

        let products: Vec<Product> = list
            .into_items()
            .into_iter()
            .filter(Product::is_purchasable)
            .collect();

        debug!(count = products.len(), "Loaded purchasable products");
        Ok(products)
    }

    async fn get_product(&self, id: &str) -> ApiResult<Product> {
        validate_id(id)?;
        let url = self.client.endpoint(&["products", id])?;
        self.client.get_json(&format!("product {id}"), url).await
    }

    async fn create_product(&self, form: &ProductForm) -> ApiResult<Product> {
        form.validate()?;
        let url = self.client.endpoint(&["products"])?;
        let product: Product = self
            .client
            .send_json(Method::POST, "product", url, form)
            .await?;

        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    async fn update_product(&self, id: &str, form: &ProductForm) -> ApiResult<Product> {
        validate_id(id)?;
        form.validate()?;
        let url = self.client.endpoint(&["products", id])?;
        let product: Product = self
            .client
            .send_json(Method::PUT, &format!("product {id}"), url, form)
            .await?;

        info!(product_id = %id, "Product updated");
        Ok(product)
    }

    async fn delete_product(&self, id: &str) -> ApiResult<()> {
        validate_id(id)?;
        let url = self.client.endpoint(&["products", id])?;
        self.client
            .send_empty(Method::DELETE, &format!("product {id}"), url)
            .await?;

        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiClientError;
    use crate::stub::{serve, Reply};
    use nexus_core::catalog::PriceRange;
    use nexus_core::Money;

    const CATALOG: &str = r#"{
        "products": [
            {"_id": "p1", "name": "Brake Pads", "price": 45.99, "stock": 4, "status": "In Stock"},
            {"_id": "p2", "name": "Engine Oil", "price": 28.50, "stock": 0, "status": "Out of Stock"},
            {"_id": "p3", "name": "Wiper Blades", "price": 12.00, "stock": 7, "status": "Limited Stock", "isActive": false},
            {"_id": "p4", "name": "Turbo Kit", "price": 899.00, "stock": 1, "status": "Pre-Order"}
        ],
        "pagination": {"current": 1, "pages": 1, "total": 4}
    }"#;

    #[tokio::test]
    async fn test_purchasable_drops_inactive_and_unsellable() {
        let server = serve(vec![Reply::json(200, CATALOG)]).await;

        let products = server.client().products().list_purchasable().await.unwrap();
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p4"]);

        assert_eq!(
            server.requests()[0].request_line,
            "GET /api/products?limit=1000 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_price_range_is_applied_locally() {
        let server = serve(vec![Reply::json(200, CATALOG)]).await;
        let query = ProductQuery {
            price_range: Some(
                PriceRange::new(Money::from_cents(2000), Money::from_cents(5000)).unwrap(),
            ),
            ..ProductQuery::default()
        };

        let page = server.client().products().list_products(&query).await.unwrap();
        let ids: Vec<&str> = page.items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);

        let line = &server.requests()[0].request_line;
        assert!(line.starts_with("GET /api/products?page=1&limit=12"));
        assert!(!line.contains("price"));
    }

    #[tokio::test]
    async fn test_unexpected_status_keeps_body_text() {
        let server = serve(vec![Reply::json(503, "upstream down")]).await;

        let err = server.client().products().get_product("p1").await.unwrap_err();
        match err {
            ApiClientError::Status { status, message, .. } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(!ApiClientError::from_status(503, "products", "").is_transport());
    }
}
