//! # Catalog Commands
//!
//! Read-only listings: products (filtered, sorted, paged), categories and
//! brands.

use tracing::debug;

use nexus_api::{BrandRegistry, CategoryRegistry, ProductCatalog};
use nexus_core::{Brand, Category, Page, Product, ProductQuery};

use crate::error::{CommandError, CommandResult};
use crate::state::BillingSession;

/// Lists one page of the catalog.
pub async fn list_products(
    session: &mut BillingSession,
    catalog: &dyn ProductCatalog,
    query: &ProductQuery,
) -> CommandResult<Page<Product>> {
    debug!(?query, "list_products command");

    let result = catalog
        .list_products(query)
        .await
        .map_err(|e| CommandError::from(e).context("Failed to fetch products"));
    session.report(result)
}

pub async fn list_categories(
    session: &mut BillingSession,
    registry: &dyn CategoryRegistry,
) -> CommandResult<Vec<Category>> {
    debug!("list_categories command");

    let result = registry
        .list_categories()
        .await
        .map_err(|e| CommandError::from(e).context("Failed to fetch categories"));
    let mut categories = session.report(result)?;
    categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(categories)
}

pub async fn list_brands(
    session: &mut BillingSession,
    registry: &dyn BrandRegistry,
) -> CommandResult<Vec<Brand>> {
    debug!("list_brands command");

    let result = registry
        .list_brands()
        .await
        .map_err(|e| CommandError::from(e).context("Failed to fetch brands"));
    let mut brands = session.report(result)?;
    brands.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(brands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use nexus_api::{ApiClientError, MockBrandRegistry, MockProductCatalog};

    #[tokio::test]
    async fn test_product_listing_failure_is_reported() {
        let mut session = BillingSession::default();
        let mut catalog = MockProductCatalog::new();
        catalog
            .expect_list_products()
            .returning(|_| Err(ApiClientError::from_status(500, "products", "boom")));

        let err = list_products(&mut session, &catalog, &ProductQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert!(err.message.starts_with("Failed to fetch products: "));
        assert_eq!(session.notices().active(Utc::now()).len(), 1);
    }

    #[tokio::test]
    async fn test_product_listing_passes_query() {
        let mut session = BillingSession::default();
        let mut catalog = MockProductCatalog::new();
        catalog
            .expect_list_products()
            .withf(|q| q.search.as_deref() == Some("brake") && q.page == 2)
            .returning(|_| {
                Ok(Page::single(vec![crate::fixtures::brake_pads(3)]))
            });

        let query = ProductQuery {
            page: 2,
            ..ProductQuery::default()
        }
        .with_search("  brake ")
        .unwrap();

        let page = list_products(&mut session, &catalog, &query).await.unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_brands_are_sorted_by_name() {
        let mut session = BillingSession::default();
        let mut registry = MockBrandRegistry::new();
        registry.expect_list_brands().returning(|| {
            Ok(vec![
                serde_json::from_str(r#"{"_id":"b2","name":"toyota"}"#).unwrap(),
                serde_json::from_str(r#"{"_id":"b1","name":"Bosch"}"#).unwrap(),
            ])
        });

        let brands = list_brands(&mut session, &registry).await.unwrap();
        let names: Vec<&str> = brands.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Bosch", "toyota"]);
    }
}
