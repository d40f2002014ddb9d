//! REST operations for product brands (`/brands`).

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info};

use nexus_core::validation::validate_id;
use nexus_core::{Brand, BrandForm};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::store::BrandRegistry;

#[derive(Debug, Clone)]
pub struct BrandRepository {
    client: ApiClient,
}

impl BrandRepository {
    pub fn new(client: ApiClient) -> Self {
        BrandRepository { client }
    }
}

#[async_trait]
impl BrandRegistry for BrandRepository {
    async fn list_brands(&self) -> ApiResult<Vec<Brand>> {
        let url = self.client.endpoint(&["brands"])?;
        let brands: Vec<Brand> = self.client.get_json("brands", url).await?;
        debug!(count = brands.len(), "Listed brands");
        Ok(brands)
    }

    async fn create_brand(&self, form: &BrandForm) -> ApiResult<Brand> {
        form.validate()?;
        let url = self.client.endpoint(&["brands"])?;
        let brand: Brand = self
            .client
            .send_json(Method::POST, "brand", url, form)
            .await?;
        info!(brand_id = %brand.id, name = %brand.name, "Brand created");
        Ok(brand)
    }

    async fn update_brand(&self, id: &str, form: &BrandForm) -> ApiResult<Brand> {
        validate_id(id)?;
        form.validate()?;
        let url = self.client.endpoint(&["brands", id])?;
        let brand: Brand = self
            .client
            .send_json(Method::PUT, &format!("brand {id}"), url, form)
            .await?;
        info!(brand_id = %id, "Brand updated");
        Ok(brand)
    }

    async fn delete_brand(&self, id: &str) -> ApiResult<()> {
        validate_id(id)?;
        let url = self.client.endpoint(&["brands", id])?;
        self.client
            .send_empty(Method::DELETE, &format!("brand {id}"), url)
            .await?;
        info!(brand_id = %id, "Brand deleted");
        Ok(())
    }
}
