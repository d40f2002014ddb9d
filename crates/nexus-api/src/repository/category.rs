//! REST operations for product categories (`/categories`).

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info};

use nexus_core::validation::validate_id;
use nexus_core::{Category, CategoryForm};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::store::CategoryRegistry;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    client: ApiClient,
}

impl CategoryRepository {
    pub fn new(client: ApiClient) -> Self {
        CategoryRepository { client }
    }
}

#[async_trait]
impl CategoryRegistry for CategoryRepository {
    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        let url = self.client.endpoint(&["categories"])?;
        let categories: Vec<Category> = self.client.get_json("categories", url).await?;
        debug!(count = categories.len(), "Listed categories");
        Ok(categories)
    }

    async fn create_category(&self, form: &CategoryForm) -> ApiResult<Category> {
        form.validate()?;
        let url = self.client.endpoint(&["categories"])?;
        let category: Category = self
            .client
            .send_json(Method::POST, "category", url, form)
            .await?;
        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    async fn update_category(&self, id: &str, form: &CategoryForm) -> ApiResult<Category> {
        validate_id(id)?;
        form.validate()?;
        let url = self.client.endpoint(&["categories", id])?;
        let category: Category = self
            .client
            .send_json(Method::PUT, &format!("category {id}"), url, form)
            .await?;
        info!(category_id = %id, "Category updated");
        Ok(category)
    }

    async fn delete_category(&self, id: &str) -> ApiResult<()> {
        validate_id(id)?;
        let url = self.client.endpoint(&["categories", id])?;
        self.client
            .send_empty(Method::DELETE, &format!("category {id}"), url)
            .await?;
        info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
