//! # Admin Commands
//!
//! Catalog maintenance: products, categories and brands. Every command here
//! checks the signed-in identity against the [`AccessPolicy`] first.
//!
//! ```text
//! nexus admin product create --file pads.json
//!        │
//!        ▼
//!   AccessPolicy::require_admin(identity) ──✗──► ACCESS_DENIED (file not read)
//!        │ ✓
//!        ▼
//!   read + validate JSON form ──✗──► VALIDATION_ERROR (no request)
//!        │ ✓
//!        ▼
//!   POST /products
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use nexus_api::{BrandRegistry, CategoryRegistry, ProductCatalog};
use nexus_core::{
    AccessPolicy, Brand, BrandForm, Category, CategoryForm, Identity, Product, ProductForm,
};

use crate::error::{CommandError, CommandResult};
use crate::state::BillingSession;

/// The caller of an admin command.
#[derive(Debug, Clone, Copy)]
pub struct AdminContext<'a> {
    pub policy: &'a AccessPolicy,
    pub identity: &'a Identity,
}

impl<'a> AdminContext<'a> {
    pub fn new(policy: &'a AccessPolicy, identity: &'a Identity) -> Self {
        AdminContext { policy, identity }
    }

    fn check(&self) -> CommandResult<()> {
        self.policy.require_admin(self.identity)?;
        debug!(email = %self.identity.email, "Admin access granted");
        Ok(())
    }

    /// Reads a JSON form file. Access is checked before the file is opened.
    pub fn read_form<T: DeserializeOwned>(&self, path: &Path) -> CommandResult<T> {
        self.check()?;
        read_form(path)
    }
}

fn read_form<T: DeserializeOwned>(path: &Path) -> CommandResult<T> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CommandError::from(e).context(&format!("Cannot read {}", path.display())))?;
    let form = serde_json::from_str(&contents)?;
    Ok(form)
}

/// Which catalog entity an admin command changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Product,
    Category,
    Brand,
}

impl Entity {
    fn label(&self) -> &'static str {
        match self {
            Entity::Product => "Product",
            Entity::Category => "Category",
            Entity::Brand => "Brand",
        }
    }
}

/// Checks access, then runs `op`. The request is only built once the
/// caller is known to be an admin.
async fn run<T, F, Fut>(
    session: &mut BillingSession,
    admin: AdminContext<'_>,
    action: &str,
    entity: Entity,
    op: F,
) -> CommandResult<T>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = nexus_api::ApiResult<T>>,
{
    let result = match admin.check() {
        Ok(()) => op().await.map_err(|e| {
            CommandError::from(e).context(&format!(
                "Failed to {} {}",
                action,
                entity.label().to_lowercase()
            ))
        }),
        Err(e) => Err(e),
    };
    let value = session.report(result)?;

    let done = match action {
        "create" => "added",
        "update" => "updated",
        _ => "deleted",
    };
    session.notify_success(format!("{} {} successfully!", entity.label(), done));
    info!(entity = entity.label(), action, by = %admin.identity.email, "Catalog changed");
    Ok(value)
}

// =============================================================================
// Products
// =============================================================================

pub async fn create_product(
    session: &mut BillingSession,
    admin: AdminContext<'_>,
    catalog: &dyn ProductCatalog,
    form: &ProductForm,
) -> CommandResult<Product> {
    run(session, admin, "create", Entity::Product, || catalog.create_product(form)).await
}

pub async fn update_product(
    session: &mut BillingSession,
    admin: AdminContext<'_>,
    catalog: &dyn ProductCatalog,
    id: &str,
    form: &ProductForm,
) -> CommandResult<Product> {
    run(session, admin, "update", Entity::Product, || catalog.update_product(id, form)).await
}

pub async fn delete_product(
    session: &mut BillingSession,
    admin: AdminContext<'_>,
    catalog: &dyn ProductCatalog,
    id: &str,
) -> CommandResult<()> {
    run(session, admin, "delete", Entity::Product, || catalog.delete_product(id)).await
}

// =============================================================================
// Categories
// =============================================================================

pub async fn create_category(
    session: &mut BillingSession,
    admin: AdminContext<'_>,
    registry: &dyn CategoryRegistry,
    form: &CategoryForm,
) -> CommandResult<Category> {
    run(session, admin, "create", Entity::Category, || registry.create_category(form)).await
}

pub async fn update_category(
    session: &mut BillingSession,
    admin: AdminContext<'_>,
    registry: &dyn CategoryRegistry,
    id: &str,
    form: &CategoryForm,
) -> CommandResult<Category> {
    run(session, admin, "update", Entity::Category, || registry.update_category(id, form)).await
}

pub async fn delete_category(
    session: &mut BillingSession,
    admin: AdminContext<'_>,
    registry: &dyn CategoryRegistry,
    id: &str,
) -> CommandResult<()> {
    run(session, admin, "delete", Entity::Category, || registry.delete_category(id)).await
}

// =============================================================================
// Brands
// =============================================================================

pub async fn create_brand(
    session: &mut BillingSession,
    admin: AdminContext<'_>,
    registry: &dyn BrandRegistry,
    form: &BrandForm,
) -> CommandResult<Brand> {
    run(session, admin, "create", Entity::Brand, || registry.create_brand(form)).await
}

pub async fn update_brand(
    session: &mut BillingSession,
    admin: AdminContext<'_>,
    registry: &dyn BrandRegistry,
    id: &str,
    form: &BrandForm,
) -> CommandResult<Brand> {
    run(session, admin, "update", Entity::Brand, || registry.update_brand(id, form)).await
}

pub async fn delete_brand(
    session: &mut BillingSession,
    admin: AdminContext<'_>,
    registry: &dyn BrandRegistry,
    id: &str,
) -> CommandResult<()> {
    run(session, admin, "delete", Entity::Brand, || registry.delete_brand(id)).await
}
