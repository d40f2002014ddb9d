//! # Cart Commands
//!
//! Line-item changes on the draft bill.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Saved   │────►│   Paid   │       │
//! │  │  Draft   │     │          │     │ (Pending)│     │          │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart        bill save / generate / pay        │
//! │                   set_quantity       (bill.rs)                         │
//! │                   remove_from_cart                                      │
//! │                   refresh_stock                                         │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use nexus_api::ProductCatalog;
use nexus_core::validation::validate_id;
use nexus_core::StockAdjustment;

use crate::error::{CommandError, CommandResult};
use crate::state::BillingSession;

/// Adds one unit of a product to the draft.
///
/// The product is fetched fresh so the stock ceiling is current. The price
/// of a line already on the bill stays as it was when first added.
///
/// ## Returns
/// The line's new quantity
pub async fn add_to_cart(
    session: &mut BillingSession,
    catalog: &dyn ProductCatalog,
    product_id: &str,
) -> CommandResult<i64> {
    debug!(product_id = %product_id, "add_to_cart command");

    let result = add_inner(session, catalog, product_id).await;
    session.report(result)
}

async fn add_inner(
    session: &mut BillingSession,
    catalog: &dyn ProductCatalog,
    product_id: &str,
) -> CommandResult<i64> {
    validate_id(product_id)?;
    let product = catalog.get_product(product_id).await?;

    if !product.is_purchasable() {
        return Err(CommandError::validation(format!(
            "{} is not available for sale",
            product.name
        )));
    }

    let quantity = session.draft_mut().add_item(&product)?;
    session.notify_success(format!("{} added to bill", product.name));

    info!(
        product_id = %product.id,
        quantity,
        stock = product.stock,
        "Item added to bill"
    );
    Ok(quantity)
}

/// Sets a line's quantity; zero or less removes the line.
pub fn set_quantity(
    session: &mut BillingSession,
    product_id: &str,
    quantity: i64,
) -> CommandResult<()> {
    debug!(product_id = %product_id, quantity, "set_quantity command");

    if session.draft().line(product_id).is_none() {
        let err = CommandError::not_found("Bill item", product_id);
        return session.report(Err(err));
    }

    let result = session
        .draft_mut()
        .update_quantity(product_id, quantity)
        .map_err(CommandError::from);
    session.report(result)?;

    if quantity <= 0 {
        session.notify_success("Item removed from bill");
    }
    Ok(())
}

/// Removes a line from the draft.
pub fn remove_from_cart(session: &mut BillingSession, product_id: &str) -> CommandResult<()> {
    debug!(product_id = %product_id, "remove_from_cart command");

    if !session.draft_mut().remove_item(product_id) {
        let err = CommandError::not_found("Bill item", product_id);
        return session.report(Err(err));
    }
    session.notify_success("Item removed from bill");
    Ok(())
}

/// Empties the draft and forgets the bill being edited.
pub fn clear_cart(session: &mut BillingSession) {
    debug!("clear_cart command");
    session.clear();
}

/// Re-reads stock for every line and brings the draft back within it.
///
/// Lines whose product is no longer offered for sale are removed; lines
/// above the fresh stock count are clamped to it.
pub async fn refresh_stock(
    session: &mut BillingSession,
    catalog: &dyn ProductCatalog,
) -> CommandResult<Vec<StockAdjustment>> {
    debug!("refresh_stock command");

    let result = catalog
        .list_purchasable()
        .await
        .map_err(|e| CommandError::from(e).context("Failed to fetch products"));
    let fresh = session.report(result)?;

    let withdrawn: Vec<(String, String)> = session
        .draft()
        .lines()
        .iter()
        .filter(|line| !fresh.iter().any(|p| p.id == line.product_id()))
        .map(|line| (line.product_id().to_string(), line.product.name.clone()))
        .collect();

    let mut adjustments = Vec::new();
    for (product_id, name) in withdrawn {
        session.draft_mut().remove_item(&product_id);
        adjustments.push(StockAdjustment::Removed { product_id, name });
    }
    adjustments.extend(session.draft_mut().reconcile_stock(&fresh));

    if adjustments.is_empty() {
        session.notify_success("Stock is up to date");
    } else {
        let summary = adjustments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        info!(changes = adjustments.len(), "Bill adjusted to current stock");
        session.notify_error(summary);
    }

    Ok(adjustments)
}
