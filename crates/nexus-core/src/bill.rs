//! # Bill Aggregator
//!
//! The in-memory bill being assembled before it is sent to the bill store.
//!
//! ## Bill Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Bill Lifecycle                                 │
//! │                                                                         │
//! │  ┌──────────┐    ┌───────────────┐    ┌──────────┐    ┌─────────────┐  │
//! │  │  Empty   │───►│  Add Items    │───►│ Customer │───►│   Submit    │  │
//! │  │  Draft   │    │  Update Qty   │    │ Tax/Disc │    │ (validate + │  │
//! │  └──────────┘    │  Remove Items │    │  Notes   │    │  payload)   │  │
//! │       ▲          └───────────────┘    └──────────┘    └──────┬──────┘  │
//! │       │                                                       │         │
//! │       │           ┌───────────────┐                           ▼         │
//! │       └───────────│ clear()       │◄──────────── Bill Store (remote)    │
//! │                   └───────────────┘                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Invariant
//! After every successful mutation, each line's quantity is between 1 and the
//! stock count of its product snapshot. A rejected mutation leaves the draft
//! exactly as it was.
//!
//! ## Totals
//! ```text
//! subtotal        = Σ(line.total_price)
//! discount_amount = subtotal × discount / 100
//! taxable_amount  = subtotal − discount_amount
//! tax             = taxable_amount × tax_rate / 100
//! total           = taxable_amount + tax
//! item_count      = Σ(line.quantity)
//! ```
//! Discount is always applied before tax.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Percent};
use crate::types::{Bill, BillPayload, BillStatus, Customer, LineItem, Product};
use crate::validation;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

// =============================================================================
// Totals
// =============================================================================

/// Derived figures for a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub taxable_amount: Money,
    pub tax: Money,
    pub total: Money,
    pub item_count: i64,
}

impl BillTotals {
    /// The same figures settled at two decimal places.
    ///
    /// Each figure is rounded on its own from the exact value, so the rounded
    /// parts may differ from the rounded total by one minor unit.
    pub fn rounded(&self) -> BillTotals {
        BillTotals {
            subtotal: self.subtotal.rounded(),
            discount_amount: self.discount_amount.rounded(),
            taxable_amount: self.taxable_amount.rounded(),
            tax: self.tax.rounded(),
            total: self.total.rounded(),
            item_count: self.item_count,
        }
    }
}

/// Computes bill totals. Pure: the same lines and rates always give the same result.
///
/// ## Example
/// ```rust
/// use nexus_core::bill::compute_totals;
/// use nexus_core::money::{Money, Percent};
/// use nexus_core::types::{LineItem, Product};
///
/// let oil = LineItem::new(Product::new("p2", "Engine Oil", Money::from_cents(2850), 10));
/// let totals = compute_totals(&[oil], Percent::zero(), Percent::zero());
/// assert_eq!(totals.total, Money::from_cents(2850));
/// ```
pub fn compute_totals(lines: &[LineItem], discount: Percent, tax_rate: Percent) -> BillTotals {
    let subtotal: Money = lines.iter().map(|line| line.total_price).sum();
    let discount_amount = subtotal.percent_of(discount);
    let taxable_amount = subtotal - discount_amount;
    let tax = taxable_amount.percent_of(tax_rate);

    BillTotals {
        subtotal,
        discount_amount,
        taxable_amount,
        tax,
        total: taxable_amount + tax,
        item_count: lines.iter().map(|line| line.quantity).sum(),
    }
}

// =============================================================================
// Stock Reconciliation
// =============================================================================

/// What happened to one line when fresh stock was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum StockAdjustment {
    /// Quantity lowered to the fresh stock count.
    Clamped {
        product_id: String,
        name: String,
        from: i64,
        to: i64,
    },
    /// Line dropped because the product has no stock left.
    Removed { product_id: String, name: String },
}

impl std::fmt::Display for StockAdjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockAdjustment::Clamped { name, from, to, .. } => {
                write!(f, "{name}: quantity reduced from {from} to {to}")
            }
            StockAdjustment::Removed { name, .. } => {
                write!(f, "{name}: removed, now out of stock")
            }
        }
    }
}

// =============================================================================
// Bill Draft
// =============================================================================

/// The bill being assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDraft {
    /// Client-side identity of this draft (for logs; never sent to the store).
    pub draft_id: Uuid,
    lines: Vec<LineItem>,
    customer: Customer,
    tax_rate: Percent,
    discount: Percent,
    notes: String,
}

impl Default for BillDraft {
    fn default() -> Self {
        BillDraft::new(Percent::zero())
    }
}

impl BillDraft {
    /// Creates an empty draft with the given tax rate.
    pub fn new(tax_rate: Percent) -> Self {
        BillDraft {
            draft_id: Uuid::new_v4(),
            lines: Vec::new(),
            customer: Customer::default(),
            tax_rate,
            discount: Percent::zero(),
            notes: String::new(),
        }
    }

    /// Loads a persisted bill for editing.
    pub fn from_bill(bill: &Bill) -> Self {
        BillDraft {
            draft_id: Uuid::new_v4(),
            lines: bill.items.clone(),
            customer: bill.customer.clone(),
            tax_rate: bill.tax_rate,
            discount: bill.discount,
            notes: bill.notes.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn tax_rate(&self) -> Percent {
        self.tax_rate
    }

    pub fn discount(&self) -> Percent {
        self.discount
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Totals for the current lines, discount and tax rate.
    pub fn totals(&self) -> BillTotals {
        compute_totals(&self.lines, self.discount, self.tax_rate)
    }

    // -------------------------------------------------------------------------
    // Line Mutations
    // -------------------------------------------------------------------------

    /// Adds one unit of `product`.
    ///
    /// ## Rules
    /// - Stock ≤ 0 → [`CoreError::StockExhausted`]
    /// - Already on the bill → quantity + 1, unless that passes
    ///   [`MAX_ITEM_QUANTITY`] or stock ([`CoreError::StockLimitReached`])
    /// - New product → appended with quantity 1
    ///
    /// The product snapshot (and so the stock ceiling) is refreshed from the
    /// argument; the unit price of an existing line stays frozen.
    ///
    /// ## Returns
    /// The line's new quantity.
    pub fn add_item(&mut self, product: &Product) -> CoreResult<i64> {
        if product.stock <= 0 {
            return Err(CoreError::StockExhausted {
                product_id: product.id.clone(),
                name: product.name.clone(),
            });
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product.id)
        {
            let next = line.quantity + 1;
            validation::validate_quantity(next)?;
            if next > product.stock {
                return Err(CoreError::StockLimitReached {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    stock: product.stock,
                });
            }
            line.product = product.clone();
            line.set_quantity(next);
            return Ok(next);
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(LineItem::new(product.clone()));
        Ok(1)
    }

    /// Sets the quantity of a line.
    ///
    /// ## Rules
    /// - `quantity ≤ 0` → the line is removed
    /// - Product not on the bill → nothing happens
    /// - `quantity` above [`MAX_ITEM_QUANTITY`] → [`CoreError::Validation`]
    /// - `quantity` above the snapshot's stock → [`CoreError::InsufficientStock`],
    ///   line unchanged
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_item(product_id);
            return Ok(());
        }

        let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
        else {
            return Ok(());
        };

        validation::validate_quantity(quantity)?;
        if quantity > line.product.stock {
            return Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                name: line.product.name.clone(),
                available: line.product.stock,
                requested: quantity,
            });
        }

        line.set_quantity(quantity);
        Ok(())
    }

    /// Removes a line. Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product.id != product_id);
        self.lines.len() != before
    }

    /// Applies a fresh catalog listing to the lines.
    ///
    /// Lines above fresh stock are clamped, lines with no fresh stock are
    /// removed, and every matched snapshot is replaced (unit prices stay
    /// frozen). Products missing from `fresh` are left alone.
    pub fn reconcile_stock(&mut self, fresh: &[Product]) -> Vec<StockAdjustment> {
        let mut adjustments = Vec::new();

        self.lines.retain_mut(|line| {
            let Some(product) = fresh.iter().find(|p| p.id == line.product.id) else {
                return true;
            };

            line.product = product.clone();

            if product.stock <= 0 {
                adjustments.push(StockAdjustment::Removed {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                });
                return false;
            }

            if line.quantity > product.stock {
                adjustments.push(StockAdjustment::Clamped {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    from: line.quantity,
                    to: product.stock,
                });
                line.set_quantity(product.stock);
            }

            true
        });

        adjustments
    }

    // -------------------------------------------------------------------------
    // Bill Fields
    // -------------------------------------------------------------------------

    pub fn set_customer(&mut self, customer: Customer) {
        self.customer = customer;
    }

    pub fn set_tax_rate(&mut self, tax_rate: Percent) {
        self.tax_rate = tax_rate;
    }

    pub fn set_discount(&mut self, discount: Percent) {
        self.discount = discount;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Empties the draft. The tax rate is kept.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.customer = Customer::default();
        self.discount = Percent::zero();
        self.notes.clear();
        self.draft_id = Uuid::new_v4();
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Checks the draft can be sent.
    ///
    /// Order: items first, then customer name, then phone. Email is only
    /// checked when given.
    pub fn validate_for_submit(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(ValidationError::Empty {
                field: "items".to_string(),
            }
            .into());
        }
        validation::validate_customer_name(&self.customer.name)?;
        validation::validate_phone(&self.customer.phone)?;
        validation::validate_email(&self.customer.email)?;
        Ok(())
    }

    /// Builds the wire payload without validating.
    pub fn payload(&self, status: BillStatus) -> BillPayload {
        BillPayload {
            customer: Customer {
                name: self.customer.name.trim().to_string(),
                phone: self.customer.phone.trim().to_string(),
                email: self.customer.email.trim().to_string(),
                address: self.customer.address.trim().to_string(),
            },
            items: self.lines.clone(),
            tax_rate: self.tax_rate,
            discount: self.discount,
            notes: self.notes.clone(),
            status,
        }
    }

    /// Validates and builds the payload to send with `status`.
    ///
    /// A draft cannot be submitted as Cancelled; cancelling is an update of
    /// an existing bill (see [`BillDraft::submit_update`]).
    pub fn submit(&self, status: BillStatus) -> CoreResult<BillPayload> {
        self.submit_from(BillStatus::Draft, status)
    }

    /// Same as [`BillDraft::submit`], for a bill currently stored as `current`.
    pub fn submit_update(&self, current: BillStatus, status: BillStatus) -> CoreResult<BillPayload> {
        self.submit_from(current, status)
    }

    fn submit_from(&self, current: BillStatus, status: BillStatus) -> CoreResult<BillPayload> {
        self.validate_for_submit()?;

        let allowed = match current {
            BillStatus::Draft => status != BillStatus::Cancelled,
            _ => current.can_transition_to(status),
        };
        if !allowed {
            return Err(CoreError::InvalidStatusTransition {
                from: current.to_string(),
                to: status.to_string(),
            });
        }

        Ok(self.payload(status))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn brake_pads() -> Product {
        Product::new("p1", "Brake Pads", Money::from_cents(4599), 4)
    }

    fn engine_oil() -> Product {
        Product::new("p2", "Engine Oil", Money::from_cents(2850), 10)
    }

    fn sample_draft() -> BillDraft {
        let mut draft = BillDraft::default();
        draft.add_item(&brake_pads()).unwrap();
        draft.add_item(&brake_pads()).unwrap();
        draft.add_item(&engine_oil()).unwrap();
        draft
    }

    fn ready_draft() -> BillDraft {
        let mut draft = sample_draft();
        draft.set_customer(Customer::new("Nimal Perera", "0771234567"));
        draft
    }

    #[test]
    fn test_totals_without_rates() {
        let totals = sample_draft().totals();

        assert_eq!(totals.subtotal.amount(), dec!(120.48));
        assert_eq!(totals.discount_amount, Money::zero());
        assert_eq!(totals.tax, Money::zero());
        assert_eq!(totals.total.amount(), dec!(120.48));
        assert_eq!(totals.item_count, 3);
    }

    #[test]
    fn test_totals_discount_before_tax() {
        let mut draft = sample_draft();
        draft.set_discount(Percent::from_whole(10));
        draft.set_tax_rate(Percent::from_whole(5));

        let totals = draft.totals();
        assert_eq!(totals.discount_amount.amount(), dec!(12.048));
        assert_eq!(totals.taxable_amount.amount(), dec!(108.432));
        assert_eq!(totals.tax.amount(), dec!(5.4216));
        assert_eq!(totals.total.amount(), dec!(113.8536));

        let rounded = totals.rounded();
        assert_eq!(rounded.discount_amount.amount(), dec!(12.05));
        assert_eq!(rounded.taxable_amount.amount(), dec!(108.43));
        assert_eq!(rounded.tax.amount(), dec!(5.42));
        assert_eq!(rounded.total.amount(), dec!(113.85));
    }

    #[test]
    fn test_compute_totals_is_idempotent() {
        let draft = sample_draft();
        let discount = Percent::from_whole(15);
        let tax = Percent::new(dec!(8.25)).unwrap();

        let first = compute_totals(draft.lines(), discount, tax);
        let second = compute_totals(draft.lines(), discount, tax);
        assert_eq!(first, second);
    }

    #[test]
    fn test_subtotal_is_sum_of_line_totals() {
        let mut draft = sample_draft();
        draft.update_quantity("p2", 7).unwrap();

        let sum: Money = draft.lines().iter().map(|l| l.total_price).sum();
        assert_eq!(draft.totals().subtotal, sum);
        for line in draft.lines() {
            assert_eq!(line.total_price, line.unit_price * line.quantity);
        }
    }

    #[test]
    fn test_add_out_of_stock_is_rejected() {
        let mut draft = sample_draft();
        let before = draft.clone();
        let empty = Product::new("p3", "Air Filter", Money::from_cents(1200), 0);

        let err = draft.add_item(&empty).unwrap_err();
        assert!(matches!(err, CoreError::StockExhausted { .. }));
        assert_eq!(err.to_string(), "Air Filter is out of stock");
        assert_eq!(draft, before);
    }

    #[test]
    fn test_add_past_stock_limit() {
        let mut draft = BillDraft::default();
        let pads = brake_pads();
        for expected in 1..=4 {
            assert_eq!(draft.add_item(&pads).unwrap(), expected);
        }

        let err = draft.add_item(&pads).unwrap_err();
        assert!(matches!(err, CoreError::StockLimitReached { stock: 4, .. }));
        assert_eq!(draft.line("p1").unwrap().quantity, 4);
    }

    #[test]
    fn test_add_keeps_unit_price_frozen() {
        let mut draft = BillDraft::default();
        draft.add_item(&brake_pads()).unwrap();

        let mut repriced = brake_pads();
        repriced.price = Money::from_cents(5999);
        repriced.stock = 9;
        draft.add_item(&repriced).unwrap();

        let line = draft.line("p1").unwrap();
        assert_eq!(line.unit_price, Money::from_cents(4599));
        assert_eq!(line.product.stock, 9);
        assert_eq!(line.total_price, Money::from_cents(9198));
    }

    #[test]
    fn test_update_quantity_rules() {
        let mut draft = sample_draft();

        draft.update_quantity("p1", 3).unwrap();
        assert_eq!(draft.line("p1").unwrap().quantity, 3);

        let err = draft.update_quantity("p1", 5).unwrap_err();
        assert_eq!(err.to_string(), "Cannot exceed stock limit of 4 for Brake Pads");
        assert_eq!(draft.line("p1").unwrap().quantity, 3);

        draft.update_quantity("missing", 2).unwrap();
        assert_eq!(draft.lines().len(), 2);

        draft.update_quantity("p1", 0).unwrap();
        assert!(draft.line("p1").is_none());
    }

    #[test]
    fn test_quantity_is_capped_per_line() {
        let spark_plug = Product::new("p9", "Spark Plug", Money::from_cents(500), 5000);
        let mut draft = BillDraft::default();
        draft.add_item(&spark_plug).unwrap();

        let err = draft.update_quantity("p9", MAX_ITEM_QUANTITY + 1).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(draft.line("p9").unwrap().quantity, 1);

        draft.update_quantity("p9", MAX_ITEM_QUANTITY).unwrap();
        let err = draft.add_item(&spark_plug).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(draft.line("p9").unwrap().quantity, MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_remove_item() {
        let mut draft = sample_draft();
        assert!(draft.remove_item("p2"));
        assert!(!draft.remove_item("p2"));
        assert_eq!(draft.lines().len(), 1);
    }

    #[test]
    fn test_stock_invariant_over_mixed_operations() {
        let products = [
            brake_pads(),
            engine_oil(),
            Product::new("p3", "Spark Plug", Money::from_cents(650), 2),
            Product::new("p4", "Wiper", Money::from_cents(1100), 0),
        ];
        let mut draft = BillDraft::default();

        // Deterministic pseudo-random walk over add/update/remove.
        let mut seed: u64 = 42;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let product = &products[(seed >> 33) as usize % products.len()];
            match (seed >> 20) % 3 {
                0 => {
                    let _ = draft.add_item(product);
                }
                1 => {
                    let qty = ((seed >> 40) % 14) as i64 - 2;
                    let _ = draft.update_quantity(&product.id, qty);
                }
                _ => {
                    draft.remove_item(&product.id);
                }
            }

            for line in draft.lines() {
                assert!(line.quantity >= 1);
                assert!(line.quantity <= line.product.stock);
            }
        }
    }

    #[test]
    fn test_reconcile_stock() {
        let mut draft = BillDraft::default();
        for _ in 0..4 {
            draft.add_item(&brake_pads()).unwrap();
        }
        draft.add_item(&engine_oil()).unwrap();
        draft
            .add_item(&Product::new("p9", "Fuse", Money::from_cents(100), 5))
            .unwrap();

        let mut pads = brake_pads();
        pads.stock = 2;
        let mut oil = engine_oil();
        oil.stock = 0;

        let adjustments = draft.reconcile_stock(&[pads, oil]);

        assert_eq!(adjustments.len(), 2);
        assert_eq!(draft.line("p1").unwrap().quantity, 2);
        assert!(draft.line("p2").is_none());
        assert_eq!(draft.line("p9").unwrap().quantity, 1);
        assert!(matches!(
            adjustments[0],
            StockAdjustment::Clamped { from: 4, to: 2, .. }
        ));
    }

    #[test]
    fn test_clear_keeps_tax_rate() {
        let mut draft = ready_draft();
        draft.set_tax_rate(Percent::from_whole(5));
        draft.set_discount(Percent::from_whole(10));
        draft.set_notes("deliver friday");

        draft.clear();

        assert!(draft.is_empty());
        assert_eq!(draft.customer(), &Customer::default());
        assert!(draft.discount().is_zero());
        assert_eq!(draft.notes(), "");
        assert_eq!(draft.tax_rate(), Percent::from_whole(5));
    }

    #[test]
    fn test_validation_order() {
        let mut draft = BillDraft::default();
        let err = draft.validate_for_submit().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Empty { .. })
        ));

        draft.add_item(&engine_oil()).unwrap();
        let err = draft.validate_for_submit().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: customer name is required");

        draft.set_customer(Customer::new("Nimal", ""));
        let err = draft.validate_for_submit().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: customer phone is required");
    }

    #[test]
    fn test_submit_builds_payload() {
        let mut draft = ready_draft();
        draft.set_tax_rate(Percent::from_whole(5));
        draft.set_discount(Percent::from_whole(10));

        let payload = draft.submit(BillStatus::Pending).unwrap();
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.status, BillStatus::Pending);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["taxRate"], serde_json::json!(5.0));
        assert_eq!(json["discount"], serde_json::json!(10.0));
        assert_eq!(json["customer"]["name"], "Nimal Perera");
        assert!(json.get("draftId").is_none());
    }

    #[test]
    fn test_submit_status_rules() {
        let draft = ready_draft();
        assert!(matches!(
            draft.submit(BillStatus::Cancelled),
            Err(CoreError::InvalidStatusTransition { .. })
        ));
        assert!(draft
            .submit_update(BillStatus::Pending, BillStatus::Cancelled)
            .is_ok());
        assert!(draft
            .submit_update(BillStatus::Paid, BillStatus::Pending)
            .is_err());
    }

    #[test]
    fn test_from_bill_round_trip() {
        let mut draft = ready_draft();
        draft.set_notes("front pads only");
        let payload = draft.payload(BillStatus::Draft);

        let bill = Bill {
            id: Some("b1".to_string()),
            bill_number: "BILL-0007".to_string(),
            customer: payload.customer.clone(),
            items: payload.items.clone(),
            subtotal: draft.totals().subtotal,
            tax: Money::zero(),
            tax_rate: payload.tax_rate,
            discount: payload.discount,
            discount_amount: Money::zero(),
            total: draft.totals().total,
            status: BillStatus::Draft,
            created_at: None,
            notes: payload.notes.clone(),
            pdf_path: None,
            pdf_generated: false,
        };

        let loaded = BillDraft::from_bill(&bill);
        assert_eq!(loaded.lines(), draft.lines());
        assert_eq!(loaded.customer(), draft.customer());
        assert_eq!(loaded.notes(), "front pads only");
    }
}
