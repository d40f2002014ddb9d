//! # Receipt Rendering
//!
//! Plain-text, printer-friendly rendering of a bill.
//!
//! ```text
//! ==========================================
//!                 AutoNexus
//!   Premium Automotive Parts & Solutions
//! ==========================================
//! Bill:     BILL-0001
//! Date:     2024-03-01 10:00
//! Status:   Pending
//! ------------------------------------------
//! Customer: Nimal Perera
//! Phone:    0771234567
//! ------------------------------------------
//! Item                 Qty     Unit    Total
//! Brake Pads             2    45.99    91.98
//! ...
//! ```
//!
//! Figures are recomputed from the lines with [`compute_totals`] and settled
//! at two decimal places.

use std::fmt;

use crate::bill::compute_totals;
use crate::money::Money;
use crate::types::Bill;

/// Receipt width in characters.
pub const RECEIPT_WIDTH: usize = 42;

const TAGLINE: &str = "Premium Automotive Parts & Solutions";
const NAME_WIDTH: usize = 18;

fn centered(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let len = text.chars().count();
    let pad = RECEIPT_WIDTH.saturating_sub(len) / 2;
    writeln!(f, "{}{}", " ".repeat(pad), text)
}

fn rule(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    writeln!(f, "{}", c.to_string().repeat(RECEIPT_WIDTH))
}

fn amount_row(f: &mut fmt::Formatter<'_>, label: &str, amount: Money, currency: &str) -> fmt::Result {
    let value = amount.format_with(currency);
    let pad = RECEIPT_WIDTH.saturating_sub(label.chars().count() + value.chars().count());
    writeln!(f, "{}{}{}", label, " ".repeat(pad), value)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// A bill laid out for printing. `Display` writes the full receipt.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'a> {
    pub bill: &'a Bill,
    pub store_name: &'a str,
    pub currency: &'a str,
}

impl fmt::Display for Receipt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bill = self.bill;
        let currency = self.currency;
        let totals = compute_totals(&bill.items, bill.discount, bill.tax_rate).rounded();

        // Header
        rule(f, '=')?;
        centered(f, self.store_name)?;
        centered(f, TAGLINE)?;
        rule(f, '=')?;

        writeln!(f, "Bill:     {}", bill.label())?;
        if let Some(created) = bill.created_at {
            writeln!(f, "Date:     {}", created.format("%Y-%m-%d %H:%M"))?;
        }
        writeln!(f, "Status:   {}", bill.status)?;
        rule(f, '-')?;

        // Customer
        writeln!(f, "Customer: {}", bill.customer.name)?;
        writeln!(f, "Phone:    {}", bill.customer.phone)?;
        if !bill.customer.email.trim().is_empty() {
            writeln!(f, "Email:    {}", bill.customer.email)?;
        }
        if !bill.customer.address.trim().is_empty() {
            writeln!(f, "Address:  {}", bill.customer.address)?;
        }
        rule(f, '-')?;

        // Lines
        writeln!(
            f,
            "{:<name$} {:>4} {:>8} {:>9}",
            "Item",
            "Qty",
            "Unit",
            "Total",
            name = NAME_WIDTH
        )?;
        for line in &bill.items {
            writeln!(
                f,
                "{:<name$} {:>4} {:>8} {:>9}",
                truncate(&line.product.name, NAME_WIDTH),
                line.quantity,
                line.unit_price.to_string(),
                line.total_price.to_string(),
                name = NAME_WIDTH
            )?;
        }
        rule(f, '-')?;

        // Totals
        amount_row(f, "Subtotal", totals.subtotal, currency)?;
        if !bill.discount.is_zero() {
            amount_row(
                f,
                &format!("Discount ({})", bill.discount),
                Money::zero() - totals.discount_amount,
                currency,
            )?;
        }
        amount_row(f, &format!("Tax ({})", bill.tax_rate), totals.tax, currency)?;
        rule(f, '=')?;
        amount_row(f, "TOTAL", totals.total, currency)?;
        rule(f, '=')?;

        if !bill.notes.trim().is_empty() {
            writeln!(f, "Notes: {}", bill.notes.trim())?;
            rule(f, '-')?;
        }

        centered(f, "Thank you for your business!")?;
        centered(f, "Computer-generated bill, no signature required.")
    }
}

/// Renders `bill` as plain text.
pub fn render_receipt(bill: &Bill, store_name: &str, currency: &str) -> String {
    Receipt {
        bill,
        store_name,
        currency,
    }
    .to_string()
}
