//! # Terminal Output
//!
//! Plain-text tables for the CLI.
//!
//! ```text
//! CURRENT BILL                                  3 items
//! ──────────────────────────────────────────────────────
//! p-brake   Brake Pads              2 ×  45.99    91.98
//! p-oil     Engine Oil              1 ×  28.50    28.50
//! ──────────────────────────────────────────────────────
//! Subtotal                                 120.48 LKR
//! TOTAL                                    120.48 LKR
//! ```

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};

use nexus_core::{Bill, Brand, Category, Page, Product, StockAdjustment};

use crate::state::{BillingSession, NoticeBoard, NoticeKind};

const WIDTH: usize = 54;

/// Runs `write` against a fresh buffer. Writes into a `String` never fail.
fn build(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    match write(&mut out) {
        Ok(()) => out,
        Err(fmt::Error) => String::new(),
    }
}

fn rule(out: &mut String) -> fmt::Result {
    writeln!(out, "{}", "─".repeat(WIDTH))
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return format!("{:<width$}", text, width = width);
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn total_row(out: &mut String, label: &str, value: &str) -> fmt::Result {
    let pad = WIDTH.saturating_sub(label.chars().count() + value.chars().count());
    writeln!(out, "{}{}{}", label, " ".repeat(pad), value)
}

pub fn render_products(page: &Page<Product>, currency: &str) -> String {
    build(|out| {
        if page.items.is_empty() {
            return writeln!(out, "No products found");
        }

        for product in &page.items {
            writeln!(
                out,
                "{} {} {:>12} {:>5} {}",
                fit(&product.id, 10),
                fit(&product.name, 28),
                product.price.format_with(currency),
                product.stock,
                product.status
            )?;
        }
        writeln!(
            out,
            "Page {} of {} ({} products)",
            page.current, page.pages, page.total
        )
    })
}

pub fn render_categories(categories: &[Category]) -> String {
    build(|out| {
        for category in categories {
            writeln!(out, "{} {}", fit(&category.id, 10), category.name)?;
            for sub in &category.subcategories {
                writeln!(out, "{}   └ {}", " ".repeat(10), sub.name)?;
            }
        }
        Ok(())
    })
}

pub fn render_brands(brands: &[Brand]) -> String {
    build(|out| {
        for brand in brands {
            writeln!(out, "{} {} {}", fit(&brand.id, 10), fit(&brand.name, 24), brand.website)?;
        }
        Ok(())
    })
}

/// The draft: lines, customer and totals.
pub fn render_cart(session: &BillingSession, currency: &str) -> String {
    let draft = session.draft();
    let totals = draft.totals().rounded();

    build(|out| {
        let heading = match session.editing() {
            Some(target) => format!("EDIT BILL {} ({})", target.bill_id, target.status),
            None => "CURRENT BILL".to_string(),
        };
        total_row(out, &heading, &format!("{} items", totals.item_count))?;
        rule(out)?;

        if draft.is_empty() {
            writeln!(out, "No items added yet")?;
        }
        for line in draft.lines() {
            writeln!(
                out,
                "{} {} {:>3} × {:>8} {:>10}",
                fit(line.product_id(), 9),
                fit(&line.product.name, 20),
                line.quantity,
                line.unit_price.rounded(),
                line.total_price.rounded()
            )?;
        }
        rule(out)?;

        let customer = draft.customer();
        if !customer.name.is_empty() || !customer.phone.is_empty() {
            writeln!(out, "Customer: {} {}", customer.name, customer.phone)?;
        }

        total_row(out, "Subtotal", &totals.subtotal.format_with(currency))?;
        if !draft.discount().is_zero() {
            total_row(
                out,
                &format!("Discount ({})", draft.discount()),
                &format!("-{}", totals.discount_amount.format_with(currency)),
            )?;
        }
        if !draft.tax_rate().is_zero() {
            total_row(
                out,
                &format!("Tax ({})", draft.tax_rate()),
                &totals.tax.format_with(currency),
            )?;
        }
        total_row(out, "TOTAL", &totals.total.format_with(currency))?;

        if !draft.notes().is_empty() {
            writeln!(out, "Notes: {}", draft.notes())?;
        }
        Ok(())
    })
}

pub fn render_bills(bills: &[Bill], currency: &str) -> String {
    build(|out| {
        if bills.is_empty() {
            return writeln!(out, "No bills yet");
        }

        for bill in bills {
            let created = bill
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            writeln!(
                out,
                "{} {} {} {:>14} {:<9} {}",
                fit(bill.id.as_deref().unwrap_or(""), 24),
                fit(&bill.bill_number, 12),
                fit(&bill.customer.name, 18),
                bill.total.rounded().format_with(currency),
                bill.status,
                created
            )?;
        }
        Ok(())
    })
}

pub fn render_adjustments(adjustments: &[StockAdjustment]) -> String {
    adjustments
        .iter()
        .map(|a| format!("{}\n", a))
        .collect()
}

/// Live notices, prefixed with ✗ (error) or ✓ (success).
pub fn render_notices(board: &NoticeBoard, now: DateTime<Utc>) -> String {
    board
        .active(now)
        .into_iter()
        .map(|notice| {
            let mark = match notice.kind {
                NoticeKind::Error => '✗',
                NoticeKind::Success => '✓',
            };
            format!("{} {}\n", mark, notice.message)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{brake_pads, engine_oil};
    use nexus_core::{Customer, Percent};

    #[test]
    fn test_cart_shows_lines_and_totals() {
        let mut session = BillingSession::default();
        let draft = session.draft_mut();
        draft.add_item(&brake_pads(5)).unwrap();
        draft.add_item(&brake_pads(5)).unwrap();
        draft.add_item(&engine_oil(5)).unwrap();
        draft.set_customer(Customer::new("Nimal Perera", "0771234567"));
        draft.set_discount(Percent::from_whole(10));
        draft.set_tax_rate(Percent::from_whole(5));

        let text = render_cart(&session, "LKR");
        assert!(text.starts_with("CURRENT BILL"));
        assert!(text.contains("3 items"));
        assert!(text.contains("91.98"));
        assert!(text.contains("Customer: Nimal Perera 0771234567"));
        assert!(text.contains("Discount (10%)"));
        assert!(text.contains("-12.05 LKR"));
        assert!(text.contains("Tax (5%)"));
        assert!(text.contains("5.42 LKR"));
        assert!(text.contains("113.85 LKR"));
    }

    #[test]
    fn test_empty_cart() {
        let text = render_cart(&BillingSession::default(), "LKR");
        assert!(text.contains("No items added yet"));
        assert!(text.contains("0.00 LKR"));
        assert!(!text.contains("Discount"));
    }

    #[test]
    fn test_fit_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdefgh", 5), "abcd…");
    }

    #[test]
    fn test_notices_rendered_with_marks() {
        let mut board = NoticeBoard::default();
        let now = Utc::now();
        board.post(NoticeKind::Error, "Brake Pads is out of stock", now);
        board.post(NoticeKind::Success, "Engine Oil added to bill", now);

        let text = render_notices(&board, now);
        assert_eq!(
            text,
            "✗ Brake Pads is out of stock\n✓ Engine Oil added to bill\n"
        );
    }
}
