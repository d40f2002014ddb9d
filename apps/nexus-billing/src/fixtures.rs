//! Test fixtures shared by the session and command tests.

use nexus_core::{compute_totals, Bill, BillPayload, Money, Product};

pub fn brake_pads(stock: i64) -> Product {
    Product::new("p-brake", "Brake Pads", Money::from_cents(4599), stock)
}

pub fn engine_oil(stock: i64) -> Product {
    Product::new("p-oil", "Engine Oil", Money::from_cents(2850), stock)
}

/// The bill a store would return for `payload`.
pub fn stored_bill(id: &str, payload: &BillPayload) -> Bill {
    let totals = compute_totals(&payload.items, payload.discount, payload.tax_rate);
    Bill {
        id: Some(id.to_string()),
        bill_number: format!("BILL-{}", id.to_uppercase()),
        customer: payload.customer.clone(),
        items: payload.items.clone(),
        subtotal: totals.subtotal,
        tax: totals.tax,
        tax_rate: payload.tax_rate,
        discount: payload.discount,
        discount_amount: totals.discount_amount,
        total: totals.total,
        status: payload.status,
        created_at: None,
        notes: payload.notes.clone(),
        pdf_path: None,
        pdf_generated: false,
    }
}
