//! # Bill Commands
//!
//! Customer details, rates and notes on the draft, plus everything that
//! talks to the bill store: save, list, edit, delete, PDF and receipt.
//!
//! ## Save Variants
//! ```text
//! ┌──────────────┬─────────────────┬──────────────────────────────────────┐
//! │ Command      │ Status sent     │ Notes                                │
//! ├──────────────┼─────────────────┼──────────────────────────────────────┤
//! │ bill save    │ Draft           │ keeps the bill editable              │
//! │ bill generate│ Pending         │ bill issued, awaiting payment        │
//! │ bill pay     │ Paid            │ payment confirmed                    │
//! └──────────────┴─────────────────┴──────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use nexus_api::{BillStore, BILL_LIST_LIMIT};
use nexus_core::receipt::render_receipt;
use nexus_core::validation::{validate_customer_name, validate_email, validate_phone};
use nexus_core::{Bill, BillStatus, Customer, Percent};

use crate::error::{CommandError, CommandResult};
use crate::state::BillingSession;

// =============================================================================
// Draft Fields
// =============================================================================

/// Sets the customer on the draft.
///
/// Fields are checked here so mistakes show up before the bill is saved.
pub fn set_customer(session: &mut BillingSession, customer: Customer) -> CommandResult<()> {
    debug!(name = %customer.name, "set_customer command");

    let checked = validate_customer_name(&customer.name)
        .and_then(|_| validate_phone(&customer.phone))
        .and_then(|_| validate_email(&customer.email))
        .map_err(CommandError::from);
    session.report(checked)?;

    session.draft_mut().set_customer(customer);
    session.notify_success("Customer details updated");
    Ok(())
}

/// Changes the tax rate and/or discount. `None` leaves a value as it is.
pub fn set_rates(
    session: &mut BillingSession,
    tax_rate: Option<Percent>,
    discount: Option<Percent>,
) {
    debug!(?tax_rate, ?discount, "set_rates command");

    let draft = session.draft_mut();
    if let Some(rate) = tax_rate {
        draft.set_tax_rate(rate);
    }
    if let Some(discount) = discount {
        draft.set_discount(discount);
    }
    let message = format!(
        "Discount {} and tax {} applied",
        draft.discount(),
        draft.tax_rate()
    );
    session.notify_success(message);
}

pub fn set_notes(session: &mut BillingSession, notes: &str) {
    debug!(len = notes.len(), "set_notes command");
    session.draft_mut().set_notes(notes);
}

// =============================================================================
// Bill Store
// =============================================================================

/// Saves the draft with `status` (create, or update when editing).
pub async fn save_bill(
    session: &mut BillingSession,
    store: &dyn BillStore,
    status: BillStatus,
) -> CommandResult<Bill> {
    debug!(%status, editing = session.editing().is_some(), "save_bill command");
    session.save(store, status).await
}

/// Most recent bills, newest first as returned by the store.
pub async fn list_bills(
    session: &mut BillingSession,
    store: &dyn BillStore,
) -> CommandResult<Vec<Bill>> {
    debug!("list_bills command");

    let result = store
        .list_bills(BILL_LIST_LIMIT)
        .await
        .map_err(|e| CommandError::from(e).context("Failed to fetch bills"));
    session.report(result)
}

pub async fn show_bill(
    session: &mut BillingSession,
    store: &dyn BillStore,
    bill_id: &str,
) -> CommandResult<Bill> {
    debug!(bill_id = %bill_id, "show_bill command");

    let result = store
        .get_bill(bill_id)
        .await
        .map_err(|e| CommandError::from(e).context("Failed to fetch bill"));
    session.report(result)
}

pub async fn edit_bill(
    session: &mut BillingSession,
    store: &dyn BillStore,
    bill_id: &str,
) -> CommandResult<Bill> {
    debug!(bill_id = %bill_id, "edit_bill command");
    session.edit(store, bill_id).await
}

pub async fn delete_bill(
    session: &mut BillingSession,
    store: &dyn BillStore,
    bill_id: &str,
) -> CommandResult<()> {
    debug!(bill_id = %bill_id, "delete_bill command");
    session.delete(store, bill_id).await
}

/// Renders the bill to PDF and writes it to `out`.
///
/// Without `out` the file is named after the bill number when the session
/// knows it, else after the id, in the current directory.
pub async fn download_pdf(
    session: &mut BillingSession,
    store: &dyn BillStore,
    bill_id: &str,
    out: Option<&Path>,
) -> CommandResult<PathBuf> {
    debug!(bill_id = %bill_id, "download_pdf command");

    let bytes = session.generate_pdf(store, bill_id).await?;
    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_pdf_name(session, bill_id));

    let written = std::fs::write(&path, &bytes).map_err(|e| {
        CommandError::from(e).context(&format!("Failed to write {}", path.display()))
    });
    session.report(written)?;

    session.notify_success(format!("PDF saved to {}", path.display()));
    info!(bill_id = %bill_id, path = ?path, bytes = bytes.len(), "PDF written");
    Ok(path)
}

/// `<bill number>.pdf` in the working directory, or `<id>.pdf` when the
/// number is unknown or has nothing usable in it.
fn default_pdf_name(session: &BillingSession, bill_id: &str) -> PathBuf {
    let stem = session
        .last_bill()
        .filter(|bill| bill.id.as_deref() == Some(bill_id))
        .map(|bill| file_stem(&bill.bill_number))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| file_stem(bill_id));
    let stem = if stem.is_empty() { "bill".to_string() } else { stem };
    PathBuf::from(format!("{}.pdf", stem))
}

/// Keeps letters, digits, `-` and `_`; anything else becomes `_`. Leading
/// and trailing `_` are dropped, so the result never names a directory.
fn file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

/// Fetches a bill and renders it as a plain-text receipt.
pub async fn print_receipt(
    session: &mut BillingSession,
    store: &dyn BillStore,
    bill_id: &str,
    store_name: &str,
    currency: &str,
) -> CommandResult<String> {
    let bill = show_bill(session, store, bill_id).await?;
    Ok(render_receipt(&bill, store_name, currency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::fixtures::{brake_pads, engine_oil, stored_bill};
    use chrono::Utc;
    use mockall::predicate::eq;
    use nexus_api::MockBillStore;
    use rust_decimal_macros::dec;

    fn session_with_items() -> BillingSession {
        let mut session = BillingSession::default();
        let draft = session.draft_mut();
        draft.add_item(&brake_pads(10)).unwrap();
        draft.add_item(&brake_pads(10)).unwrap();
        draft.add_item(&engine_oil(10)).unwrap();
        session
    }

    #[test]
    fn test_set_customer_rejects_bad_phone() {
        let mut session = BillingSession::default();
        let err = set_customer(&mut session, Customer::new("Nimal", "call me")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(session.draft().customer().name.is_empty());
    }

    #[test]
    fn test_set_rates_updates_totals() {
        let mut session = session_with_items();
        set_rates(
            &mut session,
            Some(Percent::from_whole(5)),
            Some(Percent::from_whole(10)),
        );

        let totals = session.draft().totals();
        assert_eq!(totals.discount_amount.amount(), dec!(12.048));
        assert_eq!(totals.total.amount(), dec!(113.8536));

        set_rates(&mut session, None, Some(Percent::zero()));
        assert_eq!(session.draft().tax_rate(), Percent::from_whole(5));
        assert!(session.draft().discount().is_zero());
    }

    #[tokio::test]
    async fn test_generate_sends_pending_status() {
        let mut session = session_with_items();
        set_customer(&mut session, Customer::new("Nimal Perera", "0771234567")).unwrap();
        set_notes(&mut session, "Deliver Friday");

        let mut store = MockBillStore::new();
        store
            .expect_create_bill()
            .withf(|p| p.status == BillStatus::Pending && p.notes == "Deliver Friday")
            .times(1)
            .returning(|p| Ok(stored_bill("b1", p)));

        let bill = save_bill(&mut session, &store, BillStatus::Pending).await.unwrap();
        assert_eq!(bill.bill_number, "BILL-B1");
    }

    #[tokio::test]
    async fn test_download_pdf_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bill.pdf");

        let mut session = BillingSession::default();
        let mut store = MockBillStore::new();
        store.expect_generate_pdf().with(eq("b1")).returning(|_| Ok(()));
        store
            .expect_download_pdf()
            .with(eq("b1"))
            .returning(|_| Ok(b"%PDF-1.7 test".to_vec()));

        let path = download_pdf(&mut session, &store, "b1", Some(&out))
            .await
            .unwrap();
        assert_eq!(path, out);
        assert_eq!(std::fs::read(&out).unwrap(), b"%PDF-1.7 test");

        let notices = session.notices().active(Utc::now());
        assert!(notices[0].message.starts_with("PDF saved to "));
    }

    #[tokio::test]
    async fn test_print_receipt_uses_store_bill() {
        let mut session = session_with_items();
        session
            .draft_mut()
            .set_customer(Customer::new("Nimal Perera", "0771234567"));
        let payload = session.draft().payload(BillStatus::Paid);

        let mut store = MockBillStore::new();
        store
            .expect_get_bill()
            .returning(move |_| Ok(stored_bill("b3", &payload)));

        let receipt = print_receipt(&mut session, &store, "b3", "AutoNexus", "LKR")
            .await
            .unwrap();
        assert!(receipt.contains("AutoNexus"));
        assert!(receipt.contains("BILL-B3"));
        assert!(receipt.contains("120.48 LKR"));
    }

    async fn session_after_save(bill_number: &'static str) -> BillingSession {
        let mut session = session_with_items();
        set_customer(&mut session, Customer::new("Nimal Perera", "0771234567")).unwrap();

        let mut store = MockBillStore::new();
        store.expect_create_bill().returning(move |p| {
            let mut bill = stored_bill("b9", p);
            bill.bill_number = bill_number.to_string();
            Ok(bill)
        });
        save_bill(&mut session, &store, BillStatus::Draft).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_default_pdf_name_prefers_bill_number() {
        let session = BillingSession::default();
        assert_eq!(default_pdf_name(&session, "b9"), PathBuf::from("b9.pdf"));

        let session = session_after_save("BILL-0009").await;
        assert_eq!(default_pdf_name(&session, "b9"), PathBuf::from("BILL-0009.pdf"));
        assert_eq!(default_pdf_name(&session, "b10"), PathBuf::from("b10.pdf"));
    }

    #[tokio::test]
    async fn test_default_pdf_name_stays_in_working_directory() {
        let session = session_after_save("../../etc/BILL/7").await;
        let name = default_pdf_name(&session, "b9");
        assert_eq!(name, PathBuf::from("etc_BILL_7.pdf"));
        assert_eq!(name.components().count(), 1);

        let session = session_after_save("..").await;
        assert_eq!(default_pdf_name(&session, "b9"), PathBuf::from("b9.pdf"));

        let session = BillingSession::default();
        assert_eq!(default_pdf_name(&session, ".."), PathBuf::from("bill.pdf"));
        assert_eq!(default_pdf_name(&session, "a\\b"), PathBuf::from("a_b.pdf"));
    }
}
