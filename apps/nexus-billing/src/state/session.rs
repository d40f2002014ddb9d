//! # Billing Session
//!
//! Everything the operator is working on between two commands: the draft
//! bill, which stored bill (if any) it edits, the last bill the store
//! returned, and the notice board.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         save(status)                                    │
//! │                                                                         │
//! │  editing? ──── no ───► draft.submit(status) ──► POST /bills            │
//! │     │                                              │                    │
//! │    yes                                             │                    │
//! │     ▼                                              │                    │
//! │  draft.submit_update(current, status) ─► PUT /bills/{id}               │
//! │                                              │     │                    │
//! │                                              ▼     ▼                    │
//! │                        Ok ─► remember bill, "Bill saved/updated…"       │
//! │                        Err ─► error notice, draft untouched             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! After the first successful save the session tracks the stored bill, so a
//! later `generate` or `pay` updates it instead of creating a second bill.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use nexus_api::BillStore;
use nexus_core::{Bill, BillDraft, BillStatus, Percent};

use crate::error::{CommandError, CommandResult};
use crate::state::notice::{NoticeBoard, NoticeKind};

/// Appended to the notice of a bill that reached a final status.
pub const NEW_BILL_HINT: &str = "Run `nexus cart clear` to start a new bill.";

/// The stored bill a draft was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTarget {
    pub bill_id: String,
    pub status: BillStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSession {
    draft: BillDraft,
    #[serde(default)]
    editing: Option<EditTarget>,
    #[serde(default)]
    last_bill: Option<Bill>,
    #[serde(default)]
    notices: NoticeBoard,
}

impl Default for BillingSession {
    fn default() -> Self {
        BillingSession::new(Percent::zero(), crate::state::notice::DEFAULT_NOTICE_TTL)
    }
}

impl BillingSession {
    pub fn new(default_tax_rate: Percent, notice_ttl: Duration) -> Self {
        BillingSession {
            draft: BillDraft::new(default_tax_rate),
            editing: None,
            last_bill: None,
            notices: NoticeBoard::new(notice_ttl),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn draft(&self) -> &BillDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut BillDraft {
        &mut self.draft
    }

    pub fn editing(&self) -> Option<&EditTarget> {
        self.editing.as_ref()
    }

    pub fn last_bill(&self) -> Option<&Bill> {
        self.last_bill.as_ref()
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn set_notice_ttl(&mut self, ttl: Duration) {
        self.notices.set_ttl(ttl);
    }

    // -------------------------------------------------------------------------
    // Notices
    // -------------------------------------------------------------------------

    pub fn notify_success(&mut self, message: impl Into<String>) {
        self.notices.post(NoticeKind::Success, message, Utc::now());
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notices.post(NoticeKind::Error, message, Utc::now());
    }

    /// Records a failed result as an error notice and passes it through.
    pub fn report<T>(&mut self, result: CommandResult<T>) -> CommandResult<T> {
        if let Err(err) = &result {
            warn!(code = ?err.code, message = %err.message, "Command failed");
            self.notify_error(err.message.clone());
        }
        result
    }

    /// Drops expired notices.
    pub fn prune_notices(&mut self) {
        self.notices.prune(Utc::now());
    }

    /// Starts over: empty draft (tax rate kept), nothing being edited.
    pub fn clear(&mut self) {
        self.draft.clear();
        self.editing = None;
        self.last_bill = None;
        self.notices.clear();
        debug!(draft_id = %self.draft.draft_id, "Billing session cleared");
    }

    // -------------------------------------------------------------------------
    // Bill Lifecycle
    // -------------------------------------------------------------------------

    /// Submits the draft with `status`, creating or updating the stored bill.
    pub async fn save(&mut self, store: &dyn BillStore, status: BillStatus) -> CommandResult<Bill> {
        let result = self.save_inner(store, status).await;
        self.report(result)
    }

    async fn save_inner(&mut self, store: &dyn BillStore, status: BillStatus) -> CommandResult<Bill> {
        let bill = match &self.editing {
            Some(target) => {
                let payload = self.draft.submit_update(target.status, status)?;
                store.update_bill(&target.bill_id, &payload).await?
            }
            None => {
                let payload = self.draft.submit(status)?;
                store.create_bill(&payload).await?
            }
        };

        let updated = self.editing.is_some();
        info!(
            draft_id = %self.draft.draft_id,
            bill = %bill.label(),
            status = %bill.status,
            total = %bill.total,
            updated,
            "Bill stored"
        );

        if let Some(id) = bill.id.clone() {
            self.editing = Some(EditTarget {
                bill_id: id,
                status: bill.status,
            });
        }
        self.last_bill = Some(bill.clone());

        let done = if updated {
            "Bill updated successfully!"
        } else {
            "Bill saved successfully!"
        };
        // Paid and Cancelled bills take no further saves
        if matches!(bill.status, BillStatus::Paid | BillStatus::Cancelled) {
            self.notify_success(format!("{} {}", done, NEW_BILL_HINT));
        } else {
            self.notify_success(done);
        }

        Ok(bill)
    }

    /// Saves the draft as a pending bill.
    pub async fn generate(&mut self, store: &dyn BillStore) -> CommandResult<Bill> {
        self.save(store, BillStatus::Pending).await
    }

    /// Saves the draft as a paid bill.
    pub async fn confirm_payment(&mut self, store: &dyn BillStore) -> CommandResult<Bill> {
        self.save(store, BillStatus::Paid).await
    }

    /// Loads a stored bill into the draft for editing.
    pub async fn edit(&mut self, store: &dyn BillStore, bill_id: &str) -> CommandResult<Bill> {
        let result = store
            .get_bill(bill_id)
            .await
            .map_err(|e| CommandError::from(e).context("Failed to load bill for editing"));
        let bill = self.report(result)?;

        let Some(id) = bill.id.clone() else {
            let err = CommandError::internal("Stored bill has no id");
            return self.report(Err(err));
        };

        self.draft = BillDraft::from_bill(&bill);
        self.editing = Some(EditTarget {
            bill_id: id,
            status: bill.status,
        });
        self.last_bill = Some(bill.clone());
        self.notify_success("Bill loaded for editing");

        info!(bill = %bill.label(), lines = bill.items.len(), "Bill loaded for editing");
        Ok(bill)
    }

    /// Deletes a stored bill. Editing state that points at it is dropped.
    pub async fn delete(&mut self, store: &dyn BillStore, bill_id: &str) -> CommandResult<()> {
        let result = store
            .delete_bill(bill_id)
            .await
            .map_err(|e| CommandError::from(e).context("Failed to delete bill"));
        self.report(result)?;

        if self.editing.as_ref().is_some_and(|t| t.bill_id == bill_id) {
            self.editing = None;
        }
        if self
            .last_bill
            .as_ref()
            .is_some_and(|b| b.id.as_deref() == Some(bill_id))
        {
            self.last_bill = None;
        }
        self.notify_success("Bill deleted successfully!");

        info!(bill_id = %bill_id, "Bill deleted");
        Ok(())
    }

    /// Renders a stored bill to PDF and returns the document bytes.
    pub async fn generate_pdf(&mut self, store: &dyn BillStore, bill_id: &str) -> CommandResult<Vec<u8>> {
        let result = match store.generate_pdf(bill_id).await {
            Ok(()) => store.download_pdf(bill_id).await,
            Err(e) => Err(e),
        }
        .map_err(|e| CommandError::from(e).context("Failed to generate PDF"));
        let bytes = self.report(result)?;

        debug!(bill_id = %bill_id, bytes = bytes.len(), "PDF downloaded");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::fixtures::{brake_pads, engine_oil, stored_bill};
    use mockall::predicate::eq;
    use nexus_api::{ApiClientError, MockBillStore};
    use nexus_core::Customer;

    fn filled_session() -> BillingSession {
        let mut session = BillingSession::default();
        let draft = session.draft_mut();
        draft.add_item(&brake_pads(10)).unwrap();
        draft.add_item(&brake_pads(10)).unwrap();
        draft.add_item(&engine_oil(5)).unwrap();
        draft.set_customer(Customer::new("Nimal Perera", "0771234567"));
        session
    }

    fn messages(session: &BillingSession) -> Vec<String> {
        session
            .notices()
            .active(Utc::now())
            .into_iter()
            .map(|n| n.message.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_save_without_customer_name_makes_no_request() {
        let mut session = filled_session();
        session.draft_mut().set_customer(Customer::new("", "0771234567"));
        let before = session.draft().clone();

        let mut store = MockBillStore::new();
        store.expect_create_bill().never();
        store.expect_update_bill().never();

        let err = session.save(&store, BillStatus::Draft).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(session.draft(), &before);
        assert_eq!(messages(&session), vec!["customer name is required"]);
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let mut session = filled_session();

        let mut store = MockBillStore::new();
        store
            .expect_create_bill()
            .times(1)
            .returning(|payload| Ok(stored_bill("b1", payload)));
        store
            .expect_update_bill()
            .with(eq("b1"), mockall::predicate::always())
            .times(1)
            .returning(|_, payload| Ok(stored_bill("b1", payload)));

        let bill = session.save(&store, BillStatus::Draft).await.unwrap();
        assert_eq!(bill.total.to_string(), "120.48");
        assert_eq!(messages(&session), vec!["Bill saved successfully!"]);
        assert_eq!(session.editing().unwrap().bill_id, "b1");

        let bill = session.confirm_payment(&store).await.unwrap();
        assert_eq!(bill.status, BillStatus::Paid);
        assert_eq!(
            messages(&session),
            vec!["Bill updated successfully! Run `nexus cart clear` to start a new bill."]
        );
        assert_eq!(session.last_bill().unwrap().status, BillStatus::Paid);
    }

    #[tokio::test]
    async fn test_paid_bill_points_to_cart_clear() {
        let mut session = filled_session();

        let mut store = MockBillStore::new();
        store
            .expect_create_bill()
            .times(1)
            .returning(|payload| Ok(stored_bill("b2", payload)));
        store.expect_update_bill().never();

        session.confirm_payment(&store).await.unwrap();
        let notice = messages(&session).pop().unwrap();
        assert!(notice.starts_with("Bill saved successfully!"));
        assert!(notice.contains("nexus cart clear"));

        let err = session.save(&store, BillStatus::Draft).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        session.clear();
        assert!(session.editing().is_none());
    }

    #[tokio::test]
    async fn test_conflict_leaves_draft_untouched() {
        let mut session = filled_session();
        let before = session.draft().clone();

        let mut store = MockBillStore::new();
        store.expect_create_bill().times(1).returning(|_| {
            Err(ApiClientError::from_status(
                409,
                "bill",
                r#"{"message":"Brake Pads is out of stock"}"#,
            ))
        });

        let err = session.generate(&store).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(session.draft(), &before);
        assert!(session.editing().is_none());
        assert!(session.last_bill().is_none());
    }

    #[tokio::test]
    async fn test_edit_loads_bill_into_draft() {
        let mut session = BillingSession::default();
        let source = filled_session().draft().payload(BillStatus::Pending);

        let mut store = MockBillStore::new();
        store
            .expect_get_bill()
            .with(eq("b7"))
            .returning(move |_| Ok(stored_bill("b7", &source)));

        session.edit(&store, "b7").await.unwrap();
        assert_eq!(session.draft().lines().len(), 2);
        assert_eq!(session.draft().customer().name, "Nimal Perera");
        assert_eq!(
            session.editing(),
            Some(&EditTarget {
                bill_id: "b7".into(),
                status: BillStatus::Pending
            })
        );
        assert_eq!(messages(&session), vec!["Bill loaded for editing"]);
    }

    #[tokio::test]
    async fn test_delete_failure_is_prefixed() {
        let mut session = BillingSession::default();

        let mut store = MockBillStore::new();
        store
            .expect_delete_bill()
            .returning(|_| Err(ApiClientError::from_status(404, "bill b9", "")));

        let err = session.delete(&store, "b9").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Failed to delete bill: bill b9 not found");
    }

    #[tokio::test]
    async fn test_delete_drops_editing_target() {
        let mut session = filled_session();
        let mut store = MockBillStore::new();
        store
            .expect_create_bill()
            .returning(|payload| Ok(stored_bill("b1", payload)));
        store.expect_delete_bill().with(eq("b1")).returning(|_| Ok(()));

        session.save(&store, BillStatus::Draft).await.unwrap();
        session.delete(&store, "b1").await.unwrap();

        assert!(session.editing().is_none());
        assert!(session.last_bill().is_none());
        assert!(!session.draft().is_empty());
        assert_eq!(messages(&session), vec!["Bill deleted successfully!"]);
    }

    #[tokio::test]
    async fn test_generate_pdf_renders_then_downloads() {
        let mut session = BillingSession::default();
        let mut store = MockBillStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_generate_pdf()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_download_pdf()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(b"%PDF-1.4".to_vec()));

        let bytes = session.generate_pdf(&store, "b1").await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_clear_keeps_tax_rate() {
        let mut session = BillingSession::new(Percent::from_whole(5), Duration::from_secs(7));
        session.draft_mut().add_item(&brake_pads(3)).unwrap();
        session.notify_success("Brake Pads added to bill");

        session.clear();
        assert!(session.draft().is_empty());
        assert_eq!(session.draft().tax_rate(), Percent::from_whole(5));
        assert!(session.notices().active(Utc::now()).is_empty());
    }
}
