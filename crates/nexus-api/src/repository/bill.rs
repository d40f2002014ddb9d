//! # Bill Repository
//!
//! REST operations for persisted bills.
//!
//! ## Endpoints
//! ```text
//! GET    /bills?limit=100            → { bills: [...] }
//! GET    /bills/{id}
//! POST   /bills                      ← BillPayload
//! PUT    /bills/{id}                 ← BillPayload
//! DELETE /bills/{id}
//! POST   /bills/{id}/generate-pdf
//! GET    /bills/{id}/download-pdf    → application/pdf
//! ```
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BillDraft::submit(status) ──► BillPayload                             │
//! │       │                                                                 │
//! │       ├── editing == None ──► create_bill ──► POST /bills              │
//! │       └── editing == Some ──► update_bill ──► PUT /bills/{id}          │
//! │                                                │                        │
//! │                                                ▼                        │
//! │                         Bill (id, billNumber, totals from the store)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info};

use nexus_core::validation::validate_id;
use nexus_core::{Bill, BillPayload};

use crate::client::ApiClient;
use crate::error::{ApiClientError, ApiResult};
use crate::store::BillStore;
use crate::wire::BillList;

/// Repository for bill operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    client: ApiClient,
}

impl BillRepository {
    pub fn new(client: ApiClient) -> Self {
        BillRepository { client }
    }
}

#[async_trait]
impl BillStore for BillRepository {
    async fn list_bills(&self, limit: u32) -> ApiResult<Vec<Bill>> {
        let limit = limit.to_string();
        let url = self
            .client
            .endpoint_with_query(&["bills"], &[("limit", limit.as_str())])?;
        let list: BillList = self.client.get_json("bills", url).await?;

        let bills = list.into_items();
        debug!(count = bills.len(), "Listed bills");
        Ok(bills)
    }

    async fn get_bill(&self, id: &str) -> ApiResult<Bill> {
        validate_id(id)?;
        let url = self.client.endpoint(&["bills", id])?;
        self.client.get_json(&format!("bill {id}"), url).await
    }

    async fn create_bill(&self, payload: &BillPayload) -> ApiResult<Bill> {
        let url = self.client.endpoint(&["bills"])?;
        let bill: Bill = self
            .client
            .send_json(Method::POST, "bill", url, payload)
            .await?;

        if bill.id.is_none() {
            return Err(ApiClientError::decode("bill", "created bill has no _id"));
        }

        info!(
            bill_id = bill.id.as_deref().unwrap_or_default(),
            bill_number = %bill.bill_number,
            status = %bill.status,
            lines = bill.items.len(),
            "Bill created"
        );
        Ok(bill)
    }

    async fn update_bill(&self, id: &str, payload: &BillPayload) -> ApiResult<Bill> {
        validate_id(id)?;
        let url = self.client.endpoint(&["bills", id])?;
        let bill: Bill = self
            .client
            .send_json(Method::PUT, &format!("bill {id}"), url, payload)
            .await?;

        info!(bill_id = %id, status = %bill.status, "Bill updated");
        Ok(bill)
    }

    async fn delete_bill(&self, id: &str) -> ApiResult<()> {
        validate_id(id)?;
        let url = self.client.endpoint(&["bills", id])?;
        self.client
            .send_empty(Method::DELETE, &format!("bill {id}"), url)
            .await?;

        info!(bill_id = %id, "Bill deleted");
        Ok(())
    }

    async fn generate_pdf(&self, id: &str) -> ApiResult<()> {
        validate_id(id)?;
        let url = self.client.endpoint(&["bills", id, "generate-pdf"])?;
        self.client
            .send_empty(Method::POST, &format!("bill {id} PDF"), url)
            .await?;

        info!(bill_id = %id, "Bill PDF generated");
        Ok(())
    }

    async fn download_pdf(&self, id: &str) -> ApiResult<Vec<u8>> {
        validate_id(id)?;
        let url = self.client.endpoint(&["bills", id, "download-pdf"])?;
        let bytes = self.client.get_bytes(&format!("bill {id} PDF"), url).await?;

        if !bytes.starts_with(b"%PDF") {
            return Err(ApiClientError::decode(
                format!("bill {id} PDF"),
                "response is not a PDF document",
            ));
        }

        debug!(bill_id = %id, size = bytes.len(), "Bill PDF downloaded");
        Ok(bytes)
    }
}
