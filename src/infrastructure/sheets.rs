use crate::domain::order::{OrderRecord, PaymentStatus};
use crate::domain::ports::OrderLedger;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

/// Order ledger kept in a spreadsheet behind a Sheet.best style REST API.
///
/// Rows are created with `POST <url>` and updated with
/// `PUT <url>/order_id/<id>`.
#[derive(Clone)]
pub struct SheetLedger {
    url: Option<String>,
    client: reqwest::Client,
}

impl SheetLedger {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url: url.map(|u| u.trim_end_matches('/').to_string()),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .ok_or_else(|| BotError::Ledger("SHEETBEST_API_URL is not set".to_string()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Ledger(format!("ledger error {status}: {body}")));
        }
        Ok(())
    }
}

/// Body of a status update; the date column depends on the outcome.
pub fn status_update(status: PaymentStatus, at: DateTime<Utc>) -> Value {
    let at = at.to_rfc3339();
    match status {
        PaymentStatus::Paid => json!({"payment_status": status, "payment_date": at}),
        PaymentStatus::Failed => json!({"payment_status": status, "payment_failed_date": at}),
        PaymentStatus::Pending => json!({"payment_status": status}),
    }
}

#[async_trait]
impl OrderLedger for SheetLedger {
    async fn record_order(&self, record: &OrderRecord) -> Result<()> {
        let url = self.url()?;
        self.send(self.client.post(url).json(record)).await?;
        tracing::info!(order_id = %record.order_id, status = ?record.payment_status, "order recorded");
        Ok(())
    }

    async fn update_status(&self, order_id: &str, status: PaymentStatus, at: DateTime<Utc>) -> Result<()> {
        let url = format!("{}/order_id/{order_id}", self.url()?);
        self.send(self.client.put(url).json(&status_update(status, at)))
            .await?;
        tracing::info!(order_id, ?status, "order status updated");
        Ok(())
    }
}
