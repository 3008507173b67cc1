use super::session::Order;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// A row in the order ledger, keyed by `order_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub name: String,
    pub address: String,
    pub message: String,
    pub image_status: String,
    pub timestamp: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_session_id: Option<String>,
}

impl OrderRecord {
    pub const IMAGE_UPLOADED: &'static str = "Image uploaded";
    pub const NO_IMAGE: &'static str = "No image";

    /// Snapshot of an order that has not been paid for yet.
    pub fn pending(order_id: Uuid, order: &Order, at: DateTime<Utc>) -> Self {
        let image_status = if order.image.is_some() {
            Self::IMAGE_UPLOADED
        } else {
            Self::NO_IMAGE
        };
        Self {
            order_id: order_id.to_string(),
            name: order.recipient_name.clone().unwrap_or_default(),
            address: order.confirmed_address.clone().unwrap_or_default(),
            message: order.message.clone().unwrap_or_default(),
            image_status: image_status.to_string(),
            timestamp: at,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            stripe_session_id: None,
        }
    }
}

/// What the customer is charged for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub description: String,
    pub currency: String,
    /// Price in the currency's minor unit.
    pub unit_amount: i64,
    pub quantity: u32,
}

/// Correlation data attached to a payment link.
///
/// The image is left out; payment providers cap metadata size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMetadata {
    pub order_id: String,
    pub user_id: String,
    pub recipient_name: String,
    pub address: String,
    pub message: String,
}

impl PaymentMetadata {
    pub fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("order_id", self.order_id.as_str()),
            ("user_id", self.user_id.as_str()),
            ("recipient_name", self.recipient_name.as_str()),
            ("address", self.address.as_str()),
            ("message", self.message.as_str()),
        ]
    }
}
