//! Stripe webhook receiver.
//!
//! Payment outcomes arrive here rather than through the chat; the receiver
//! only touches the order ledger, correlated by `metadata.order_id`.

use crate::domain::order::{OrderRecord, PaymentStatus};
use crate::domain::ports::{SharedClock, SharedOrderLedger};
use crate::error::Result;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
/// Maximum age of a signed timestamp, in seconds.
pub const TOLERANCE_SECS: i64 = 300;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("No signatures found matching the expected signature for payload")]
    Mismatch,
    #[error("Missing Stripe-Signature header")]
    MissingHeader,
    #[error("Unable to extract timestamp and signatures from header")]
    Malformed,
    #[error("Timestamp outside the tolerance zone")]
    Expired,
}

/// Checks a `t=<unix>,v1=<hex>[,v1=<hex>...]` header against the raw body.
pub fn verify_signature(
    secret: &str,
    header: &str,
    body: &[u8],
    now: DateTime<Utc>,
) -> std::result::Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed);
    }
    if (now.timestamp() - timestamp).abs() > TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    let matches = signatures.iter().any(|signature| {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        mac.verify_slice(&expected).is_ok()
    });
    if matches {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

#[derive(Clone)]
pub struct WebhookState {
    pub secret: String,
    pub ledger: SharedOrderLedger,
    pub clock: SharedClock,
}

#[derive(Deserialize)]
struct Event {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Deserialize)]
struct EventData {
    object: EventObject,
}

#[derive(Deserialize)]
struct EventObject {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl EventObject {
    fn meta(&self, key: &str) -> String {
        self.metadata.get(key).cloned().unwrap_or_default()
    }
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook/stripe", post(handle_stripe))
        .with_state(state)
}

pub async fn serve(port: u16, state: WebhookState) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Stripe webhook server listening on /webhook/stripe");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn rejection(reason: impl std::fmt::Display) -> Response {
    (StatusCode::BAD_REQUEST, format!("Webhook Error: {reason}")).into_response()
}

async fn handle_stripe(State(state): State<WebhookState>, headers: HeaderMap, body: Bytes) -> Response {
    let now = state.clock.now();
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let verified = match header {
        Some(header) => verify_signature(&state.secret, header, &body, now),
        None => Err(SignatureError::MissingHeader),
    };
    if let Err(e) = verified {
        warn!(error = %e, "webhook signature verification failed");
        return rejection(e);
    }

    let event: Event = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "webhook payload is not a Stripe event");
            return rejection(e);
        }
    };

    let object = &event.data.object;
    let order_id = object.meta("order_id");
    if event.kind == "checkout.session.completed" {
        let record = OrderRecord {
            order_id: order_id.clone(),
            name: object.meta("recipient_name"),
            address: object.meta("address"),
            message: object.meta("message"),
            image_status: OrderRecord::IMAGE_UPLOADED.to_string(),
            timestamp: now,
            payment_status: PaymentStatus::Paid,
            payment_date: Some(now),
            stripe_session_id: object.id.clone(),
        };
        match state.ledger.record_order(&record).await {
            Ok(()) => info!(order_id = %order_id, "payment confirmed and order saved"),
            Err(e) => warn!(order_id = %order_id, error = %e, "failed to save paid order"),
        }
    } else if event.kind.starts_with("payment_intent.") && event.kind.ends_with("failed") {
        match state
            .ledger
            .update_status(&order_id, PaymentStatus::Failed, now)
            .await
        {
            Ok(()) => info!(order_id = %order_id, "payment failed"),
            Err(e) => warn!(order_id = %order_id, error = %e, "failed to record payment failure"),
        }
    } else {
        info!(event_type = %event.kind, "unhandled event type");
    }

    Json(serde_json::json!({ "received": true })).into_response()
}
