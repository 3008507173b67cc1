use crate::domain::order::{LineItem, PaymentMetadata};
use crate::domain::ports::PaymentProvider;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1";

/// Creates Stripe payment links through the form-encoded REST API.
#[derive(Clone)]
pub struct StripePaymentLinks {
    secret_key: Option<String>,
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PaymentLink {
    url: String,
}

impl StripePaymentLinks {
    pub fn new(secret_key: Option<String>) -> Self {
        Self {
            secret_key,
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Flattens the link request into Stripe's bracketed form keys.
fn form_fields(item: &LineItem, metadata: &PaymentMetadata) -> Vec<(String, String)> {
    let mut fields = vec![
        ("line_items[0][price_data][currency]".to_string(), item.currency.clone()),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            item.name.clone(),
        ),
        (
            "line_items[0][price_data][product_data][description]".to_string(),
            item.description.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            item.unit_amount.to_string(),
        ),
        ("line_items[0][quantity]".to_string(), item.quantity.to_string()),
    ];
    fields.extend(
        metadata
            .pairs()
            .into_iter()
            .map(|(key, value)| (format!("metadata[{key}]"), value.to_string())),
    );
    fields
}

#[async_trait]
impl PaymentProvider for StripePaymentLinks {
    async fn create_payment_link(&self, item: &LineItem, metadata: &PaymentMetadata) -> Result<String> {
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or_else(|| BotError::Payment("STRIPE_SECRET_KEY is not set".to_string()))?;

        let response = self
            .client
            .post(format!("{}/payment_links", self.base_url))
            .basic_auth(secret_key, None::<&str>)
            .form(&form_fields(item, metadata))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Payment(format!("Stripe API error {status}: {body}")));
        }

        let link: PaymentLink = response.json().await?;
        tracing::info!(order_id = %metadata.order_id, "payment link created");
        Ok(link.url)
    }
}
