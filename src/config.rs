use crate::error::{BotError, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

pub const DEFAULT_CURRENCY: &str = "eur";
pub const DEFAULT_POSTCARD_PRICE: i64 = 500;
pub const DEFAULT_WEBHOOK_PORT: u16 = 3001;

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Without it every model call fails and the fallbacks apply.
    pub openai_api_key: Option<String>,
    pub stripe_secret_key: Option<String>,
    /// Required only by the webhook receiver.
    pub stripe_webhook_secret: Option<String>,
    pub sheetbest_api_url: Option<String>,
    /// ISO currency code, lower-case. Default: `eur`.
    pub currency: String,
    /// Unit price in the currency's minor unit. Default: 500.
    pub postcard_price: i64,
    pub webhook_port: u16,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            openai_api_key: var("OPENAI_API_KEY"),
            stripe_secret_key: var("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: var("STRIPE_WEBHOOK_SECRET"),
            sheetbest_api_url: var("SHEETBEST_API_URL"),
            currency: var("CURRENCY")
                .map(|c| c.to_lowercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            postcard_price: parse_or("POSTCARD_PRICE", var("POSTCARD_PRICE"), DEFAULT_POSTCARD_PRICE)?,
            webhook_port: parse_or("WEBHOOK_PORT", var("WEBHOOK_PORT"), DEFAULT_WEBHOOK_PORT)?,
        })
    }

    /// The postcard price in major units, e.g. `5.00`.
    pub fn unit_price(&self) -> Decimal {
        Decimal::new(self.postcard_price, 2)
    }

    pub fn require_webhook_secret(&self) -> Result<&str> {
        self.stripe_webhook_secret
            .as_deref()
            .ok_or_else(|| BotError::Config("STRIPE_WEBHOOK_SECRET must be set".to_string()))
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| BotError::Config(format!("{key} must be a number, got {raw:?}"))),
    }
}
