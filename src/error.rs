use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Language model error: {0}")]
    Model(String),
    #[error("Messenger error: {0}")]
    Messenger(String),
    #[error("Payment provider error: {0}")]
    Payment(String),
    #[error("Order ledger error: {0}")]
    Ledger(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
