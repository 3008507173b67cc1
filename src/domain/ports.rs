use super::intent::{GlobalCommand, YesNo};
use super::message::InboundMessage;
use super::order::{LineItem, OrderRecord, PaymentMetadata, PaymentStatus};
use super::session::{MediaRef, Session};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Key-value storage for sessions, one per user.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<Session>>;
    async fn put(&self, session: Session) -> Result<()>;

    /// Returns the stored session, creating and storing a fresh one if absent.
    async fn get_or_create(&self, user_id: &str) -> Result<Session> {
        if let Some(session) = self.get(user_id).await? {
            return Ok(session);
        }
        let session = Session::new(user_id);
        self.put(session.clone()).await?;
        Ok(session)
    }
}

/// A hosted text-completion model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_text: &str, max_tokens: u32)
    -> Result<String>;
}

/// Best-effort language understanding.
///
/// Every operation returns a usable value; failures are absorbed by the
/// implementation and replaced by the documented default.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Numeric menu shortcuts resolve locally; anything unusable yields `en`.
    async fn detect_language(&self, text: &str) -> String;
    /// Identity for `en`; the original text whenever translation fails.
    async fn translate(&self, text: &str, target: &str) -> String;
    /// Proceed (`Yes`) versus change something (`No`).
    async fn detect_yes_no(&self, text: &str) -> YesNo;
    async fn detect_global_command(&self, text: &str) -> GlobalCommand;
    /// Whether the user wants to send another postcard.
    async fn detect_free_intent(&self, text: &str) -> YesNo;
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, to: &str, text: &str) -> Result<()>;
    async fn send_media(&self, to: &str, media: &MediaRef, caption: Option<&str>) -> Result<()>;
    async fn download_media(&self, message: &InboundMessage) -> Result<MediaRef>;
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Returns the URL the customer pays at.
    async fn create_payment_link(&self, item: &LineItem, metadata: &PaymentMetadata) -> Result<String>;
}

#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn record_order(&self, record: &OrderRecord) -> Result<()>;
    async fn update_status(&self, order_id: &str, status: PaymentStatus, at: DateTime<Utc>) -> Result<()>;
}

/// Pictures shown with the introduction, one per language.
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    /// The picture for `language`, or the English one when it has none.
    async fn welcome_image(&self, language: &str) -> Option<MediaRef>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type SessionStoreBox = Box<dyn SessionStore>;
pub type IntentClassifierBox = Box<dyn IntentClassifier>;
pub type MessengerBox = Box<dyn Messenger>;
pub type PaymentProviderBox = Box<dyn PaymentProvider>;
pub type ImageCatalogBox = Box<dyn ImageCatalog>;
pub type SharedLanguageModel = Arc<dyn LanguageModel>;
pub type SharedOrderLedger = Arc<dyn OrderLedger>;
pub type SharedClock = Arc<dyn Clock>;
