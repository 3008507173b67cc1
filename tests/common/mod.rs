#![allow(dead_code)]

use aerogramme::application::engine::{ConversationEngine, EnginePorts, EngineSettings};
use aerogramme::domain::intent::{self, GlobalCommand, YesNo};
use aerogramme::domain::message::{InboundMessage, Outbound, Reply};
use aerogramme::domain::order::{LineItem, OrderRecord, PaymentMetadata, PaymentStatus};
use aerogramme::domain::ports::{
    Clock, ImageCatalog, ImageCatalogBox, IntentClassifier, LanguageModel, Messenger, OrderLedger,
    PaymentProvider, SessionStore,
};
use aerogramme::domain::session::{MediaRef, Session};
use aerogramme::error::{BotError, Result};
use aerogramme::infrastructure::in_memory::InMemorySessionStore;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::{Arc, Mutex};

pub const USER: &str = "33612345678";

/// Answer the model gives for "24 rue du general de gaulle versailles sur orge 94782 france".
pub const FORMATTED_ADDRESS: &str =
    "24, Rue Du General De Gaulle, Versailles Sur Orge, 94782, France";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 9, 0, 0).unwrap()
}

/// Keyword rules standing in for the model-backed classifier.
///
/// Translation tags the text with the target language so tests can see
/// which messages went through it.
pub struct KeywordClassifier;

fn yes_no(text: &str) -> YesNo {
    match text.trim().to_lowercase().as_str() {
        "yes" | "oui" | "sure" | "ok" => YesNo::Yes,
        "no" | "non" | "not now" => YesNo::No,
        _ => YesNo::Unclear,
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn detect_language(&self, text: &str) -> String {
        intent::language_from_shortcut(text)
            .map(str::to_string)
            .or_else(|| intent::parse_language_code(text))
            .unwrap_or_else(|| "en".to_string())
    }

    async fn translate(&self, text: &str, target: &str) -> String {
        if target == "en" {
            text.to_string()
        } else {
            format!("[{target}] {text}")
        }
    }

    async fn detect_yes_no(&self, text: &str) -> YesNo {
        yes_no(text)
    }

    async fn detect_global_command(&self, text: &str) -> GlobalCommand {
        let text = text.to_lowercase();
        if text.contains("restart") {
            GlobalCommand::Restart
        } else if text.contains("language") {
            GlobalCommand::Language
        } else {
            GlobalCommand::None
        }
    }

    async fn detect_free_intent(&self, text: &str) -> YesNo {
        yes_no(text)
    }
}

/// Replies with a fixed completion, or fails when none is set.
#[derive(Default)]
pub struct ScriptedModel {
    reply: Mutex<Option<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn set_reply(&self, reply: Option<&str>) {
        *self.reply.lock().unwrap() = reply.map(str::to_string);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, system_prompt: &str, _user_text: &str, _max_tokens: u32) -> Result<String> {
        self.prompts.lock().unwrap().push(system_prompt.to_string());
        self.reply
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BotError::Model("no scripted reply".to_string()))
    }
}

/// Records every send; attachments whose handle starts with `broken` fail to download.
#[derive(Clone, Default)]
pub struct RecordingMessenger {
    sent: Arc<Mutex<Vec<(String, Outbound)>>>,
    media_down: Arc<Mutex<bool>>,
}

impl RecordingMessenger {
    /// Every later `send_media` fails.
    pub fn fail_media(&self) {
        *self.media_down.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<(String, Outbound)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|(_, outbound)| match outbound {
                Outbound::Text(text) => Some(text),
                Outbound::Media { caption, .. } => caption,
            })
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), Outbound::Text(text.to_string())));
        Ok(())
    }

    async fn send_media(&self, to: &str, media: &MediaRef, caption: Option<&str>) -> Result<()> {
        if *self.media_down.lock().unwrap() {
            return Err(BotError::Messenger(format!("cannot upload {}", media.handle)));
        }
        self.sent.lock().unwrap().push((
            to.to_string(),
            Outbound::Media {
                media: media.clone(),
                caption: caption.map(str::to_string),
            },
        ));
        Ok(())
    }

    async fn download_media(&self, message: &InboundMessage) -> Result<MediaRef> {
        let handle = message.attachment.clone().unwrap_or_default();
        if handle.starts_with("broken") {
            return Err(BotError::Messenger(format!("cannot download {handle}")));
        }
        Ok(MediaRef {
            handle,
            mime_type: "image/jpeg".to_string(),
        })
    }
}

#[derive(Clone, Default)]
pub struct StubPayments {
    requests: Arc<Mutex<Vec<(LineItem, PaymentMetadata)>>>,
    failing: Arc<Mutex<bool>>,
}

impl StubPayments {
    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub fn requests(&self) -> Vec<(LineItem, PaymentMetadata)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for StubPayments {
    async fn create_payment_link(&self, item: &LineItem, metadata: &PaymentMetadata) -> Result<String> {
        if *self.failing.lock().unwrap() {
            return Err(BotError::Payment("card network down".to_string()));
        }
        self.requests
            .lock()
            .unwrap()
            .push((item.clone(), metadata.clone()));
        Ok(format!("https://pay.test/{}", metadata.order_id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCall {
    Record(OrderRecord),
    Update(String, PaymentStatus),
}

#[derive(Default)]
pub struct RecordingLedger {
    calls: Mutex<Vec<LedgerCall>>,
}

impl RecordingLedger {
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderLedger for RecordingLedger {
    async fn record_order(&self, record: &OrderRecord) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(LedgerCall::Record(record.clone()));
        Ok(())
    }

    async fn update_status(&self, order_id: &str, status: PaymentStatus, _at: DateTime<Utc>) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(LedgerCall::Update(order_id.to_string(), status));
        Ok(())
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct NoImages;

#[async_trait]
impl ImageCatalog for NoImages {
    async fn welcome_image(&self, _language: &str) -> Option<MediaRef> {
        None
    }
}

/// Always offers the same introduction picture.
pub struct WelcomeImage(pub &'static str);

#[async_trait]
impl ImageCatalog for WelcomeImage {
    async fn welcome_image(&self, _language: &str) -> Option<MediaRef> {
        Some(MediaRef {
            handle: self.0.to_string(),
            mime_type: "image/jpeg".to_string(),
        })
    }
}

pub struct Harness {
    pub engine: ConversationEngine,
    pub sessions: InMemorySessionStore,
    pub model: Arc<ScriptedModel>,
    pub messenger: RecordingMessenger,
    pub payments: StubPayments,
    pub ledger: Arc<RecordingLedger>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self::build(settings, Box::new(NoImages))
    }

    pub fn with_images(images: ImageCatalogBox) -> Self {
        Self::build(EngineSettings::default(), images)
    }

    fn build(settings: EngineSettings, images: ImageCatalogBox) -> Self {
        let sessions = InMemorySessionStore::new();
        let model = Arc::new(ScriptedModel::default());
        let messenger = RecordingMessenger::default();
        let payments = StubPayments::default();
        let ledger = Arc::new(RecordingLedger::default());
        let clock = Arc::new(ManualClock::new(start_time()));

        let ports = EnginePorts {
            sessions: Box::new(sessions.clone()),
            classifier: Box::new(KeywordClassifier),
            model: model.clone(),
            messenger: Box::new(messenger.clone()),
            payments: Box::new(payments.clone()),
            ledger: ledger.clone(),
            images,
            clock: clock.clone(),
        };
        Self {
            engine: ConversationEngine::new(ports, settings),
            sessions,
            model,
            messenger,
            payments,
            ledger,
            clock,
        }
    }

    pub fn message(&self, text: &str) -> InboundMessage {
        InboundMessage::text(USER, text, self.clock.now())
    }

    pub async fn say(&self, text: &str) -> Reply {
        self.engine.handle(&self.message(text)).await.unwrap()
    }

    pub async fn send_photo(&self, handle: &str) -> Reply {
        let message = self.message("").with_attachment(handle);
        self.engine.handle(&message).await.unwrap()
    }

    pub async fn session(&self) -> Session {
        self.sessions.get(USER).await.unwrap().unwrap()
    }

    /// Walks an English conversation up to the order summary.
    pub async fn reach_confirmation(&self) -> Reply {
        self.model.set_reply(Some(FORMATTED_ADDRESS));
        self.say("Bonjour").await;
        self.say("1").await;
        self.say("jean dupont").await;
        self.say("24 rue du general de gaulle versailles sur orge 94782 france")
            .await;
        self.say("yes").await;
        self.say("Joyeux anniversaire !").await;
        self.send_photo("photo-1.jpg").await
    }
}
