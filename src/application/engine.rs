use super::address::AddressFormatter;
use super::delivery;
use super::messages;
use super::promotion::PromotionScheduler;
use super::rate_limit::{RateDecision, RateLimiter};
use super::text::{capitalize_words, display_amount, fill};
use crate::domain::intent::{GlobalCommand, YesNo};
use crate::domain::message::{InboundMessage, Reply};
use crate::domain::order::{LineItem, OrderRecord, PaymentMetadata, PaymentStatus};
use crate::domain::ports::{
    ImageCatalogBox, IntentClassifierBox, MessengerBox, PaymentProviderBox, SessionStoreBox,
    SharedClock, SharedLanguageModel, SharedOrderLedger,
};
use crate::domain::session::{
    AddressInputMode, ConversationState, EditContext, EditField, Session,
};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Case-insensitive keyword that wakes a dormant session.
pub const TRIGGER_KEYWORD: &str = "bonjour";
/// Typing this while a payment is pending simulates a completed payment.
pub const PAYMENT_BYPASS: &str = "donepay";

const GREETING_DELAY: Duration = Duration::from_secs(2);
const PAYMENT_LINK_DELAY: Duration = Duration::from_secs(6);
const INSPIRE_DELAY: Duration = Duration::from_millis(1500);

const PRODUCT_NAME: &str = "Aerogramme Postcard";

/// Everything the engine talks to.
pub struct EnginePorts {
    pub sessions: SessionStoreBox,
    pub classifier: IntentClassifierBox,
    pub model: SharedLanguageModel,
    pub messenger: MessengerBox,
    pub payments: PaymentProviderBox,
    pub ledger: SharedOrderLedger,
    pub images: ImageCatalogBox,
    pub clock: SharedClock,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub currency: String,
    /// Postcard price in the currency's minor unit.
    pub unit_amount: i64,
    pub rate_limiter: RateLimiter,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            currency: "eur".to_string(),
            unit_amount: 500,
            rate_limiter: RateLimiter::default(),
        }
    }
}

/// The per-user conversation state machine.
///
/// One inbound message is one turn: the session is loaded, advanced, and
/// stored back, and the turn's outbound messages are returned as a [`Reply`].
/// Turns for the same user must not overlap; callers feed messages for a
/// user one at a time.
pub struct ConversationEngine {
    sessions: SessionStoreBox,
    classifier: IntentClassifierBox,
    messenger: MessengerBox,
    payments: PaymentProviderBox,
    ledger: SharedOrderLedger,
    images: ImageCatalogBox,
    clock: SharedClock,
    formatter: AddressFormatter,
    promotions: PromotionScheduler,
    settings: EngineSettings,
    ready_at: DateTime<Utc>,
}

impl ConversationEngine {
    /// Creates the engine; messages stamped before this moment are ignored.
    pub fn new(ports: EnginePorts, settings: EngineSettings) -> Self {
        let ready_at = ports.clock.now();
        Self {
            sessions: ports.sessions,
            classifier: ports.classifier,
            messenger: ports.messenger,
            payments: ports.payments,
            ledger: ports.ledger,
            images: ports.images,
            clock: ports.clock,
            formatter: AddressFormatter::new(ports.model.clone()),
            promotions: PromotionScheduler::new(ports.model),
            settings,
            ready_at,
        }
    }

    /// Handles one message and delivers the reply.
    ///
    /// A turn that cannot load or store the session is answered with a
    /// generic apology; send failures are logged and skipped.
    pub async fn receive(&self, message: InboundMessage) {
        let to = message.sender_id.clone();
        let reply = match self.handle(&message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(user = %to, error = %e, "turn failed");
                let mut apology = Reply::new();
                apology.text(messages::APOLOGY);
                apology
            }
        };
        let failed = delivery::deliver(self.messenger.as_ref(), &to, reply).await;
        if failed > 0 {
            warn!(user = %to, failed, "reply partially delivered");
        }
    }

    /// Runs one turn without sending anything.
    ///
    /// A state handler that fails part way ends the reply with the generic
    /// apology, after any promotion already produced this turn. The session
    /// is stored either way, keeping whatever changes were made.
    pub async fn handle(&self, message: &InboundMessage) -> Result<Reply> {
        if message.timestamp < self.ready_at {
            debug!(user = %message.sender_id, "ignoring message sent before startup");
            return Ok(Reply::new());
        }

        let mut session = self.sessions.get_or_create(&message.sender_id).await?;
        let reply = self.process(&mut session, message).await;
        debug!(user = %session.user_id, state = ?session.state, "turn processed");
        self.sessions.put(session).await?;
        Ok(reply)
    }

    async fn process(&self, session: &mut Session, message: &InboundMessage) -> Reply {
        let text = message.body.trim();
        let now = self.clock.now();

        match self.settings.rate_limiter.check(&mut session.rate, now) {
            RateDecision::Allowed => {}
            RateDecision::JustBlocked => {
                info!(user = %session.user_id, "message limit reached");
                let mut reply = Reply::new();
                reply.text(self.translate(session, messages::LIMIT_NOTICE).await);
                return reply;
            }
            RateDecision::Blocked => return Reply::new(),
        }

        if !session.started {
            if text.to_lowercase().contains(TRIGGER_KEYWORD) {
                session.started = true;
                return self.welcome(session);
            }
            debug!(user = %session.user_id, "ignoring message before trigger");
            return Reply::new();
        }

        let mut reply = self.promotions.run(session, now).await;

        if session.state.accepts_global_commands() {
            match self.classifier.detect_global_command(text).await {
                GlobalCommand::Restart => {
                    reply.append(self.restart(session).await);
                    return reply;
                }
                GlobalCommand::Language => {
                    reply.append(self.change_language(session));
                    return reply;
                }
                GlobalCommand::None => {}
            }
        }

        match self.dispatch(session, message, text).await {
            Ok(handled) => reply.append(handled),
            Err(e) => {
                error!(user = %session.user_id, state = ?session.state, error = %e, "turn failed");
                reply.text(messages::APOLOGY);
            }
        }
        reply
    }

    async fn dispatch(
        &self,
        session: &mut Session,
        message: &InboundMessage,
        text: &str,
    ) -> Result<Reply> {
        let reply = match session.state {
            ConversationState::Welcome => self.welcome(session),
            ConversationState::LanguageSelection => self.select_language(session, text).await,
            ConversationState::NameCollection => self.collect_name(session, text).await,
            ConversationState::AddressCollection => self.collect_address(session, text).await,
            ConversationState::AddressConfirmation => self.confirm_address(session, text).await,
            ConversationState::MessageCollection => self.collect_message(session, text).await,
            ConversationState::ImageCollection => self.collect_image(session, message).await?,
            ConversationState::Confirmation => self.confirm_order(session, text).await,
            ConversationState::Payment => self.await_payment(session, text).await,
            ConversationState::AnotherPostcard => self.offer_another(session, text).await,
            ConversationState::Farewell => self.restart(session).await,
        };
        Ok(reply)
    }

    async fn translate(&self, session: &Session, text: &str) -> String {
        self.classifier.translate(text, &session.language).await
    }

    /// Translates the template first so the values reach the user untouched.
    async fn localize(&self, session: &Session, template: &str, vars: &[(&str, &str)]) -> String {
        fill(&self.translate(session, template).await, vars)
    }

    fn welcome(&self, session: &mut Session) -> Reply {
        let mut reply = Reply::new();
        reply.text(messages::WELCOME);
        session.state = ConversationState::LanguageSelection;
        reply
    }

    /// Fresh order, same language, straight to the recipient's name.
    async fn restart(&self, session: &mut Session) -> Reply {
        session.begin_new_order();
        session.state = ConversationState::NameCollection;
        let mut reply = Reply::new();
        reply.text(self.translate(session, messages::GREETING).await);
        reply
    }

    fn change_language(&self, session: &mut Session) -> Reply {
        session.begin_new_order();
        session.state = ConversationState::LanguageSelection;
        let mut reply = Reply::new();
        reply.text(messages::LANGUAGE_MENU);
        reply
    }

    async fn select_language(&self, session: &mut Session, text: &str) -> Reply {
        session.language = self.classifier.detect_language(text).await;
        info!(user = %session.user_id, language = %session.language, "language selected");

        let mut reply = Reply::new();
        reply.text(self.translate(session, messages::HELP).await);
        let price = display_amount(self.settings.unit_amount);
        let currency = self.settings.currency.to_uppercase();
        reply.text(
            self.localize(
                session,
                messages::INTRODUCTION,
                &[("price", price.as_str()), ("currency", currency.as_str())],
            )
            .await,
        );
        if let Some(image) = self.images.welcome_image(&session.language).await {
            reply.media(image, None);
        }
        reply.text_after(
            GREETING_DELAY,
            self.translate(session, messages::GREETING).await,
        );
        session.state = ConversationState::NameCollection;
        reply
    }

    async fn collect_name(&self, session: &mut Session, text: &str) -> Reply {
        let name = capitalize_words(text);
        session.order.recipient_name = Some(name.clone());

        if session.edit.is_editing(EditField::Name) {
            session.edit = EditContext::Idle;
            let mut reply = Reply::new();
            reply.text(
                self.localize(session, messages::UPDATED_NAME, &[("name", name.as_str())])
                    .await,
            );
            reply.append(self.show_summary(session).await);
            return reply;
        }

        let template = match messages::native_name_confirmation(&session.language) {
            Some(native) => native.to_string(),
            None => self.translate(session, messages::name_confirmation()).await,
        };
        let mut reply = Reply::new();
        reply.text(fill(&template, &[("name", name.as_str())]));
        session.state = ConversationState::AddressCollection;
        reply
    }

    async fn collect_address(&self, session: &mut Session, text: &str) -> Reply {
        session.order.raw_address = Some(text.to_string());
        let mut reply = Reply::new();

        if session.address_mode == AddressInputMode::FreeformEdit {
            session.order.confirmed_address = Some(text.to_string());
            session.address_mode = AddressInputMode::Normal;
            session.edit = EditContext::Idle;
            reply.text(
                self.localize(session, messages::UPDATED_ADDRESS, &[("address", text)])
                    .await,
            );
            reply.append(self.show_summary(session).await);
            return reply;
        }

        let formatted = self.formatter.format(text).await;
        session.order.formatted_address = Some(formatted.clone());
        session.address_mode = AddressInputMode::Normal;
        reply.text(
            self.localize(session, messages::ADDRESS_PREVIEW, &[("address", formatted.as_str())])
                .await,
        );
        session.state = ConversationState::AddressConfirmation;
        reply
    }

    async fn confirm_address(&self, session: &mut Session, text: &str) -> Reply {
        let mut reply = Reply::new();
        match self.classifier.detect_yes_no(text).await {
            YesNo::Yes => {
                session.order.confirmed_address = session.order.formatted_address.clone();
                reply.text(self.translate(session, messages::MESSAGE_PROMPT).await);
                session.state = ConversationState::MessageCollection;
            }
            YesNo::No => {
                reply.text(self.translate(session, messages::ADDRESS_MANUAL).await);
                session.state = ConversationState::AddressCollection;
                session.address_mode = AddressInputMode::ManualRetry;
                session.address_corrections += 1;
            }
            YesNo::Unclear => {
                reply.text(self.translate(session, messages::ADDRESS_CLARIFY).await);
            }
        }
        reply
    }

    async fn collect_message(&self, session: &mut Session, text: &str) -> Reply {
        session.order.message = Some(text.to_string());
        let mut reply = Reply::new();

        if session.edit.is_editing(EditField::Message) {
            session.edit = EditContext::Idle;
            reply.text(
                self.localize(session, messages::UPDATED_MESSAGE, &[("message", text)])
                    .await,
            );
            reply.append(self.show_summary(session).await);
            return reply;
        }

        reply.text(
            self.localize(session, messages::MESSAGE_SAVED, &[("message", text)])
                .await,
        );
        reply.text(self.translate(session, messages::IMAGE_PROMPT).await);
        session.state = ConversationState::ImageCollection;
        reply
    }

    async fn collect_image(&self, session: &mut Session, message: &InboundMessage) -> Result<Reply> {
        let mut reply = Reply::new();
        if !message.has_media() {
            reply.text(self.translate(session, messages::IMAGE_PROMPT).await);
            return Ok(reply);
        }

        let image = self.messenger.download_media(message).await?;
        session.order.image = Some(image);

        if session.edit.is_editing(EditField::Image) {
            session.edit = EditContext::Idle;
            reply.text(self.translate(session, messages::UPDATED_IMAGE).await);
        }
        reply.append(self.show_summary(session).await);
        Ok(reply)
    }

    /// The order summary, captioning the postcard image when there is one.
    async fn show_summary(&self, session: &mut Session) -> Reply {
        let template = match messages::native_summary(&session.language) {
            Some(native) => native.to_string(),
            None => self.translate(session, messages::summary()).await,
        };
        let order = &session.order;
        let summary = fill(
            &template,
            &[
                ("name", order.recipient_name.as_deref().unwrap_or_default()),
                ("address", order.confirmed_address.as_deref().unwrap_or_default()),
                (
                    "message",
                    order.message.as_deref().unwrap_or(messages::NO_MESSAGE),
                ),
            ],
        );

        let mut reply = Reply::new();
        match &order.image {
            Some(image) => reply.media(image.clone(), Some(summary)),
            None => reply.text(summary),
        }
        session.state = ConversationState::Confirmation;
        reply
    }

    async fn confirm_order(&self, session: &mut Session, text: &str) -> Reply {
        let choosing = session.edit == EditContext::ChoosingField;
        if choosing && let Some(field) = EditField::parse_choice(text) {
            return self.begin_edit(session, field).await;
        }

        let intent = if text.contains('✅') {
            YesNo::Yes
        } else if text.contains('✏') {
            YesNo::No
        } else {
            self.classifier.detect_yes_no(text).await
        };

        let mut reply = Reply::new();
        match intent {
            YesNo::Yes => {
                session.edit = EditContext::Idle;
                let link = self.payment_link(session).await;
                reply.text(self.translate(session, messages::PAYMENT_PREPARING).await);
                reply.text_after(
                    PAYMENT_LINK_DELAY,
                    self.localize(session, messages::PAYMENT_LINK, &[("link", link.as_str())])
                        .await,
                );
                session.state = ConversationState::Payment;
            }
            YesNo::No => {
                reply.text(self.translate(session, messages::EDIT_MENU).await);
                session.edit = EditContext::ChoosingField;
            }
            YesNo::Unclear if choosing => {
                reply.text(self.translate(session, messages::EDIT_INVALID).await);
            }
            YesNo::Unclear => {
                reply.text(self.translate(session, messages::CONFIRM_CLARIFY).await);
            }
        }
        reply
    }

    async fn begin_edit(&self, session: &mut Session, field: EditField) -> Reply {
        let prompt = match field {
            EditField::Name => messages::EDIT_NAME_PROMPT,
            EditField::Address => {
                session.address_mode = AddressInputMode::FreeformEdit;
                session.address_corrections = 0;
                messages::EDIT_ADDRESS_PROMPT
            }
            EditField::Message => messages::EDIT_MESSAGE_PROMPT,
            EditField::Image => messages::EDIT_IMAGE_PROMPT,
        };
        session.edit = EditContext::Editing(field);
        session.state = field.collection_state();
        debug!(user = %session.user_id, ?field, "editing order field");

        let mut reply = Reply::new();
        reply.text(self.translate(session, prompt).await);
        reply
    }

    async fn payment_link(&self, session: &Session) -> String {
        let order = &session.order;
        let recipient = order.recipient_name.clone().unwrap_or_default();
        let item = LineItem {
            name: PRODUCT_NAME.to_string(),
            description: format!("Postcard for {recipient}"),
            currency: self.settings.currency.clone(),
            unit_amount: self.settings.unit_amount,
            quantity: 1,
        };
        let metadata = PaymentMetadata {
            order_id: session.order_id.to_string(),
            user_id: session.user_id.clone(),
            recipient_name: recipient,
            address: order.confirmed_address.clone().unwrap_or_default(),
            message: order.message.clone().unwrap_or_default(),
        };

        match self.payments.create_payment_link(&item, &metadata).await {
            Ok(url) => url,
            Err(e) => {
                warn!(order_id = %session.order_id, error = %e, "payment link creation failed");
                messages::PAYMENT_LINK_FAILED.to_string()
            }
        }
    }

    async fn await_payment(&self, session: &mut Session, text: &str) -> Reply {
        let mut reply = Reply::new();
        if text.to_lowercase() != PAYMENT_BYPASS {
            reply.text(self.translate(session, messages::PAYMENT_REMINDER).await);
            return reply;
        }

        let now = self.clock.now();
        let record = OrderRecord::pending(session.order_id, &session.order, now);
        if let Err(e) = self.ledger.record_order(&record).await {
            warn!(order_id = %record.order_id, error = %e, "failed to record order");
        }
        if let Err(e) = self
            .ledger
            .update_status(&record.order_id, PaymentStatus::Paid, now)
            .await
        {
            warn!(order_id = %record.order_id, error = %e, "failed to mark order paid");
        }
        info!(user = %session.user_id, order_id = %record.order_id, "order paid");

        reply.text(self.translate(session, messages::PAYMENT_CONGRATS).await);
        reply.text_after(
            INSPIRE_DELAY,
            self.translate(session, messages::PAYMENT_INSPIRE).await,
        );
        session.state = ConversationState::AnotherPostcard;
        session.has_completed_order = true;
        reply
    }

    async fn offer_another(&self, session: &mut Session, text: &str) -> Reply {
        match self.classifier.detect_free_intent(text).await {
            YesNo::Yes => self.restart(session).await,
            YesNo::No => {
                let mut reply = Reply::new();
                reply.text(self.translate(session, messages::FAREWELL).await);
                session.state = ConversationState::Farewell;
                reply
            }
            YesNo::Unclear => {
                let mut reply = Reply::new();
                reply.text(self.translate(session, messages::ANOTHER_CLARIFY).await);
                reply
            }
        }
    }
}
