use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Language used until the user picks one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// The conversation states a session moves through.
///
/// `Farewell` and a "yes" in `AnotherPostcard` loop back to `NameCollection`
/// with the language kept and a fresh order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Welcome,
    LanguageSelection,
    NameCollection,
    AddressCollection,
    AddressConfirmation,
    MessageCollection,
    ImageCollection,
    Confirmation,
    Payment,
    AnotherPostcard,
    Farewell,
}

impl ConversationState {
    /// Restart and change-language commands are ignored while bootstrapping.
    pub fn accepts_global_commands(self) -> bool {
        !matches!(self, Self::Welcome | Self::LanguageSelection)
    }
}

/// Opaque handle to a piece of media plus its mime type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub handle: String,
    pub mime_type: String,
}

/// The postcard currently being assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub recipient_name: Option<String>,
    /// What the user typed, stored before any formatting.
    pub raw_address: Option<String>,
    /// Canonical version proposed to the user for confirmation.
    pub formatted_address: Option<String>,
    /// The address that ends up on the postcard.
    pub confirmed_address: Option<String>,
    pub message: Option<String>,
    pub image: Option<MediaRef>,
}

/// An order field that can be changed from the confirmation screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditField {
    Name,
    Address,
    Message,
    Image,
}

impl EditField {
    const KEYWORDS: [(EditField, &'static [&'static str]); 4] = [
        (EditField::Name, &["name", "nom", "nombre"]),
        (EditField::Address, &["address", "adresse", "dirección", "direccion"]),
        (EditField::Message, &["message", "mensaje"]),
        (EditField::Image, &["image", "photo", "imagen", "foto"]),
    ];

    /// Matches an edit-menu answer: a digit `1`-`4` or a field keyword.
    pub fn parse_choice(input: &str) -> Option<Self> {
        let choice = input.trim().to_lowercase();
        match choice.as_str() {
            "1" => return Some(Self::Name),
            "2" => return Some(Self::Address),
            "3" => return Some(Self::Message),
            "4" => return Some(Self::Image),
            _ => {}
        }
        Self::KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| choice.contains(w)))
            .map(|(field, _)| *field)
    }

    /// The collection state that gathers this field.
    pub fn collection_state(self) -> ConversationState {
        match self {
            Self::Name => ConversationState::NameCollection,
            Self::Address => ConversationState::AddressCollection,
            Self::Message => ConversationState::MessageCollection,
            Self::Image => ConversationState::ImageCollection,
        }
    }
}

/// Where the session stands with respect to the edit sub-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditContext {
    #[default]
    Idle,
    /// The edit menu was shown; the next input picks a field.
    ChoosingField,
    /// A single field is being re-collected and the flow returns to confirmation.
    Editing(EditField),
}

impl EditContext {
    pub fn is_editing(self, field: EditField) -> bool {
        self == Self::Editing(field)
    }
}

/// How the next address input is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddressInputMode {
    /// Format, then ask the user to confirm the formatted version.
    #[default]
    Normal,
    /// The user rejected the formatted version; re-format and re-show.
    ManualRetry,
    /// Entered from the edit menu; the input is kept verbatim.
    FreeformEdit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    pub message_count: u32,
    pub window_start: Option<DateTime<Utc>>,
    /// Sticky until the window resets.
    pub blocked: bool,
}

/// Dates that trigger a festive nudge two weeks ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Holiday {
    Christmas,
    NewYear,
    Valentine,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionLog {
    pub last_periodic: Option<DateTime<Utc>>,
    /// Year of the holiday occurrence that was last announced.
    pub holidays: HashMap<Holiday, i32>,
}

/// Per-user conversational and order state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    /// Becomes true once the trigger keyword has been seen.
    pub started: bool,
    pub state: ConversationState,
    pub language: String,
    pub order: Order,
    pub order_id: Uuid,
    pub edit: EditContext,
    pub address_mode: AddressInputMode,
    pub address_corrections: u32,
    pub rate: RateWindow,
    pub promotions: PromotionLog,
    pub has_completed_order: bool,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            started: false,
            state: ConversationState::Welcome,
            language: DEFAULT_LANGUAGE.to_string(),
            order: Order::default(),
            order_id: Uuid::new_v4(),
            edit: EditContext::Idle,
            address_mode: AddressInputMode::Normal,
            address_corrections: 0,
            rate: RateWindow::default(),
            promotions: PromotionLog::default(),
            has_completed_order: false,
        }
    }

    /// Drops the in-flight order and starts a new attempt under a fresh id.
    ///
    /// Language, rate and promotion bookkeeping are kept.
    pub fn begin_new_order(&mut self) {
        self.order = Order::default();
        self.order_id = Uuid::new_v4();
        self.edit = EditContext::Idle;
        self.address_mode = AddressInputMode::Normal;
        self.address_corrections = 0;
    }
}
