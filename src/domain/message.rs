use super::session::MediaRef;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A message received from the messaging transport.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub sender_id: String,
    pub body: String,
    /// Transport-specific handle to attached media, resolved with
    /// [`Messenger::download_media`](super::ports::Messenger::download_media).
    pub attachment: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    pub fn text(sender_id: impl Into<String>, body: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender_id: sender_id.into(),
            body: body.into(),
            attachment: None,
            timestamp,
        }
    }

    pub fn with_attachment(mut self, handle: impl Into<String>) -> Self {
        self.attachment = Some(handle.into());
        self
    }

    pub fn has_media(&self) -> bool {
        self.attachment.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Text(String),
    Media {
        media: MediaRef,
        caption: Option<String>,
    },
}

/// One outbound send, preceded by a pacing pause.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub delay: Duration,
    pub outbound: Outbound,
}

/// Ordered sends produced by one turn of the conversation.
///
/// Handlers only describe what to send; the delays are applied when the
/// reply is delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    steps: Vec<Step>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.text_after(Duration::ZERO, text);
    }

    pub fn text_after(&mut self, delay: Duration, text: impl Into<String>) {
        self.steps.push(Step {
            delay,
            outbound: Outbound::Text(text.into()),
        });
    }

    pub fn media(&mut self, media: MediaRef, caption: Option<String>) {
        self.steps.push(Step {
            delay: Duration::ZERO,
            outbound: Outbound::Media { media, caption },
        });
    }

    pub fn append(&mut self, other: Reply) {
        self.steps.extend(other.steps);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Text bodies and media captions, in send order.
    pub fn texts(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match &step.outbound {
                Outbound::Text(text) => Some(text.as_str()),
                Outbound::Media { caption, .. } => caption.as_deref(),
            })
            .collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|text| text.contains(needle))
    }
}
