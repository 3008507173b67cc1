//! Terminal transport: stdin lines in, stdout lines out.

use crate::application::engine::ConversationEngine;
use crate::domain::message::InboundMessage;
use crate::domain::ports::{Messenger, SharedClock};
use crate::domain::session::MediaRef;
use crate::error::{BotError, Result};
use crate::infrastructure::assets::image_mime_type;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::{Stdout, Write};
use std::path::Path;
use std::sync::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

/// Prefix of an input line that attaches a picture from disk.
pub const PHOTO_COMMAND: &str = "/photo ";

/// Prints outbound messages; media are shown as `[media <handle>] <caption>`.
pub struct ConsoleMessenger<W = Stdout> {
    out: Mutex<W>,
}

impl ConsoleMessenger<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleMessenger<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| BotError::Messenger("console output poisoned".to_string()))?;
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> Messenger for ConsoleMessenger<W> {
    async fn send_text(&self, _to: &str, text: &str) -> Result<()> {
        self.write_line(text)
    }

    async fn send_media(&self, _to: &str, media: &MediaRef, caption: Option<&str>) -> Result<()> {
        match caption {
            Some(caption) => self.write_line(&format!("[media {}] {caption}", media.handle)),
            None => self.write_line(&format!("[media {}]", media.handle)),
        }
    }

    async fn download_media(&self, message: &InboundMessage) -> Result<MediaRef> {
        let handle = message
            .attachment
            .as_deref()
            .ok_or_else(|| BotError::Messenger("message has no attachment".to_string()))?;
        let path = Path::new(handle);
        if !tokio::fs::metadata(path).await?.is_file() {
            return Err(BotError::Messenger(format!("{handle} is not a file")));
        }
        let mime_type = image_mime_type(path)
            .ok_or_else(|| BotError::Messenger(format!("{handle} is not a supported image")))?;
        Ok(MediaRef {
            handle: handle.to_string(),
            mime_type: mime_type.to_string(),
        })
    }
}

/// Turns one input line into an inbound message; `/photo <path>` attaches
/// the file at `<path>`.
pub fn parse_line(sender: &str, line: &str, timestamp: DateTime<Utc>) -> InboundMessage {
    match line.strip_prefix(PHOTO_COMMAND) {
        Some(path) => InboundMessage::text(sender, "", timestamp).with_attachment(path.trim()),
        None => InboundMessage::text(sender, line, timestamp),
    }
}

/// Feeds every non-blank line to the engine until end of input.
pub async fn run<R>(engine: &ConversationEngine, user: &str, clock: &SharedClock, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    info!(user, "console chat started");
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        engine.receive(parse_line(user, &line, clock.now())).await;
    }
    info!(user, "console chat finished");
    Ok(())
}
