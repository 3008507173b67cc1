use crate::domain::message::{Outbound, Reply};
use crate::domain::ports::Messenger;
use tracing::{debug, warn};

/// Sends each step in order, sleeping for its delay first.
///
/// A failed send is logged and skipped; the remaining steps still go out.
/// Returns how many steps failed.
pub async fn deliver(messenger: &dyn Messenger, to: &str, reply: Reply) -> usize {
    let mut failed = 0;
    for step in reply.into_steps() {
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        let sent = match &step.outbound {
            Outbound::Text(text) => messenger.send_text(to, text).await,
            Outbound::Media { media, caption } => {
                messenger.send_media(to, media, caption.as_deref()).await
            }
        };
        match sent {
            Ok(()) => debug!(to, "outbound step delivered"),
            Err(e) => {
                warn!(to, error = %e, "outbound step failed, continuing");
                failed += 1;
            }
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::InboundMessage;
    use crate::domain::session::MediaRef;
    use crate::error::{BotError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, Duration)>>,
        fail_on: Option<&'static str>,
        origin: Mutex<Option<Instant>>,
    }

    impl Recorder {
        fn record(&self, what: String) -> Result<()> {
            if self.fail_on == Some(what.as_str()) {
                return Err(BotError::Messenger("channel closed".to_string()));
            }
            let origin = *self.origin.lock().unwrap().get_or_insert_with(Instant::now);
            self.sent.lock().unwrap().push((what, origin.elapsed()));
            Ok(())
        }
    }

    #[async_trait]
    impl Messenger for Recorder {
        async fn send_text(&self, _to: &str, text: &str) -> Result<()> {
            self.record(text.to_string())
        }

        async fn send_media(&self, _to: &str, media: &MediaRef, _caption: Option<&str>) -> Result<()> {
            self.record(media.handle.clone())
        }

        async fn download_media(&self, _message: &InboundMessage) -> Result<MediaRef> {
            Err(BotError::Messenger("unsupported".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_are_sent_in_order_after_their_delays() {
        let recorder = Recorder::default();
        *recorder.origin.lock().unwrap() = Some(Instant::now());

        let mut reply = Reply::new();
        reply.text("first");
        reply.media(
            MediaRef {
                handle: "en.jpg".to_string(),
                mime_type: "image/jpeg".to_string(),
            },
            Some("caption".to_string()),
        );
        reply.text_after(Duration::from_secs(2), "second");

        assert_eq!(deliver(&recorder, "u1", reply).await, 0);

        let sent = recorder.sent.lock().unwrap();
        let names: Vec<&str> = sent.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(names, vec!["first", "en.jpg", "second"]);
        assert!(sent[1].1 < Duration::from_secs(2));
        assert!(sent[2].1 >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_step_does_not_stop_delivery() {
        let recorder = Recorder {
            fail_on: Some("second"),
            ..Default::default()
        };
        let mut reply = Reply::new();
        reply.text("first");
        reply.text("second");
        reply.text("third");

        assert_eq!(deliver(&recorder, "u1", reply).await, 1);
        let sent = recorder.sent.lock().unwrap();
        let names: Vec<&str> = sent.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(names, vec!["first", "third"]);
    }
}
