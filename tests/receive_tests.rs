mod common;

use aerogramme::application::messages;
use aerogramme::domain::ports::SharedClock;
use aerogramme::domain::message::Outbound;
use aerogramme::domain::session::{ConversationState, Holiday};
use aerogramme::interfaces::console;
use chrono::{TimeZone, Utc};
use common::{FORMATTED_ADDRESS, Harness, USER, WelcomeImage};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_receive_delivers_with_pacing() {
    let h = Harness::new();
    h.engine.receive(h.message("bonjour")).await;

    let started = Instant::now();
    h.engine.receive(h.message("1")).await;
    assert!(started.elapsed() >= Duration::from_secs(2));

    let sent = h.messenger.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|(to, _)| to == USER));
    let texts = h.messenger.texts();
    assert_eq!(texts[0], messages::WELCOME);
    assert_eq!(texts[1], messages::HELP);
    assert_eq!(texts[3], messages::GREETING);
}

#[tokio::test(start_paused = true)]
async fn test_failed_image_upload_does_not_drop_the_greeting() {
    let h = Harness::with_images(Box::new(WelcomeImage("en.jpg")));
    h.messenger.fail_media();

    h.engine.receive(h.message("bonjour")).await;
    h.engine.receive(h.message("1")).await;

    let sent = h.messenger.sent();
    assert!(
        sent.iter()
            .all(|(_, outbound)| matches!(outbound, Outbound::Text(_)))
    );
    let texts = h.messenger.texts();
    assert_eq!(texts.len(), 4);
    assert_eq!(texts[1], messages::HELP);
    assert_eq!(texts[3], messages::GREETING);
    assert_eq!(h.session().await.state, ConversationState::NameCollection);
}

#[tokio::test(start_paused = true)]
async fn test_failed_download_is_answered_with_an_apology() {
    let h = Harness::new();
    h.model.set_reply(Some(FORMATTED_ADDRESS));
    for text in ["bonjour", "1", "jean dupont", "24 rue du general de gaulle", "yes", "Bises"] {
        h.engine.receive(h.message(text)).await;
    }
    assert_eq!(h.session().await.state, ConversationState::ImageCollection);

    h.engine
        .receive(h.message("").with_attachment("broken-upload.jpg"))
        .await;
    assert_eq!(h.messenger.texts().last().map(String::as_str), Some(messages::APOLOGY));

    let session = h.session().await;
    assert_eq!(session.state, ConversationState::ImageCollection);
    assert!(session.order.image.is_none());
    assert_eq!(session.order.message.as_deref(), Some("Bises"));
}

#[tokio::test(start_paused = true)]
async fn test_holiday_nudge_survives_a_failed_turn() {
    const NUDGE: &str = "🎄 Christmas is near, send some warmth by post!";
    let h = Harness::new();
    h.model.set_reply(Some(FORMATTED_ADDRESS));
    for text in ["bonjour", "1", "jean dupont", "24 rue du general de gaulle", "yes", "Bises"] {
        h.engine.receive(h.message(text)).await;
    }
    let before = h.messenger.texts().len();

    h.clock.set(Utc.with_ymd_and_hms(2026, 12, 11, 10, 0, 0).unwrap());
    h.model.set_reply(Some(NUDGE));
    h.engine
        .receive(h.message("").with_attachment("broken-upload.jpg"))
        .await;

    let texts: Vec<String> = h.messenger.texts().into_iter().skip(before).collect();
    assert_eq!(texts, vec![NUDGE, messages::APOLOGY]);

    let session = h.session().await;
    assert_eq!(session.state, ConversationState::ImageCollection);
    assert_eq!(session.promotions.holidays.get(&Holiday::Christmas), Some(&2026));

    h.clock.set(Utc.with_ymd_and_hms(2026, 12, 11, 10, 5, 0).unwrap());
    let reply = h.send_photo("photo-1.jpg").await;
    assert!(!reply.contains_text(NUDGE));
}

#[tokio::test(start_paused = true)]
async fn test_console_feeds_lines_to_the_engine() {
    let h = Harness::new();
    let clock: SharedClock = h.clock.clone();
    let input: &[u8] = b"bonjour\n\n   \n1\njean dupont\n";

    console::run(&h.engine, USER, &clock, input).await.unwrap();

    let texts = h.messenger.texts();
    assert_eq!(texts.len(), 5);
    assert!(texts[4].contains("Jean Dupont"));
    assert_eq!(h.session().await.state, ConversationState::AddressCollection);
}

#[tokio::test(start_paused = true)]
async fn test_console_photo_command_attaches_the_file() {
    let h = Harness::new();
    h.model.set_reply(Some(FORMATTED_ADDRESS));
    let clock: SharedClock = h.clock.clone();
    let input: &[u8] =
        b"bonjour\n1\njean dupont\n24 rue du general de gaulle\nyes\nBises\n/photo holidays/beach.jpg\n";

    console::run(&h.engine, USER, &clock, input).await.unwrap();

    let session = h.session().await;
    assert_eq!(session.state, ConversationState::Confirmation);
    assert_eq!(
        session.order.image.map(|image| image.handle).as_deref(),
        Some("holidays/beach.jpg")
    );
}
