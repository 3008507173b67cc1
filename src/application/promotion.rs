use super::messages;
use crate::domain::message::Reply;
use crate::domain::ports::SharedLanguageModel;
use crate::domain::session::{Holiday, Session};
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use tracing::{debug, info};

const LEAD_DAYS: i64 = 14;
const PERIODIC_INTERVAL_DAYS: i64 = 35;
const PROMOTION_TOKENS: u32 = 100;
const PROMOTION_REQUEST: &str = "Write the message.";

impl Holiday {
    pub const ALL: [Holiday; 3] = [Holiday::Christmas, Holiday::NewYear, Holiday::Valentine];

    fn month_day(self) -> (u32, u32) {
        match self {
            Holiday::Christmas => (12, 25),
            Holiday::NewYear => (1, 1),
            Holiday::Valentine => (2, 14),
        }
    }

    /// The first occurrence on or after `today`.
    pub fn next_occurrence(self, today: NaiveDate) -> NaiveDate {
        let (month, day) = self.month_day();
        let this_year = NaiveDate::from_ymd_opt(today.year(), month, day).unwrap_or(today);
        if this_year >= today {
            this_year
        } else {
            NaiveDate::from_ymd_opt(today.year() + 1, month, day).unwrap_or(today)
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Holiday::Christmas => {
                "Christmas is coming up in two weeks! Generate a festive, warm, encouraging message (with emojis) inviting the user to send a holiday postcard to loved ones via Aerogramme. The message must be in the user's chosen language: "
            }
            Holiday::NewYear => {
                "New Year's Day is coming up in two weeks! Generate a cheerful, inspiring message (with emojis) inviting the user to send a New Year postcard to friends or family via Aerogramme. The message must be in the user's chosen language: "
            }
            Holiday::Valentine => {
                "Valentine's Day is coming up in two weeks! Generate a loving, sweet message (with emojis) inviting the user to send a Valentine's postcard to someone special via Aerogramme. The message must be in the user's chosen language: "
            }
        }
    }
}

/// Sends festive and recurring nudges ahead of the conversation reply.
///
/// Nothing here changes the conversation state, and nothing here fails:
/// a nudge that cannot be produced is skipped and retried on a later message.
pub struct PromotionScheduler {
    model: SharedLanguageModel,
}

impl PromotionScheduler {
    pub fn new(model: SharedLanguageModel) -> Self {
        Self { model }
    }

    pub async fn run(&self, session: &mut Session, now: DateTime<Utc>) -> Reply {
        let mut reply = Reply::new();
        let today = now.date_naive();

        for holiday in Holiday::ALL {
            let date = holiday.next_occurrence(today);
            if (date - today).num_days() != LEAD_DAYS {
                continue;
            }
            if session.promotions.holidays.get(&holiday) == Some(&date.year()) {
                continue;
            }
            let system_prompt = format!(
                "{}{}. Do NOT mention time or frequency. Not more than five lines. Return only the message text.",
                holiday.prompt(),
                session.language
            );
            match self
                .model
                .complete(&system_prompt, PROMOTION_REQUEST, PROMOTION_TOKENS)
                .await
            {
                Ok(text) if !text.trim().is_empty() => {
                    reply.text(text.trim());
                    session.promotions.holidays.insert(holiday, date.year());
                    info!(user = %session.user_id, ?holiday, "holiday promotion sent");
                }
                Ok(_) => debug!(?holiday, "empty holiday promotion, skipping"),
                Err(e) => debug!(?holiday, error = %e, "holiday promotion unavailable"),
            }
        }

        let due = session.has_completed_order
            && session
                .promotions
                .last_periodic
                .is_none_or(|last| now - last >= TimeDelta::days(PERIODIC_INTERVAL_DAYS));
        if due {
            reply.text(messages::periodic_promotion(&session.language));
            session.promotions.last_periodic = Some(now);
        }

        reply
    }
}
