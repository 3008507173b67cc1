use crate::domain::session::RateWindow;
use chrono::{DateTime, TimeDelta, Utc};

pub const DEFAULT_MESSAGE_LIMIT: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// This message crossed the limit; the user gets one notice.
    JustBlocked,
    /// Already over the limit; drop silently.
    Blocked,
}

impl RateDecision {
    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }
}

/// Per-session message budget over a window that restarts once it is a
/// full window old.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    limit: u32,
    window: TimeDelta,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_LIMIT, TimeDelta::hours(24))
    }
}

impl RateLimiter {
    pub fn new(limit: u32, window: TimeDelta) -> Self {
        Self { limit, window }
    }

    /// Counts one message against the budget.
    pub fn check(&self, rate: &mut RateWindow, now: DateTime<Utc>) -> RateDecision {
        let expired = rate
            .window_start
            .is_none_or(|start| now - start >= self.window);
        if expired {
            rate.message_count = 0;
            rate.blocked = false;
            rate.window_start = Some(now);
        }

        rate.message_count = rate.message_count.saturating_add(1);
        if rate.blocked {
            return RateDecision::Blocked;
        }
        if rate.message_count > self.limit {
            rate.blocked = true;
            return RateDecision::JustBlocked;
        }
        RateDecision::Allowed
    }
}
