//! The conversation core.
//!
//! [`engine::ConversationEngine`] drives one session per user through the
//! ordering flow. Language understanding, address formatting, rate limiting
//! and promotions are separate pieces it composes; every outside dependency
//! arrives through the traits in [`crate::domain::ports`].

pub mod address;
pub mod classifier;
pub mod delivery;
pub mod engine;
pub mod messages;
pub mod promotion;
pub mod rate_limit;
pub mod text;
