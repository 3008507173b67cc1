//! Conversation data and the capabilities the core depends on.

pub mod intent;
pub mod message;
pub mod order;
pub mod ports;
pub mod session;
