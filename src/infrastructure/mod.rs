//! Adapters for the ports declared in [`crate::domain::ports`].

pub mod assets;
pub mod clock;
pub mod in_memory;
pub mod openai;
pub mod sheets;
pub mod stripe;
