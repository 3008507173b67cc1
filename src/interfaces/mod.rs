//! Outer surfaces: the terminal chat and the payment webhook.

pub mod console;
pub mod webhook;
