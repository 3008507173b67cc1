//! Closed result sets for every classification the bot asks for.
//!
//! Model output is free text; it is coerced into one of these enums before
//! any caller sees it, with anything unrecognized mapped to the neutral member.

use serde::{Deserialize, Serialize};

/// Languages reachable through the numbered menu, in menu order.
pub const LANGUAGE_SHORTCUTS: [(&str, &str); 5] =
    [("1", "en"), ("2", "fr"), ("3", "es"), ("4", "hi"), ("5", "ja")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
    Unclear,
}

impl YesNo {
    pub fn from_model_output(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "yes" => Self::Yes,
            "no" => Self::No,
            _ => Self::Unclear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalCommand {
    Restart,
    Language,
    None,
}

impl GlobalCommand {
    pub fn from_model_output(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "restart" => Self::Restart,
            "language" => Self::Language,
            _ => Self::None,
        }
    }
}

/// Resolves the numbered language menu without asking the model.
pub fn language_from_shortcut(text: &str) -> Option<&'static str> {
    let text = text.trim();
    LANGUAGE_SHORTCUTS
        .iter()
        .find(|(digit, _)| *digit == text)
        .map(|(_, code)| *code)
}

/// Accepts a two or three letter ISO-639 code, nothing else.
pub fn parse_language_code(raw: &str) -> Option<String> {
    let code = normalize(raw);
    let valid = (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_lowercase());
    valid.then_some(code)
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
        .trim()
        .to_lowercase()
}
