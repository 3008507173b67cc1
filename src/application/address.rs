//! Address canonicalization.
//!
//! The model rewrites free text into `Street, City, Postal Code, Country`.
//! When it cannot be reached, a token-based parser produces the same shape.

use super::text::{capitalize_word, capitalize_words};
use crate::domain::ports::SharedLanguageModel;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

const FORMAT_TOKENS: u32 = 100;

const FORMAT_PROMPT: &str = r#"Reformat this address into the structure: Street Number, Street Name, City, Postal Code, Country.

Formatting Rules:
- Insert commas ONLY between non-empty segments
- DO NOT add empty commas (e.g., ", , , ,") - skip missing parts entirely
- Capitalize the FIRST LETTER of each word in street name, city, and country (Title Case)
- Keep postal code as provided (no changes) - treat state/province codes as part of postal code
- Handle Bis/Ter/Letters: Format as "29 Bis," or "29 Ter," or "29 A," (space + capital + comma after)
- If no country is provided, detect it from the postal code and add it
- For US/Canadian addresses: Keep state/province code with postal code (e.g., "NM 87505", "ON K1A 0A6")
- Do NOT change spelling, only formatting and capitalization
- Make sure EVERY word starts with a capital letter in street, city, and country

Examples:
Input: "24 rue du General de Gaulle versailles sur orge 94782 france"
Output: "24, Rue Du General De Gaulle, Versailles Sur Orge, 94782, France"

Input: "29bis avenue mozart paris 75016"
Output: "29 Bis, Avenue Mozart, Paris, 75016, France"

Input: "10 avenue des champs-élysées france"
Output: "10, Avenue Des Champs-Élysées, France"

Input: "1501 luisa ct santa fe nm 87505 états-unis"
Output: "1501, Luisa Ct, Santa Fe, NM 87505, États-Unis"

Input: "123 main street toronto on m5v 3a8 canada"
Output: "123, Main Street, Toronto, ON M5V 3A8, Canada"

Return only the formatted address, nothing else."#;

static REGION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}$").unwrap());
static US_ZIP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());
static CA_POSTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][0-9][A-Za-z][0-9][A-Za-z][0-9]$").unwrap());
static CA_FSA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z][0-9][A-Za-z]$").unwrap());
static CA_LDU: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9][A-Za-z][0-9]$").unwrap());
static NUMERIC_POSTAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4,5}$").unwrap());
static UNIT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)(bis|ter|[a-z])\b").unwrap());

pub struct AddressFormatter {
    model: SharedLanguageModel,
}

impl AddressFormatter {
    pub fn new(model: SharedLanguageModel) -> Self {
        Self { model }
    }

    /// Canonical form of `raw`, from the model when available.
    pub async fn format(&self, raw: &str) -> String {
        match self.model.complete(FORMAT_PROMPT, raw, FORMAT_TOKENS).await {
            Ok(formatted) if !formatted.trim().is_empty() => tidy_commas(formatted.trim()),
            Ok(_) => fallback_format(raw),
            Err(e) => {
                warn!(error = %e, "address formatting failed, using fallback parser");
                fallback_format(raw)
            }
        }
    }
}

/// Drops empty segments and normalizes the separator to `", "`.
pub fn tidy_commas(address: &str) -> String {
    join_segments(address.split(',').map(str::trim))
}

/// Deterministic formatter used when the model is unavailable.
///
/// Inputs with fewer than three tokens are returned as typed, with only
/// stray commas tidied.
pub fn fallback_format(raw: &str) -> String {
    let tokens: Vec<&str> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() < 3 {
        return tidy_commas(raw);
    }

    let parts = split_north_american(&tokens).unwrap_or_else(|| split_standard(&tokens));
    let street = UNIT_SUFFIX
        .replace_all(&capitalize_words(&parts.street.join(" ")), |caps: &regex::Captures| {
            format!("{} {}", &caps[1], capitalize_word(&caps[2]))
        })
        .into_owned();

    join_segments(
        [
            street,
            capitalize_words(&parts.city.join(" ")),
            parts.postal,
            parts.country,
        ]
        .iter()
        .map(String::as_str),
    )
}

struct AddressParts<'a> {
    street: &'a [&'a str],
    city: &'a [&'a str],
    postal: String,
    country: String,
}

/// `... CITY CITY RR 12345 [Country]` or `... RR A1A 1A1 [Country]`.
fn split_north_american<'a>(tokens: &'a [&'a str]) -> Option<AddressParts<'a>> {
    for country_len in [0usize, 1] {
        let Some(end) = tokens.len().checked_sub(country_len) else {
            continue;
        };
        let head = &tokens[..end];
        let Some((region_at, postal, canadian)) = match_region_postal(head) else {
            continue;
        };
        if region_at == 0 {
            continue;
        }
        let city_from = region_at.saturating_sub(2);
        let country = match tokens.get(end) {
            Some(explicit) => capitalize_word(explicit),
            None if canadian => "Canada".to_string(),
            None => "United States".to_string(),
        };
        return Some(AddressParts {
            street: &tokens[..city_from],
            city: &tokens[city_from..region_at],
            postal: format!("{} {}", head[region_at].to_uppercase(), postal),
            country,
        });
    }
    None
}

/// Finds a trailing region code and postal code; returns the region index,
/// the upper-cased postal code, and whether it is Canadian.
fn match_region_postal(head: &[&str]) -> Option<(usize, String, bool)> {
    let n = head.len();
    if n >= 3
        && REGION.is_match(head[n - 3])
        && CA_FSA.is_match(head[n - 2])
        && CA_LDU.is_match(head[n - 1])
    {
        let postal = format!("{} {}", head[n - 2], head[n - 1]).to_uppercase();
        return Some((n - 3, postal, true));
    }
    if n >= 2 && REGION.is_match(head[n - 2]) {
        let last = head[n - 1];
        if US_ZIP.is_match(last) {
            return Some((n - 2, last.to_string(), false));
        }
        if CA_POSTAL.is_match(last) {
            let upper = last.to_uppercase();
            return Some((n - 2, format!("{} {}", &upper[..3], &upper[3..]), true));
        }
    }
    None
}

/// `STREET... CITY CITY POSTAL COUNTRY`; a trailing numeric postal code
/// means the country was left out and is inferred from its shape.
fn split_standard<'a>(tokens: &'a [&'a str]) -> AddressParts<'a> {
    let n = tokens.len();
    let last = tokens[n - 1];
    if NUMERIC_POSTAL.is_match(last) || n == 3 {
        let city_from = (n - 1).saturating_sub(2).max(1);
        return AddressParts {
            street: &tokens[..city_from],
            city: &tokens[city_from..n - 1],
            postal: last.to_string(),
            country: country_for_postal(last).to_string(),
        };
    }
    let city_from = (n - 2).saturating_sub(2).max(1);
    AddressParts {
        street: &tokens[..city_from],
        city: &tokens[city_from..n - 2],
        postal: tokens[n - 2].to_string(),
        country: capitalize_word(last),
    }
}

fn country_for_postal(postal: &str) -> &'static str {
    if postal.len() == 4 && postal.chars().all(|c| c.is_ascii_digit()) {
        "Belgium"
    } else {
        "France"
    }
}

fn join_segments<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    segments
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
