use rust_decimal::Decimal;

/// Upper-cases the first letter of each hyphen-separated part and
/// lower-cases the rest: `"champs-élysées"` becomes `"Champs-Élysées"`.
pub fn capitalize_word(word: &str) -> String {
    word.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

/// Capitalizes every whitespace-separated word and collapses the spacing.
pub fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders an amount in minor units with two decimals: `500` is `5.00`.
pub fn display_amount(unit_amount: i64) -> String {
    Decimal::new(unit_amount, 2).to_string()
}

/// Substitutes `{key}` placeholders.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("jean dupont"), "Jean Dupont");
        assert_eq!(capitalize_words("  JEAN   dUPONT "), "Jean Dupont");
        assert_eq!(capitalize_words("jean-pierre"), "Jean-Pierre");
        assert_eq!(capitalize_words("états-unis"), "États-Unis");
        assert_eq!(capitalize_words("29bis"), "29bis");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn test_display_amount() {
        assert_eq!(display_amount(500), "5.00");
        assert_eq!(display_amount(449), "4.49");
        assert_eq!(display_amount(1200), "12.00");
        assert_eq!(display_amount(5), "0.05");
    }

    #[test]
    fn test_fill_replaces_every_occurrence() {
        let out = fill("{name} / {name} / {city}", &[("name", "Ana"), ("city", "Lima")]);
        assert_eq!(out, "Ana / Ana / Lima");
        assert_eq!(fill("{missing}", &[]), "{missing}");
    }
}
