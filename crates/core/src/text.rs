use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalizes arbitrary text for matching: uppercase, accent-free,
/// ASCII-alphanumeric only, whitespace collapsed. Total and idempotent;
/// empty input yields an empty string.
pub fn normalize(input: &str) -> String {
    let stripped: String = input
        .to_uppercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rough title-casing for reply text ("CARLOS PAZ" -> "Carlos Paz").
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
