use crate::config::MatchConfig;
use crate::models::Intent;

/// Labels a normalized utterance. Greeting phrases are checked before
/// farewell phrases; first match wins; everything else is a trip query.
/// Greeting and farewell short-circuit the pipeline entirely, so the
/// fare table is never consulted for them.
pub fn classify_intent(normalized: &str, config: &MatchConfig) -> Intent {
    if matches_any_phrase(normalized, &config.greeting_phrases) {
        return Intent::Greeting;
    }
    if matches_any_phrase(normalized, &config.farewell_phrases) {
        return Intent::Farewell;
    }
    Intent::TripQuery
}

/// Whether the user accepted a pending destination suggestion.
pub fn is_affirmative(normalized: &str, config: &MatchConfig) -> bool {
    matches_any_phrase(normalized, &config.affirmative_phrases)
}

/// A phrase matches when it equals the whole utterance, appears as a
/// standalone token, or (for multi-word phrases) is contained verbatim.
fn matches_any_phrase(text: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|phrase| {
        text == phrase
            || text.split_whitespace().any(|token| token == phrase)
            || (phrase.contains(' ') && text.contains(phrase.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize;

    fn classify(raw: &str) -> Intent {
        classify_intent(&normalize(raw), &MatchConfig::default())
    }

    #[test]
    fn classifies_greetings() {
        assert_eq!(classify("hola"), Intent::Greeting);
        assert_eq!(classify("¡Buenas tardes!"), Intent::Greeting);
    }

    #[test]
    fn classifies_farewells() {
        assert_eq!(classify("gracias"), Intent::Farewell);
        assert_eq!(classify("chau, hasta luego"), Intent::Farewell);
    }

    #[test]
    fn greeting_wins_over_farewell() {
        // both sets are triggered; greeting is checked first
        assert_eq!(classify("hola y gracias"), Intent::Greeting);
    }

    #[test]
    fn everything_else_is_a_trip_query() {
        assert_eq!(classify("de Cordoba a Carlos Paz"), Intent::TripQuery);
        assert_eq!(classify("quiero ir a Rio Cuarto"), Intent::TripQuery);
    }

    #[test]
    fn phrase_must_be_standalone_token() {
        // "GRACIAS" inside another word must not trigger a farewell
        assert_eq!(classify("viajo a graciasnia"), Intent::TripQuery);
    }

    #[test]
    fn detects_affirmative_replies() {
        let config = MatchConfig::default();
        assert!(is_affirmative(&normalize("sí"), &config));
        assert!(is_affirmative(&normalize("dale"), &config));
        assert!(!is_affirmative(&normalize("no, era otro"), &config));
    }
}
