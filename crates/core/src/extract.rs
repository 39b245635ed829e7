use regex::Regex;

use crate::config::MatchConfig;

/// An origin/destination phrase pair pulled out of a query utterance.
/// Phrases are normalized text, not yet matched against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripPhrase {
    pub origin: String,
    pub destination: String,
}

type ExtractRule = Box<dyn Fn(&str) -> Option<TripPhrase> + Send + Sync>;

/// Ordered, first-match-wins list of pure phrase rules. New phrasing
/// patterns are added by appending a rule, without touching matching
/// logic downstream.
pub struct TripExtractor {
    rules: Vec<ExtractRule>,
}

impl TripExtractor {
    pub fn new(config: &MatchConfig) -> Self {
        let mut rules: Vec<ExtractRule> = Vec::new();

        // "DE <origen> A <destino>" / "DESDE <origen> A <destino>"
        let explicit = Regex::new(r"\bDE(?:SDE)? (.+?) A (.+)$").expect("valid trip pattern");
        rules.push(Box::new(move |text: &str| {
            explicit.captures(text).map(|captures| TripPhrase {
                origin: captures[1].trim().to_string(),
                destination: captures[2].trim().to_string(),
            })
        }));

        // "A <destino>" with the home city as implicit origin
        let destination_only = Regex::new(r"\bA (.+)$").expect("valid trip pattern");
        let home = config.home_city.clone();
        rules.push(Box::new(move |text: &str| {
            destination_only.captures(text).map(|captures| TripPhrase {
                origin: home.clone(),
                destination: captures[1].trim().to_string(),
            })
        }));

        // Maximal fallback: any non-empty text is a destination guess.
        if config.free_text_destination {
            let home = config.home_city.clone();
            rules.push(Box::new(move |text: &str| {
                if text.trim().is_empty() {
                    None
                } else {
                    Some(TripPhrase {
                        origin: home.clone(),
                        destination: text.trim().to_string(),
                    })
                }
            }));
        }

        Self { rules }
    }

    /// Expects already-normalized text. Returns `None` when no rule
    /// matches, which includes empty and whitespace-only input.
    pub fn extract(&self, normalized: &str) -> Option<TripPhrase> {
        self.rules.iter().find_map(|rule| rule(normalized))
    }
}
