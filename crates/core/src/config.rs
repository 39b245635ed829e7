use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::text::normalize;

/// Tunable matching parameters. Everything the pipeline compares against
/// lives here so tests and deployments can swap word lists and thresholds
/// without touching matching logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Default origin when the user only names a destination.
    pub home_city: String,
    /// Minimum per-token similarity for a fuzzy token match.
    pub token_threshold: f64,
    /// Whole-string fallback score at or above which a destination is
    /// accepted without asking the user.
    pub confident_threshold: f64,
    /// Whole-string fallback score at or above which a single candidate
    /// is offered for confirmation instead of being discarded.
    pub suggest_threshold: f64,
    /// When true, free text that matches no extraction pattern is treated
    /// as a destination guess from the home city.
    pub free_text_destination: bool,
    /// Tokens excluded from locality matching: administrative qualifiers,
    /// short articles and prepositions.
    pub noise_words: HashSet<String>,
    pub greeting_phrases: Vec<String>,
    pub farewell_phrases: Vec<String>,
    pub affirmative_phrases: Vec<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            home_city: "CORDOBA".to_string(),
            token_threshold: 0.8,
            confident_threshold: 0.92,
            suggest_threshold: 0.7,
            free_text_destination: true,
            noise_words: [
                "TERMINAL", "CENTRO", "PROVINCIA", "CIUDAD", "ESTACION", "BARRIO", "DE", "DEL",
                "LA", "LAS", "EL", "LOS", "A", "AL", "EN",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            greeting_phrases: phrases(&["HOLA", "BUENAS", "BUEN DIA", "BUENAS TARDES", "QUE TAL"]),
            farewell_phrases: phrases(&["CHAU", "GRACIAS", "ADIOS", "HASTA LUEGO", "NOS VEMOS"]),
            affirmative_phrases: phrases(&["SI", "DALE", "CLARO", "OK", "YES", "AFIRMATIVO"]),
        }
    }
}

impl MatchConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed reading config file: {}", path.as_ref().display()))?;
        let config: Self = serde_json::from_str(&raw).context("failed parsing match config")?;
        Ok(config.canonicalized())
    }

    /// Runs every configured word and phrase through the normalizer so
    /// comparisons against normalized utterances hold regardless of how
    /// the config file was typed.
    pub fn canonicalized(mut self) -> Self {
        self.home_city = normalize(&self.home_city);
        self.noise_words = self.noise_words.iter().map(|w| normalize(w)).collect();
        for list in [
            &mut self.greeting_phrases,
            &mut self.farewell_phrases,
            &mut self.affirmative_phrases,
        ] {
            for phrase in list.iter_mut() {
                *phrase = normalize(phrase);
            }
            list.retain(|phrase| !phrase.is_empty());
        }
        self
    }
}

fn phrases(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_already_canonical() {
        let config = MatchConfig::default();
        let canonical = config.clone().canonicalized();
        assert_eq!(config.home_city, canonical.home_city);
        assert_eq!(config.noise_words, canonical.noise_words);
        assert_eq!(config.greeting_phrases, canonical.greeting_phrases);
    }

    #[test]
    fn canonicalizes_accented_config_values() {
        let config = MatchConfig {
            home_city: "Córdoba".to_string(),
            affirmative_phrases: vec!["Sí".to_string()],
            ..MatchConfig::default()
        }
        .canonicalized();

        assert_eq!(config.home_city, "CORDOBA");
        assert!(config.affirmative_phrases.contains(&"SI".to_string()));
    }
}
