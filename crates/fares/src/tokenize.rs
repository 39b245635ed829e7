use std::collections::HashSet;

use ruta_core::text::normalize;

/// Splits a locality string into its meaningful tokens: normalize, split
/// on whitespace, drop configured noise words. An empty result means the
/// locality is unidentifiable; callers must never treat it as matching
/// everything.
pub fn tokenize(locality: &str, noise_words: &HashSet<String>) -> HashSet<String> {
    normalize(locality)
        .split_whitespace()
        .filter(|token| !noise_words.contains(*token))
        .map(str::to_string)
        .collect()
}
