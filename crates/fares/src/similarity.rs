use std::collections::HashSet;

/// Two tokens match when equal or when their normalized Levenshtein
/// similarity meets the threshold. Symmetric, reflexive for non-empty
/// tokens, monotone in edit distance.
pub fn tokens_match(a: &str, b: &str, threshold: f64) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || strsim::normalized_levenshtein(a, b) >= threshold
}

/// Covering predicate: every query token must be explained by at least
/// one row token (exactly or fuzzily). The row may carry extra tokens
/// the query omitted; the asymmetry is deliberate, query tokens drive
/// the search. An empty query set covers nothing.
pub fn set_covers(
    row_tokens: &HashSet<String>,
    query_tokens: &HashSet<String>,
    threshold: f64,
) -> bool {
    !query_tokens.is_empty()
        && query_tokens
            .iter()
            .all(|query| row_tokens.iter().any(|row| tokens_match(row, query, threshold)))
}

/// Whole-string score for the fallback path: containment either way is
/// a full match, otherwise Jaro-Winkler. Both inputs must already be
/// normalized.
pub fn phrase_score(query: &str, candidate: &str) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    if candidate.contains(query) || query.contains(candidate) {
        return 1.0;
    }
    strsim::jaro_winkler(query, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tokens: &[&str]) -> HashSet<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn reflexive_and_symmetric() {
        for token in ["CORDOBA", "PAZ", "X"] {
            assert!(tokens_match(token, token, 0.8));
        }
        assert_eq!(
            tokens_match("CORDOVA", "CORDOBA", 0.8),
            tokens_match("CORDOBA", "CORDOVA", 0.8)
        );
    }

    #[test]
    fn tolerates_single_typo() {
        // one edit over seven characters: similarity ~0.857
        assert!(tokens_match("CORDOVA", "CORDOBA", 0.8));
        assert!(!tokens_match("CORDOBA", "ROSARIO", 0.8));
    }

    #[test]
    fn empty_tokens_never_match() {
        assert!(!tokens_match("", "CORDOBA", 0.8));
        assert!(!tokens_match("", "", 0.8));
    }

    #[test]
    fn covering_allows_extra_row_tokens() {
        let row = set(&["RIO", "CUARTO", "TERMINAL"]);
        let query = set(&["RIO", "CUARTO"]);
        assert!(set_covers(&row, &query, 0.8));
        // but every query token must be explained
        assert!(!set_covers(&set(&["RIO"]), &query, 0.8));
    }

    #[test]
    fn covering_is_monotone_in_row_tokens() {
        let query = set(&["CARLOS", "PAZ"]);
        let mut row = set(&["CARLOS", "PAZ"]);
        assert!(set_covers(&row, &query, 0.8));
        row.insert("VILLA".to_string());
        row.insert("SUR".to_string());
        assert!(set_covers(&row, &query, 0.8));
    }

    #[test]
    fn empty_query_set_covers_nothing() {
        assert!(!set_covers(&set(&["CORDOBA"]), &set(&[]), 0.8));
    }

    #[test]
    fn phrase_score_rewards_containment() {
        assert_eq!(phrase_score("CARLOS PAZ", "VILLA CARLOS PAZ"), 1.0);
        assert!(phrase_score("CARLOS PAS", "CARLOS PAZ") > 0.9);
        assert!(phrase_score("CARLOS PAZ", "RIO CUARTO") < 0.6);
    }
}
