//! Slug generation: free-text topic → ordered wiki-subdomain candidates.
//!
//! Pure string work, no network I/O. Candidates are emitted most-specific
//! first; the orchestrator probes them in order and stops at the first
//! live wiki, so ordering here directly controls worst-case latency.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::BridgeError;

/// Tokens dropped before building the primary candidates. The unfiltered
/// token list is still used for fallback candidates, so an all-stopword
/// topic never fails here.
const STOPWORDS: [&str; 10] = ["the", "a", "an", "and", "or", "of", "to", "in", "on", "for"];

/// Roman numerals treated as sequel markers when they stand alone.
const ROMAN_NUMERALS: [&str; 10] = ["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x"];

/// Minimum character count for a usable subdomain candidate.
const MIN_SLUG_LEN: usize = 3;

fn non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\W+").expect("static regex"))
}

/// Splits a topic into lowercase word tokens.
fn tokenize(topic: &str) -> Vec<String> {
    non_word()
        .replace_all(&topic.to_lowercase(), " ")
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// Pushes both join styles (bare and hyphenated) of a token subset.
fn push_joined(out: &mut Vec<String>, tokens: &[String]) {
    if tokens.is_empty() {
        return;
    }
    out.push(tokens.concat());
    out.push(tokens.join("-"));
}

/// Generates the ordered, deduplicated slug candidates for a topic.
///
/// Candidate order is most-complete first: the full cleaned join leads,
/// then variants that strip sequel markers and numbers, then progressively
/// truncated prefixes, then the acronym. Deduplication is case-insensitive
/// (tokens are already lowercased) and anything shorter than three
/// characters is dropped.
///
/// # Errors
///
/// Returns [`BridgeError::EmptyTopic`] when tokenization yields nothing —
/// the only way slug generation can fail.
pub fn slug_candidates(topic: &str) -> Result<Vec<String>, BridgeError> {
    let tokens = tokenize(topic);
    if tokens.is_empty() {
        return Err(BridgeError::EmptyTopic);
    }

    let cleaned: Vec<String> = tokens
        .iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .cloned()
        .collect();

    let mut raw: Vec<String> = Vec::new();

    push_joined(&mut raw, &cleaned);
    push_joined(&mut raw, &tokens);

    if cleaned.len() >= 2 {
        push_joined(&mut raw, &cleaned[..2]);
    }
    if tokens.len() >= 2 {
        push_joined(&mut raw, &tokens[..2]);
    }

    let no_roman: Vec<String> = cleaned
        .iter()
        .filter(|t| !ROMAN_NUMERALS.contains(&t.as_str()))
        .cloned()
        .collect();
    if no_roman.len() != cleaned.len() {
        push_joined(&mut raw, &no_roman);
    }

    let no_numeric: Vec<String> = cleaned
        .iter()
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .cloned()
        .collect();
    if no_numeric.len() != cleaned.len() {
        push_joined(&mut raw, &no_numeric);
    }

    // "book2" → "book"; tokens that were pure digits vanish entirely.
    let digit_stripped: Vec<String> = cleaned
        .iter()
        .map(|t| t.trim_end_matches(|c: char| c.is_ascii_digit()).to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if digit_stripped != cleaned {
        push_joined(&mut raw, &digit_stripped);
    }

    // Progressive truncation from the right, longest prefix first.
    for n in (1..cleaned.len()).rev() {
        push_joined(&mut raw, &cleaned[..n]);
    }

    if (2..=6).contains(&cleaned.len()) {
        let acronym: String = cleaned
            .iter()
            .filter_map(|t| t.chars().find(|c| c.is_ascii_alphanumeric()))
            .collect();
        raw.push(acronym);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let candidates: Vec<String> = raw
        .into_iter()
        .filter(|c| c.chars().count() >= MIN_SLUG_LEN)
        .filter(|c| seen.insert(c.clone()))
        .collect();

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_specific_candidate_first() {
        let slugs = slug_candidates("The Eminence in Shadow").unwrap();
        assert_eq!(slugs[0], "eminenceshadow");
        assert!(slugs.contains(&"eminence-shadow".to_string()));
    }

    #[test]
    fn test_roman_numeral_variant_present() {
        let slugs = slug_candidates("Re:Zero III").unwrap();
        assert!(slugs.contains(&"rezero".to_string()));
        // Full join still comes first.
        assert_eq!(slugs[0], "rezeroiii");
    }

    #[test]
    fn test_minimum_length_invariant() {
        let slugs = slug_candidates("Go to War IV").unwrap();
        assert!(
            slugs.iter().all(|s| s.chars().count() >= 3),
            "short slug in {slugs:?}"
        );
    }

    #[test]
    fn test_minimum_length_counts_characters_not_bytes() {
        // "嵐" is one character (three bytes in UTF-8): too short.
        let slugs = slug_candidates("嵐").unwrap();
        assert!(slugs.is_empty(), "unexpected slugs {slugs:?}");
        // Three CJK characters clear the minimum.
        let slugs = slug_candidates("嵐嵐嵐").unwrap();
        assert_eq!(slugs, vec!["嵐嵐嵐".to_string()]);
    }

    #[test]
    fn test_no_case_insensitive_duplicates() {
        let slugs = slug_candidates("One Piece Piece One").unwrap();
        let mut seen = HashSet::new();
        for s in &slugs {
            assert!(seen.insert(s.to_lowercase()), "duplicate {s}");
        }
    }

    #[test]
    fn test_all_stopword_topic_falls_back_to_raw_tokens() {
        let slugs = slug_candidates("The And Of").unwrap();
        assert!(slugs.contains(&"theandof".to_string()));
        assert!(slugs.contains(&"the-and-of".to_string()));
    }

    #[test]
    fn test_punctuation_only_topic_is_empty() {
        assert!(matches!(
            slug_candidates("!!! ???"),
            Err(BridgeError::EmptyTopic)
        ));
    }

    #[test]
    fn test_trailing_digit_suffix_stripped() {
        let slugs = slug_candidates("Overlord2").unwrap();
        assert!(slugs.contains(&"overlord2".to_string()));
        assert!(slugs.contains(&"overlord".to_string()));
    }

    #[test]
    fn test_numeric_token_removed_variant() {
        let slugs = slug_candidates("Mob Psycho 100").unwrap();
        assert!(slugs.contains(&"mobpsycho100".to_string()));
        assert!(slugs.contains(&"mobpsycho".to_string()));
    }

    #[test]
    fn test_prefix_truncation_longest_first() {
        let slugs = slug_candidates("alpha beta gamma delta").unwrap();
        // "alphabeta" is emitted early by the first-two subset; within
        // the prefix family itself, longer prefixes come first.
        let ab = slugs.iter().position(|s| s == "alphabeta").unwrap();
        let abg = slugs.iter().position(|s| s == "alphabetagamma").unwrap();
        let a = slugs.iter().position(|s| s == "alpha").unwrap();
        assert!(ab < abg, "first-two join precedes the prefix family");
        assert!(abg < a, "longest prefix probes first");
        assert_eq!(slugs[0], "alphabetagammadelta");
    }

    #[test]
    fn test_acronym_for_small_token_counts() {
        let slugs = slug_candidates("Jump Super Stars Deluxe").unwrap();
        assert!(slugs.contains(&"jssd".to_string()));
        // Single-token topics never get an acronym.
        let single = slug_candidates("Overwatch").unwrap();
        assert_eq!(single, vec!["overwatch".to_string()]);
    }

    #[test]
    fn test_deterministic_output() {
        let a = slug_candidates("The Legend of Zelda II").unwrap();
        let b = slug_candidates("The Legend of Zelda II").unwrap();
        assert_eq!(a, b);
    }
}
