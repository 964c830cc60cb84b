//! Token-based whole-corpus search
//!
//! Documents (entry value lists, category schemas) and queries are both
//! tokenized by lowercasing, stripping punctuation, and splitting on
//! whitespace. A document matches when at least half of the query's unique
//! tokens occur as substrings of the document's tokens.

use std::collections::BTreeSet;

/// Lowercase, strip punctuation, split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| !c.is_ascii_punctuation())
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// True when at least half of the query's unique tokens appear as
/// substrings of the document's tokens.
pub fn matches(query_tokens: &BTreeSet<String>, document_tokens: &[String]) -> bool {
    if query_tokens.is_empty() {
        return false;
    }
    let hits = query_tokens
        .iter()
        .filter(|needle| {
            document_tokens
                .iter()
                .any(|token| token.contains(needle.as_str()))
        })
        .count();
    hits * 2 >= query_tokens.len()
}

/// Unique query tokens.
pub fn query_tokens(query: &str) -> BTreeSet<String> {
    tokenize(query).into_iter().collect()
}
