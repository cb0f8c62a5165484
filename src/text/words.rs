//! Word splitting for speech text

use regex::Regex;
use std::sync::OnceLock;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+").expect("word pattern is valid"))
}

/// Splits text into runs of Unicode word characters
///
/// Punctuation and whitespace separate words and are dropped; digits and
/// underscores count as word characters.
pub fn split_words(text: &str) -> Vec<&str> {
    word_pattern().find_iter(text).map(|m| m.as_str()).collect()
}
