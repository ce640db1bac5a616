//! Text normalization applied before splitting text into words.
//!
//! The normalized form has single spaces between units, each of
//! `. ! ? ; , : ( )` as its own unit, and no upper case letters.

use regex::Regex;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static whitespace pattern"))
}

fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([.!?;,:()])").expect("static punctuation pattern"))
}

/// Text normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize text into its canonical whitespace-tokenizable form.
    pub fn normalize(&self, text: &str) -> String {
        preprocess(text)
    }

    /// Normalize text and split it into words.
    pub fn words(&self, text: &str) -> Vec<String> {
        preprocess(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Collapse whitespace, pad punctuation with spaces and lowercase.
///
/// Total over all input; the result never has leading or trailing spaces.
pub fn preprocess(text: &str) -> String {
    let collapsed = whitespace_re().replace_all(text.trim(), " ");
    let spaced = punctuation_re().replace_all(&collapsed, " ${1} ");
    let collapsed = whitespace_re().replace_all(&spaced, " ");
    collapsed.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(preprocess("  hello \t\n  world  "), "hello world");
    }

    #[test]
    fn test_punctuation_becomes_units() {
        assert_eq!(
            preprocess("Hello, world! (Really?)"),
            "hello , world ! ( really ? )"
        );
    }

    #[test]
    fn test_lowercase() {
        assert_eq!(preprocess("The QUICK Fox"), "the quick fox");
    }

    #[test]
    fn test_leading_punctuation_is_trimmed() {
        assert_eq!(preprocess("...ok"), ". . . ok");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(preprocess(""), "");
        assert_eq!(preprocess(" \n\t "), "");
    }

    #[test]
    fn test_words() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.words("Low, lower."), vec!["low", ",", "lower", "."]);
    }
}
