//! Card holder name extraction.

use std::collections::HashSet;

use super::patterns::{HOLDER_DENY_WORDS, NAME_TOKEN};
use super::{ExtractionMatch, FieldExtractor};

/// Longest name embossed on an ID-1 card (ISO/IEC 7813 track 1 limit).
pub const MAX_HOLDER_LEN: usize = 26;

/// Fewest words accepted as a name.
const MIN_HOLDER_WORDS: usize = 2;

/// Holder name field extractor.
pub struct HolderExtractor {
    extra_deny_words: HashSet<String>,
}

impl HolderExtractor {
    /// Create a new holder extractor with the built-in deny list.
    pub fn new() -> Self {
        Self {
            extra_deny_words: HashSet::new(),
        }
    }

    /// Add words that disqualify a line, matched case-insensitively.
    pub fn with_deny_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra_deny_words
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_uppercase()));
        self
    }

    fn is_denied(&self, word: &str) -> bool {
        let bare = word.trim_matches(|c| matches!(c, '.' | '-' | '\''));
        HOLDER_DENY_WORDS.contains(bare) || self.extra_deny_words.contains(bare)
    }
}

impl Default for HolderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for HolderExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        if text.chars().any(|c| c.is_ascii_digit()) {
            return Vec::new();
        }

        let Some(name) = normalize_holder(text) else {
            return Vec::new();
        };

        let words: Vec<&str> = name.split(' ').collect();
        if words.len() < MIN_HOLDER_WORDS
            || name.chars().count() > MAX_HOLDER_LEN
            || words.iter().any(|w| self.is_denied(w))
        {
            return Vec::new();
        }

        vec![ExtractionMatch::new(name, 0.8, text)]
    }
}

/// Extract a holder name from a line.
pub fn extract_holder(text: &str) -> Option<String> {
    HolderExtractor::new().extract(text).map(|m| m.value)
}

/// Uppercase a name and join its words with single spaces.
///
/// Returns `None` if any word is not letters with internal `.`, `-` or `'`.
pub fn normalize_holder(text: &str) -> Option<String> {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| w.replace('\u{2019}', "'"))
        .map(|w| NAME_TOKEN.is_match(&w).then(|| w.to_uppercase()))
        .collect::<Option<_>>()?;

    if words.is_empty() {
        return None;
    }

    Some(words.join(" "))
}
