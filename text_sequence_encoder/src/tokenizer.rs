//! Word-level tokenization.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Characters removed from text before it is split into words.
///
/// The apostrophe isn't included, so contractions like "don't" stay
/// a single token.
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Splits text into lowercase words.
///
/// The same settings must be used when building a vocabulary and when
/// encoding text against it, which is why a
/// [`Vocabulary`](crate::Vocabulary) keeps a copy of the tokenizer it was
/// built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tokenizer {
    /// Convert text to lowercase before splitting.
    pub lowercase: bool,
    /// Decompose characters and drop combining marks (e.g. "café" becomes
    /// "cafe").
    pub strip_accents: bool,
    /// Every character in this string acts as a word boundary, just like
    /// whitespace.
    pub filters: String,
}

impl Tokenizer {
    /// Split some text into word tokens, in order of appearance.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use text_sequence_encoder::Tokenizer;
    /// let tokenizer = Tokenizer::default();
    ///
    /// let tokens = tokenizer.tokenize("Forest fire near La Ronge, Sask. Canada");
    ///
    /// assert_eq!(
    ///     tokens,
    ///     &["forest", "fire", "near", "la", "ronge", "sask", "canada"],
    /// );
    /// ```
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = self.normalize(text);

        normalized
            .split(|c: char| c.is_whitespace() || self.filters.contains(c))
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect()
    }

    fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut text = Cow::Borrowed(text);

        if self.lowercase {
            text = Cow::Owned(text.to_lowercase());
        }

        if self.strip_accents {
            text = Cow::Owned(
                text.nfd().filter(|&c| !is_combining_mark(c)).collect(),
            );
        }

        text
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            lowercase: true,
            strip_accents: false,
            filters: DEFAULT_FILTERS.to_string(),
        }
    }
}
