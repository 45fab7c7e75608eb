//! Shared types flowing between the stages of anagram class extraction.
//!
//! A partition stage turns text into [`Pair`]s keyed by an [`AnagramKey`]; the
//! grouping stage hands every word seen under one key to an aggregator, which
//! may produce an [`OutputRecord`]. Records render in the line format used by
//! the job output (`<key>\t[w1, w2, ...]`) and can be parsed back with
//! [`OutputRecord::parse_line`].
//!
//! ```rust
//! use anagram_types::{AnagramKey, OutputRecord};
//!
//! let record = OutputRecord::new(
//!     AnagramKey::from_sorted("eilnst"),
//!     vec!["enlist".into(), "listen".into(), "silent".into()],
//! );
//! assert_eq!(record.to_string(), "eilnst\t[enlist, listen, silent]");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator placed between key and word list when none is configured.
pub const DEFAULT_SEPARATOR: &str = "\t";

/// Canonical key of an anagram class: the characters of a word sorted by code point.
///
/// Construction does not re-sort; callers derive keys through the key computer
/// and only use [`AnagramKey::from_sorted`] for values that already are keys
/// (parsed output, test fixtures).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnagramKey(String);

impl AnagramKey {
    /// Wrap a string that is already in sorted-character form.
    pub fn from_sorted(sorted: impl Into<String>) -> Self {
        Self(sorted.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AnagramKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AnagramKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One occurrence of a word, tagged with its class key.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Pair {
    pub key: AnagramKey,
    pub word: String,
}

impl Pair {
    pub fn new(key: AnagramKey, word: impl Into<String>) -> Self {
        Self {
            key,
            word: word.into(),
        }
    }
}

/// A reported anagram class: a key and two or more distinct words in ascending order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub key: AnagramKey,
    pub words: Vec<String>,
}

impl OutputRecord {
    pub fn new(key: AnagramKey, words: Vec<String>) -> Self {
        Self { key, words }
    }

    /// Render with a custom separator between key and word list.
    pub fn delimited<'a>(&'a self, separator: &'a str) -> Delimited<'a> {
        Delimited {
            record: self,
            separator,
        }
    }

    /// Parse a line produced by [`OutputRecord::delimited`].
    ///
    /// Returns `None` when the separator is missing or the word list is not
    /// bracketed. Words are split on `", "`, so words must not contain that
    /// sequence (normalized tokens never do).
    pub fn parse_line(line: &str, separator: &str) -> Option<Self> {
        let (key, rest) = line.split_once(separator)?;
        let inner = rest.strip_prefix('[')?.strip_suffix(']')?;
        let words = if inner.is_empty() {
            Vec::new()
        } else {
            inner.split(", ").map(str::to_string).collect()
        };
        Some(Self {
            key: AnagramKey::from_sorted(key),
            words,
        })
    }
}

impl fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.delimited(DEFAULT_SEPARATOR), f)
    }
}

/// Display adapter returned by [`OutputRecord::delimited`].
pub struct Delimited<'a> {
    record: &'a OutputRecord,
    separator: &'a str,
}

impl fmt::Display for Delimited<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}[", self.record.key, self.separator)?;
        for (idx, word) in self.record.words.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            f.write_str(word)?;
        }
        f.write_str("]")
    }
}
