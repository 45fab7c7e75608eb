use std::collections::HashSet;

use anagram_corpus::ResourceLoader;
use tracing::{debug, warn};

/// Words excluded from classification, loaded from a comma-separated list.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SkipSet {
    words: HashSet<String>,
}

impl SkipSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse comma-separated words, any number per line.
    ///
    /// Lines end at `\n`, `\r\n` or a lone `\r`. Fields are taken verbatim: no
    /// trimming or case folding, so `" cat"` never matches a token. Empty
    /// fields at the end of a line are dropped.
    pub fn parse(text: &str) -> Self {
        let mut words = HashSet::new();
        for line in text.split(['\n', '\r']) {
            let mut fields: Vec<&str> = line.split(',').collect();
            while fields.last().is_some_and(|f| f.is_empty()) {
                fields.pop();
            }
            words.extend(fields.into_iter().map(str::to_string));
        }
        Self { words }
    }

    /// Load the list named by `locator`, or return an empty set.
    ///
    /// A resource that cannot be read is logged and treated as empty.
    pub fn load(loader: &dyn ResourceLoader, locator: Option<&str>) -> Self {
        let Some(locator) = locator else {
            return Self::empty();
        };
        match loader.load(locator) {
            Ok(bytes) => {
                let set = Self::parse(&String::from_utf8_lossy(&bytes));
                debug!("loaded {} skip words from {locator}", set.len());
                set
            }
            Err(err) => {
                warn!("failed to read skip list {locator}: {err}; continuing without skip words");
                Self::empty()
            }
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SkipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}
