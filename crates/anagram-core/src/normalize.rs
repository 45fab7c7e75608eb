//! Line normalization and tokenization.
//!
//! Punctuation is removed from the whole line before splitting, so no token
//! keeps a leading or trailing mark, and an inner apostrophe joins its halves
//! (`don't` becomes `dont`). Only ASCII punctuation is removed; other symbols
//! stay part of the word.

/// Characters that separate tokens: space, tab, newline, carriage return, form feed.
const DELIMITERS: [char; 5] = [' ', '\t', '\n', '\r', '\x0c'];

/// Strip ASCII punctuation from `line`, then lowercase it.
pub fn normalize_line(line: &str) -> String {
    let stripped: String = line.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    stripped.to_lowercase()
}

/// Whether a token contains an ASCII decimal digit anywhere.
pub fn contains_digit(token: &str) -> bool {
    token.bytes().any(|b| b.is_ascii_digit())
}

/// A normalized line, ready to be split into tokens.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Normalized {
    text: String,
}

impl Normalized {
    pub fn new(line: &str) -> Self {
        Self {
            text: normalize_line(line),
        }
    }

    /// Every token in the line, left to right, before the digit rule.
    pub fn candidates(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.split(DELIMITERS).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        Normalized::new(line)
            .candidates()
            .filter(|t| !contains_digit(t))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn strips_punctuation_and_lowercases() {
        assert_eq!(tokens("Cat, dog!"), vec!["cat", "dog"]);
        assert_eq!(tokens("\"Hello\" -- WORLD..."), vec!["hello", "world"]);
        assert_eq!(tokens("don't re-enter"), vec!["dont", "reenter"]);
    }

    #[test]
    fn punctuation_only_tokens_disappear() {
        assert_eq!(tokens("a - b ... c"), vec!["a", "b", "c"]);
        assert!(tokens("?!, ;").is_empty());
    }

    #[test]
    fn splits_on_tokenizer_delimiters() {
        assert_eq!(
            tokens("one\ttwo\x0cthree  four\r"),
            vec!["one", "two", "three", "four"]
        );
    }

    #[test]
    fn drops_tokens_with_digits() {
        assert_eq!(tokens("abc123 cba 4ever v2 ok"), vec!["cba", "ok"]);
        let normalized = Normalized::new("abc123 cba");
        assert_eq!(normalized.candidates().count(), 2);
    }

    #[test]
    fn lowercases_beyond_ascii() {
        assert_eq!(tokens("ÉCOLE Straße"), vec!["école", "straße"]);
    }

    #[test]
    fn non_ascii_symbols_are_kept() {
        assert_eq!(tokens("café’s «mot»"), vec!["café’s", "«mot»"]);
    }
}
