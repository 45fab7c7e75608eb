use anagram_types::AnagramKey;

/// Canonical class key: the token's characters sorted by code point.
pub fn anagram_key(token: &str) -> AnagramKey {
    let mut chars: Vec<char> = token.chars().collect();
    chars.sort_unstable();
    AnagramKey::from_sorted(chars.into_iter().collect::<String>())
}

/// Whether two tokens are permutations of the same characters.
pub fn is_anagram(a: &str, b: &str) -> bool {
    anagram_key(a) == anagram_key(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_line;

    #[test]
    fn sorts_characters() {
        assert_eq!(anagram_key("listen").as_str(), "eilnst");
        assert_eq!(anagram_key("god").as_str(), "dgo");
        assert_eq!(anagram_key("good").as_str(), "dgoo");
        assert_eq!(anagram_key("").as_str(), "");
    }

    #[test]
    fn equal_keys_iff_permutations() {
        assert!(is_anagram("listen", "silent"));
        assert!(is_anagram("dog", "god"));
        assert!(!is_anagram("dog", "good"));
        assert!(!is_anagram("aab", "abb"));
    }

    #[test]
    fn key_is_a_fixed_point() {
        for word in ["enlist", "straße", "zebra", "aaa"] {
            let key = anagram_key(word);
            assert_eq!(anagram_key(key.as_str()), key);
        }
    }

    #[test]
    fn every_rotation_of_a_mixed_case_word_shares_a_key() {
        let word: Vec<char> = "TeNsiL".chars().collect();
        let expected = anagram_key(&normalize_line("TeNsiL"));
        for shift in 0..word.len() {
            let mut rotated = word.clone();
            rotated.rotate_left(shift);
            let rotated: String = rotated.into_iter().collect();
            assert_eq!(anagram_key(&normalize_line(&rotated)), expected);
            let reversed: String = rotated.chars().rev().collect();
            assert_eq!(anagram_key(&normalize_line(&reversed)), expected);
        }
    }

    #[test]
    fn orders_by_code_point() {
        assert_eq!(anagram_key("éa").as_str(), "aé");
        assert_eq!(anagram_key("ba€").as_str(), "ab€");
    }
}
