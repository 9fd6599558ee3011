/// Returns true when `needle` occurs in `haystack` bounded on both sides by a
/// non-alphanumeric character (or the string edge). Both inputs are expected
/// to be lower-cased already.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// True if any of `cues` occurs as a whole word in `haystack`.
pub fn contains_any_word(haystack: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| contains_word(haystack, cue))
}

/// Search keyword as stored and looked up: lower-cased, whitespace collapsed.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_match_respects_boundaries() {
        assert!(contains_word("senior go developer", "go"));
        assert!(!contains_word("django developer", "go"));
        assert!(!contains_word("indianapolis, in", "india"));
    }

    #[test]
    fn test_word_match_handles_punctuation_and_edges() {
        assert!(contains_word("docker.", "docker"));
        assert!(contains_word("node.js, postgresql", "node.js"));
        assert!(contains_word("c++", "c++"));
        assert!(contains_word("austin, us", "us"));
        assert!(!contains_word("australia", "us"));
    }

    #[test]
    fn test_multi_word_cue() {
        assert!(contains_word("new grad software engineer", "new grad"));
        assert!(contains_any_word("part-time tutor", &["contract", "part-time"]));
    }

    #[test]
    fn test_normalize_keyword() {
        assert_eq!(normalize_keyword("  Backend   Developer "), "backend developer");
        assert_eq!(normalize_keyword("rust"), "rust");
    }

    #[test]
    fn test_empty_needle_never_matches() {
        assert!(!contains_word("anything", ""));
    }
}
