//! Glob-style name matching for document search.
//!
//! `*` matches any run of characters and `?` matches exactly one.  Every other character
//! is literal.  Matching is case-insensitive and covers the whole candidate string.

use regex::{Regex, RegexBuilder};

/// A compiled wildcard pattern.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compiles a wildcard pattern.
    ///
    /// # Examples
    /// ```rust
    /// use worldkeeper::WildcardPattern;
    ///
    /// let pattern = WildcardPattern::compile("Test*").unwrap();
    /// assert!(pattern.matches("Testania"));
    /// assert!(pattern.matches("testania"));
    /// assert!(!pattern.matches("MyTestania"));
    /// ```
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let mut translated = String::with_capacity(pattern.len() + 8);
        translated.push('^');
        for c in pattern.chars() {
            match c {
                '*' => translated.push_str(".*"),
                '?' => translated.push('.'),
                literal => translated.push_str(&regex::escape(literal.encode_utf8(&mut [0; 4]))),
            }
        }
        translated.push('$');

        let regex = RegexBuilder::new(&translated)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Tests a candidate against the pattern.
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_suffix() {
        let pattern = WildcardPattern::compile("Test*").unwrap();
        assert!(pattern.matches("Testania"));
        assert!(pattern.matches("Test"));
        assert!(!pattern.matches("MyTestania"));
    }

    #[test]
    fn question_mark_matches_one_character() {
        let pattern = WildcardPattern::compile("T?st").unwrap();
        assert!(pattern.matches("Test"));
        assert!(pattern.matches("Tast"));
        assert!(!pattern.matches("Teest"));
        assert!(!pattern.matches("Tst"));
    }

    #[test]
    fn case_insensitive() {
        let pattern = WildcardPattern::compile("bilbo*").unwrap();
        assert!(pattern.matches("BILBO Baggins"));
    }

    #[test]
    fn metacharacters_are_literal() {
        let pattern = WildcardPattern::compile("a.b (c)+[d]").unwrap();
        assert!(pattern.matches("A.B (C)+[D]"));
        assert!(!pattern.matches("aXb (c)+[d]"));
    }

    #[test]
    fn exact_pattern_without_wildcards() {
        let pattern = WildcardPattern::compile("Gandalf").unwrap();
        assert!(pattern.matches("gandalf"));
        assert!(!pattern.matches("Gandalf the Grey"));
        assert_eq!(pattern.as_str(), "Gandalf");
    }

    #[test]
    fn star_alone_matches_everything() {
        let pattern = WildcardPattern::compile("*").unwrap();
        assert!(pattern.matches(""));
        assert!(pattern.matches("anything\nat all"));
    }
}
