//! Compiled regular expressions shared by the URL and configuration grammars.

use regex::Regex;

/// Compile a pattern that is known at build time.
///
/// Every caller passes a string literal exercised by unit tests, so a failure
/// here is a programming error rather than bad input.
#[expect(
    clippy::expect_used,
    reason = "patterns are string literals covered by unit tests"
)]
#[must_use]
pub fn static_regex(pattern: &'static str) -> Regex {
    Regex::new(pattern).expect("static pattern must compile")
}

#[cfg(test)]
mod tests {
    use super::static_regex;

    #[test]
    fn compiles_literal_patterns() {
        let regex = static_regex(r"(?i)^[a-z0-9]{1,12}://");
        assert!(regex.is_match("JSON://host"));
        assert!(!regex.is_match("://host"));
    }
}
