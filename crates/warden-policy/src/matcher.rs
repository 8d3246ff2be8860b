//! Pattern compilation.
//!
//! A pattern mixes literal text with regular expressions enclosed in `<` and
//! `>`, e.g. `resources:articles:<[0-9]+>`. Angle brackets nest, so a regex
//! segment may itself contain balanced `<...>`. The whole pattern is anchored
//! at both ends.

use regex::Regex;

use crate::error::{PolicyResult, PolicyStoreError};

/// Compiles a pattern into an anchored regular expression.
pub fn compile_pattern(pattern: &str) -> PolicyResult<Regex> {
    let mut source = String::with_capacity(pattern.len() + 2);
    source.push('^');

    let mut literal = String::new();
    let mut segment = String::new();
    let mut depth = 0usize;

    for c in pattern.chars() {
        match (c, depth) {
            ('<', 0) => {
                source.push_str(&regex::escape(&literal));
                literal.clear();
                depth = 1;
            }
            ('>', 1) => {
                source.push('(');
                source.push_str(&segment);
                source.push(')');
                segment.clear();
                depth = 0;
            }
            (_, 0) => literal.push(c),
            ('<', _) => {
                depth += 1;
                segment.push(c);
            }
            ('>', _) => {
                depth -= 1;
                segment.push(c);
            }
            _ => segment.push(c),
        }
    }

    if depth != 0 {
        return Err(PolicyStoreError::invalid_pattern(
            pattern,
            "unbalanced '<' delimiter",
        ));
    }

    source.push_str(&regex::escape(&literal));
    source.push('$');

    Regex::new(&source).map_err(|e| PolicyStoreError::invalid_pattern(pattern, e.to_string()))
}

/// Compiles every pattern in a list.
pub fn compile_all(patterns: &[String]) -> PolicyResult<Vec<Regex>> {
    patterns.iter().map(|p| compile_pattern(p)).collect()
}

/// Whether any of the compiled patterns matches `value`.
pub fn matches_any(patterns: &[Regex], value: &str) -> bool {
    patterns.iter().any(|p| p.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern_is_exact() {
        let re = compile_pattern("resources:articles").unwrap();
        assert!(re.is_match("resources:articles"));
        assert!(!re.is_match("resources:articles:1"));
        assert!(!re.is_match("Resources:articles"));
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let re = compile_pattern("a.b").unwrap();
        assert!(re.is_match("a.b"));
        assert!(!re.is_match("axb"));
    }

    #[test]
    fn test_regex_segment() {
        let re = compile_pattern("resources:articles:<[0-9]+>").unwrap();
        assert!(re.is_match("resources:articles:42"));
        assert!(!re.is_match("resources:articles:abc"));
    }

    #[test]
    fn test_multiple_segments() {
        let re = compile_pattern("<alice|bob>:<read|write>").unwrap();
        assert!(re.is_match("bob:write"));
        assert!(!re.is_match("carol:write"));
    }

    #[test]
    fn test_nested_brackets() {
        let re = compile_pattern("user:<(?P<id>[a-z]+)>").unwrap();
        assert!(re.is_match("user:alice"));
    }

    #[test]
    fn test_unbalanced_pattern() {
        let err = compile_pattern("resources:<.*").unwrap_err();
        assert!(matches!(err, PolicyStoreError::InvalidPattern { .. }));
    }

    #[test]
    fn test_invalid_regex() {
        assert!(compile_pattern("<[a-z>").is_err());
    }
}
