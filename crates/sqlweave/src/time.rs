//! Time format conversion.
//!
//! Every dialect spells date/time format directives differently (`yyyy-MM-dd`
//! in Hive, `%Y-%m-%d %H:%i:%S` in Presto, `YYYY-MM-DD HH24:MI:SS` in Oracle).
//! The AST always stores formats in one canonical form, C/Python `strftime`.
//! A [`TimeMapping`] converts a dialect's directives into the canonical form
//! while parsing, and back while generating.

use crate::trie::{new_trie, Trie};

/// Bidirectional directive mapping between one dialect and canonical strftime.
#[derive(Debug, Clone, Default)]
pub struct TimeMapping {
    to_canonical: Trie<String>,
    from_canonical: Trie<String>,
}

impl TimeMapping {
    /// Build from `(dialect directive, canonical directive)` pairs.
    ///
    /// The inverse direction is derived from the same pairs. When several
    /// dialect directives map to one canonical directive, the last pair wins.
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let to_canonical = new_trie(pairs.iter().map(|(d, c)| (*d, c.to_string())));
        let from_canonical = new_trie(pairs.iter().map(|(d, c)| (*c, d.to_string())));
        Self {
            to_canonical,
            from_canonical,
        }
    }

    /// Whether this mapping converts anything at all
    pub fn is_identity(&self) -> bool {
        self.to_canonical.is_empty()
    }

    /// Convert a dialect-specific format into canonical strftime
    pub fn to_canonical(&self, format: &str) -> String {
        format_time(format, &self.to_canonical)
    }

    /// Convert a canonical strftime format into this dialect's directives
    pub fn from_canonical(&self, format: &str) -> String {
        format_time(format, &self.from_canonical)
    }
}

/// Rewrite `input` by replacing the longest known directive at each position.
///
/// Characters that do not start a known directive are copied through.
///
/// ```
/// use sqlweave::time::format_time;
/// use sqlweave::trie::new_trie;
///
/// let trie = new_trie([("%Y", "yyyy".to_string()), ("%m", "MM".to_string())]);
/// assert_eq!(format_time("%Y-%m", &trie), "yyyy-MM");
/// ```
pub fn format_time(input: &str, mapping: &Trie<String>) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        match mapping.longest_match(&chars[i..]) {
            Some((len, replacement)) => {
                out.push_str(replacement);
                i += len;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAVA: &[(&str, &str)] = &[
        ("yyyy", "%Y"),
        ("yy", "%y"),
        ("MM", "%m"),
        ("M", "%-m"),
        ("dd", "%d"),
        ("HH", "%H"),
        ("mm", "%M"),
        ("ss", "%S"),
    ];

    #[test]
    fn test_to_canonical_prefers_longest_directive() {
        let mapping = TimeMapping::new(JAVA);
        assert_eq!(mapping.to_canonical("yyyy-MM-dd HH:mm:ss"), "%Y-%m-%d %H:%M:%S");
        assert_eq!(mapping.to_canonical("yy/M"), "%y/%-m");
    }

    #[test]
    fn test_literal_text_passes_through() {
        let mapping = TimeMapping::new(JAVA);
        assert_eq!(mapping.to_canonical("yyyy-MM-dd'T'HH"), "%Y-%m-%d'T'%H");
    }

    #[test]
    fn test_from_canonical_last_pair_wins() {
        let mapping = TimeMapping::new(&[("%s", "%S"), ("%S", "%S"), ("%i", "%M")]);
        assert_eq!(mapping.from_canonical("%H:%M:%S"), "%H:%i:%S");
    }

    #[test]
    fn test_identity_mapping() {
        let mapping = TimeMapping::default();
        assert!(mapping.is_identity());
        assert_eq!(mapping.to_canonical("%Y"), "%Y");
    }
}
