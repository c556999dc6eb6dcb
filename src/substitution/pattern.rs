//! Placeholder recognition.
//!
//! Two forms are recognised, both anchored on [`DELIMITER`]:
//!
//! - `@@` - an escaped delimiter, standing for one literal `@`
//! - `@NAME@` - a reference to variable `NAME`, where `NAME` matches
//!   `[A-Za-z_][A-Za-z0-9_]*`
//!
//! Any other use of `@` is plain text and never produces a match.

use regex::{CaptureMatches, Regex};
use std::sync::LazyLock;

use crate::constants::DELIMITER;

/// Grammar of a variable name.
pub const IDENTIFIER_PATTERN: &str = "[A-Za-z_][A-Za-z0-9_]*";

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{IDENTIFIER_PATTERN}$")).expect("identifier pattern is valid")
});

static SUBSTITUTION: LazyLock<Regex> = LazyLock::new(|| {
    let delimiter = regex::escape(&DELIMITER.to_string());
    Regex::new(&format!(
        "{delimiter}(?:(?P<escaped>{delimiter})|(?P<named>{IDENTIFIER_PATTERN}){delimiter})"
    ))
    .expect("substitution pattern is valid")
});

/// Whether `name` is a valid variable name.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// What a placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind<'t> {
    /// `@@`
    Escape,
    /// `@NAME@`
    Reference(&'t str),
}

/// One placeholder occurrence with its byte range in the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'t> {
    pub start: usize,
    pub end: usize,
    pub kind: PlaceholderKind<'t>,
}

/// Lazy iterator over the placeholders of a string, left to right and
/// non-overlapping.
pub struct Placeholders<'t> {
    inner: Option<CaptureMatches<'static, 't>>,
}

impl<'t> Iterator for Placeholders<'t> {
    type Item = Placeholder<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.inner.as_mut()?.next()?;
        let whole = caps.get(0)?;
        let kind = match caps.name("named") {
            Some(name) => PlaceholderKind::Reference(name.as_str()),
            None => PlaceholderKind::Escape,
        };
        Some(Placeholder {
            start: whole.start(),
            end: whole.end(),
            kind,
        })
    }
}

/// Scan `text` for placeholders.
///
/// Strings without a delimiter short-circuit to an empty iterator.
///
/// # Examples
///
/// ```rust
/// use atconf::substitution::pattern::{placeholders, PlaceholderKind};
///
/// let kinds: Vec<_> = placeholders("a@@b @NAME@ c@").map(|p| p.kind).collect();
/// assert_eq!(kinds, vec![PlaceholderKind::Escape, PlaceholderKind::Reference("NAME")]);
/// ```
pub fn placeholders(text: &str) -> Placeholders<'_> {
    let inner = text.contains(DELIMITER).then(|| SUBSTITUTION.captures_iter(text));
    Placeholders {
        inner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<PlaceholderKind<'_>> {
        placeholders(text).map(|p| p.kind).collect()
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("PREFIX"));
        assert!(is_identifier("_private1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("with-dash"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("A B"));
    }

    #[test]
    fn test_no_delimiter() {
        assert!(kinds("plain text").is_empty());
    }

    #[test]
    fn test_escape_and_reference() {
        assert_eq!(kinds("@@"), vec![PlaceholderKind::Escape]);
        assert_eq!(kinds("@A@"), vec![PlaceholderKind::Reference("A")]);
        assert_eq!(
            kinds("@A@@B@"),
            vec![PlaceholderKind::Reference("A"), PlaceholderKind::Reference("B")]
        );
    }

    #[test]
    fn test_escape_wins_over_reference() {
        // "@@" is consumed first, leaving "NAME@" which is not a placeholder
        assert_eq!(kinds("@@NAME@"), vec![PlaceholderKind::Escape]);
    }

    #[test]
    fn test_malformed_is_literal() {
        assert!(kinds("user@example.com").is_empty());
        assert!(kinds("@1abc@").is_empty());
        assert!(kinds("@with space@").is_empty());
        assert!(kinds("trailing @").is_empty());
    }

    #[test]
    fn test_ranges() {
        let found: Vec<_> = placeholders("x @NAME@ y").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 2);
        assert_eq!(found[0].end, 8);
    }
}
