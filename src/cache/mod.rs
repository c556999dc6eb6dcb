//! The configure cache file.
//!
//! `atconf configure` resolves every variable once and records the result in a
//! cache file (by default `config.cache` next to the manifest). Later runs load
//! the cache instead of searching for programs and running commands again.
//!
//! # Format
//!
//! One `name=value` record per line, sorted by name. Values are written
//! without quoting; only `#` is escaped, as `\#`. Values that span lines or
//! end in `\` are not cached at all:
//!
//! ```text
//! PACKAGE_NAME=acme
//! PREFIX=/usr/local
//! PYTHON=/usr/bin/python3
//! ```
//!
//! When reading, the file is split into logical lines by [`text_file`]:
//! `#` starts a comment (`\#` is a literal `#`), a trailing `\` continues a
//! record on the next line, surrounding whitespace and blank lines are
//! ignored. Every logical line must match `NAME = value`, with optional
//! whitespace around `=`.
//!
//! Loaded values are final: they are inserted as resolved entries and are not
//! expanded again, so a cached `@` stays a literal `@`.

pub mod text_file;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::constants::{COMMENT_MARKER, CONTINUATION_MARKER};
use crate::core::{ConfigureError, Result};
use crate::substitution::pattern::IDENTIFIER_PATTERN;
use crate::substitution::SubstitutionTable;
use crate::utils::fs::safe_write;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?P<name>{IDENTIFIER_PATTERN})\s*=\s*(?P<value>.*)$"))
        .expect("cache record pattern is valid")
});

/// Split a `NAME = value` record into name and value.
///
/// The whole text must match; the name must be an identifier and the value is
/// everything after the `=` and any whitespace following it.
pub fn parse_record(text: &str) -> Option<(&str, &str)> {
    let captures = RECORD.captures(text)?;
    let name = captures.name("name")?.as_str();
    let value = captures.name("value")?.as_str();
    Some((name, value))
}

/// Load a cache file.
///
/// A missing file is not an error and yields an empty table.
///
/// # Errors
///
/// - [`ConfigureError::MalformedCacheRecord`] for a logical line that is not a
///   `NAME = value` record
/// - [`ConfigureError::FileSystem`] when the file exists but cannot be read
pub fn read_cache(path: &Path) -> Result<SubstitutionTable> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No configure cache at {}", path.display());
            return Ok(SubstitutionTable::new());
        }
        Err(e) => return Err(ConfigureError::file_system("reading cache", path, e)),
    };

    let source = path.display().to_string();
    let mut table = SubstitutionTable::new();
    for line in text_file::logical_lines(&source, &content) {
        let (name, value) = parse_record(&line.text).ok_or_else(|| {
            ConfigureError::MalformedCacheRecord {
                file: source.clone(),
                locator: line.locator(),
            }
        })?;
        debug!("Cached {}={}", name, value);
        table.insert_resolved(name, value);
    }
    Ok(table)
}

/// Write the text entries of `table` to `path`, sorted by name.
///
/// Literal entries (booleans and numbers) are written in their display form
/// and `#` is written as `\#`. Entries that have no single-line text form are
/// skipped with a warning: mappings, sequences, absent and unevaluated
/// deferred values, and text that spans lines or ends in a continuation
/// marker. The file is replaced atomically.
pub fn write_cache(path: &Path, table: &SubstitutionTable) -> Result<()> {
    info!("Writing config cache to {}", path.display());
    let mut content = String::new();
    for (name, value) in table.iter() {
        let Some(text) = value.scalar_text() else {
            warn!("Not caching {}: {} values cannot be cached", name, value.kind());
            continue;
        };
        let Some(encoded) = encode_value(&text) else {
            warn!("Not caching {}: value does not fit on one cache line", name);
            continue;
        };
        content.push_str(name);
        content.push('=');
        content.push_str(&encoded);
        content.push('\n');
    }
    safe_write(path, &content)
}

/// Record form of a value, or `None` when it cannot be held on one record line.
fn encode_value(text: &str) -> Option<String> {
    if text.contains(['\n', '\r']) || text.trim_end().ends_with(CONTINUATION_MARKER) {
        return None;
    }
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == COMMENT_MARKER {
            escaped.push(CONTINUATION_MARKER);
        }
        escaped.push(c);
    }
    Some(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substitution::{Value, flatten};
    use tempfile::TempDir;

    #[test]
    fn test_parse_record() {
        assert_eq!(parse_record("A=1"), Some(("A", "1")));
        assert_eq!(parse_record("A  =  x = y"), Some(("A", "x = y")));
        assert_eq!(parse_record("_a1="), Some(("_a1", "")));
        assert_eq!(parse_record("1A=1"), None);
        assert_eq!(parse_record("no record"), None);
        assert_eq!(parse_record("--flag=1"), None);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let table = read_cache(&temp.path().join("config.cache")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_write_is_sorted_and_verbatim() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.cache");
        let mut table = SubstitutionTable::new();
        table.insert("ZETA", "last value");
        table.insert("ALPHA", " spaced ");
        table.insert("DEBUG", true);
        write_cache(&path, &table).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "ALPHA= spaced \nDEBUG=true\nZETA=last value\n");
    }

    #[test]
    fn test_write_skips_non_text_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.cache");
        let mut table = SubstitutionTable::new();
        table.insert("DIRS", Value::Sequence(vec![Value::text("a")]));
        table.insert("MISSING", Value::Absent);
        table.insert("NAME", "acme");
        write_cache(&path, &table).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "NAME=acme\n");
    }

    #[test]
    fn test_round_trip() {
        crate::test_utils::init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.cache");
        let mut table = SubstitutionTable::new();
        table.insert("PREFIX", "/usr/local");
        table.insert("BINDIR", "@PREFIX@/bin");
        table.insert("EMAIL", "dev@@example.com");
        table.insert("EMPTY", "");
        flatten(&mut table).unwrap();
        write_cache(&path, &table).unwrap();

        let loaded = read_cache(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.text("EMAIL"), Some("dev@example.com"));
        assert!(loaded.is_resolved("EMAIL"));
    }

    #[test]
    fn test_multiline_value_is_not_cached() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.cache");
        let mut table = SubstitutionTable::new();
        table.insert("LOG", "first\nPREFIX=/evil");
        table.insert("CRLF", "a\r\nb");
        table.insert("PREFIX", "/usr/local");
        write_cache(&path, &table).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "PREFIX=/usr/local\n");
        let loaded = read_cache(&path).unwrap();
        assert!(!loaded.contains("LOG"));
        assert_eq!(loaded.text("PREFIX"), Some("/usr/local"));
    }

    #[test]
    fn test_trailing_backslash_does_not_swallow_next_record() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.cache");
        let mut table = SubstitutionTable::new();
        table.insert("A", "C:\\dir\\");
        table.insert("A2", "C:\\dir\\  ");
        table.insert("B", "kept");
        write_cache(&path, &table).unwrap();

        let loaded = read_cache(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.text("B"), Some("kept"));
    }

    #[test]
    fn test_comment_marker_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.cache");
        let mut table = SubstitutionTable::new();
        table.insert("COLOR", "#ff0000");
        table.insert("ESCAPED", "a\\#b");
        table.insert("PATH_LIKE", "C:\\dir\\file");
        write_cache(&path, &table).unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().contains("COLOR=\\#ff0000\n"));
        let loaded = read_cache(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.text("COLOR"), Some("#ff0000"));
        assert_eq!(loaded.text("ESCAPED"), Some("a\\#b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_multiline_command_output_cannot_inject_records() {
        use crate::deferred::ExecuteProcess;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.cache");
        let mut table = SubstitutionTable::new();
        table.insert(
            "LOG",
            Value::deferred(ExecuteProcess::new(["sh", "-c", "printf 'first\\nPREFIX=/evil'"])),
        );
        table.insert("PREFIX", "/usr/local");
        flatten(&mut table).unwrap();
        assert_eq!(table.text("LOG"), Some("first\nPREFIX=/evil"));
        write_cache(&path, &table).unwrap();

        let loaded = read_cache(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.text("PREFIX"), Some("/usr/local"));
    }

    #[test]
    fn test_read_tolerates_whitespace_and_comments() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.cache");
        std::fs::write(&path, "# generated\nNAME  =  acme  \nLONG = a \\\n   b\nHASH=\\#1\n").unwrap();
        let table = read_cache(&path).unwrap();
        assert_eq!(table.text("NAME"), Some("acme"));
        assert_eq!(table.text("LONG"), Some("a b"));
        assert_eq!(table.text("HASH"), Some("#1"));
    }

    #[test]
    fn test_malformed_record_names_file_and_line() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.cache");
        std::fs::write(&path, "GOOD=1\n\nnot a record\n").unwrap();
        let err = read_cache(&path).unwrap_err();
        match &err {
            ConfigureError::MalformedCacheRecord {
                locator,
                ..
            } => assert_eq!(locator, "line 3"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().ends_with("line 3: Invalid configure cache record"));
    }

    #[test]
    fn test_malformed_joined_record_reports_range() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.cache");
        std::fs::write(&path, "1BAD = \\\nvalue\n").unwrap();
        let err = read_cache(&path).unwrap_err();
        assert!(err.to_string().contains("lines 1-2"));
    }
}
