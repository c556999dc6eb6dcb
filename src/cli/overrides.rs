//! Extraction of `NAME=VALUE` overrides from the raw command line.
//!
//! Overrides look like positional arguments, so they are pulled out before
//! clap sees the arguments:
//!
//! ```text
//! atconf configure PREFIX=/opt DEBUG=1 --verbose show
//!        ^marker   ^override   ^override ^kept ^ends scanning
//! ```

use std::collections::BTreeMap;

use crate::cache::parse_record;

/// Split `args` into pass-through arguments and overrides.
///
/// Everything up to and including the first `marker` passes through. After it,
/// `NAME=VALUE` arguments become overrides (a later one wins), flag-like
/// arguments pass through, and the first other argument ends the scan: it and
/// everything after it pass through untouched. Order is preserved.
///
/// Without `marker` in `args`, every argument passes through and no overrides
/// are returned.
///
/// # Examples
///
/// ```rust
/// use atconf::cli::overrides::parse_overrides;
///
/// let args: Vec<String> = ["setup.py", "configure", "FOO=bar", "--quiet", "build"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let (rest, overrides) = parse_overrides(&args, "configure");
/// assert_eq!(rest, ["setup.py", "configure", "--quiet", "build"]);
/// assert_eq!(overrides["FOO"], "bar");
/// ```
pub fn parse_overrides(args: &[String], marker: &str) -> (Vec<String>, BTreeMap<String, String>) {
    let mut overrides = BTreeMap::new();
    let Some(position) = args.iter().position(|arg| arg == marker) else {
        return (args.to_vec(), overrides);
    };

    let start = position + 1;
    let mut passthrough = args[..start].to_vec();
    for (offset, arg) in args[start..].iter().enumerate() {
        if let Some((name, value)) = parse_record(arg) {
            overrides.insert(name.to_string(), value.to_string());
        } else if arg.starts_with('-') {
            passthrough.push(arg.clone());
        } else {
            passthrough.extend_from_slice(&args[start + offset..]);
            break;
        }
    }
    (passthrough, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_overrides_before_follow_up_command() {
        let (rest, overrides) =
            parse_overrides(&args(&["setup.py", "configure", "FOO=bar", "--quiet", "build"]), "configure");
        assert_eq!(rest, args(&["setup.py", "configure", "--quiet", "build"]));
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["FOO"], "bar");
    }

    #[test]
    fn test_arguments_after_terminator_are_untouched() {
        let (rest, overrides) = parse_overrides(
            &args(&["atconf", "configure", "A=1", "expand", "B=2", "--flag"]),
            "configure",
        );
        assert_eq!(rest, args(&["atconf", "configure", "expand", "B=2", "--flag"]));
        assert_eq!(overrides.keys().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_arguments_before_marker_pass_through() {
        let (rest, overrides) =
            parse_overrides(&args(&["atconf", "X=1", "--verbose", "configure", "Y=2"]), "configure");
        assert_eq!(rest, args(&["atconf", "X=1", "--verbose", "configure"]));
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["Y"], "2");
    }

    #[test]
    fn test_without_marker_everything_passes_through() {
        let input = args(&["atconf", "show", "A=1"]);
        let (rest, overrides) = parse_overrides(&input, "configure");
        assert_eq!(rest, input);
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_value_may_contain_equals_and_spaces() {
        let (_, overrides) =
            parse_overrides(&args(&["atconf", "configure", "CFLAGS=-O2 -DX=1", "EMPTY="]), "configure");
        assert_eq!(overrides["CFLAGS"], "-O2 -DX=1");
        assert_eq!(overrides["EMPTY"], "");
    }

    #[test]
    fn test_later_override_wins() {
        let (_, overrides) = parse_overrides(&args(&["configure", "A=1", "A=2"]), "configure");
        assert_eq!(overrides["A"], "2");
    }

    #[test]
    fn test_invalid_name_ends_scanning() {
        let (rest, overrides) = parse_overrides(&args(&["configure", "1A=1", "B=2"]), "configure");
        assert_eq!(rest, args(&["configure", "1A=1", "B=2"]));
        assert!(overrides.is_empty());
    }
}
