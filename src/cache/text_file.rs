//! Logical-line reader for line-oriented configuration files.
//!
//! Physical lines are turned into logical lines by:
//!
//! 1. dropping everything from an unescaped `#` to the end of the line
//!    (`\#` stands for a literal `#`); lines that only held a comment vanish,
//! 2. joining a line that ends in `\` with the next physical line, whose
//!    leading whitespace is removed,
//! 3. trimming both ends and skipping blank lines.
//!
//! Each logical line remembers the 1-based physical lines it came from so
//! diagnostics can point at `line 3` or `lines 3-4`.

use tracing::warn;

use crate::constants::{COMMENT_MARKER, CONTINUATION_MARKER};

/// One logical line and its physical origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub text: String,
    /// First physical line, 1-based
    pub first: usize,
    /// Last physical line, 1-based
    pub last: usize,
}

impl LogicalLine {
    /// `line N` for single lines, `lines A-B` for joined ones.
    pub fn locator(&self) -> String {
        if self.first == self.last {
            format!("line {}", self.first)
        } else {
            format!("lines {}-{}", self.first, self.last)
        }
    }
}

/// Iterator over the logical lines of a file's content.
pub struct LogicalLines<'a> {
    source: &'a str,
    physical: std::str::Lines<'a>,
    number: usize,
}

/// Split `content` into logical lines. `source` names the file in warnings.
pub fn logical_lines<'a>(source: &'a str, content: &'a str) -> LogicalLines<'a> {
    LogicalLines {
        source,
        physical: content.lines(),
        number: 0,
    }
}

/// Remove the comment part of a physical line and unescape `\#`.
///
/// Returns `None` when the line consisted of nothing but a comment.
fn strip_comment(line: &str) -> Option<String> {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    let mut had_comment = false;
    while let Some(c) = chars.next() {
        if c == CONTINUATION_MARKER && chars.peek() == Some(&COMMENT_MARKER) {
            out.push(COMMENT_MARKER);
            chars.next();
        } else if c == COMMENT_MARKER {
            had_comment = true;
            break;
        } else {
            out.push(c);
        }
    }
    if had_comment && out.trim().is_empty() { None } else { Some(out) }
}

impl Iterator for LogicalLines<'_> {
    type Item = LogicalLine;

    fn next(&mut self) -> Option<LogicalLine> {
        let mut pending: Option<LogicalLine> = None;
        loop {
            let Some(raw) = self.physical.next() else {
                if let Some(line) = pending {
                    warn!(
                        "{}, {}: continuation line immediately precedes end-of-file",
                        self.source,
                        line.locator()
                    );
                    return Some(line);
                }
                return None;
            };
            self.number += 1;

            let Some(stripped) = strip_comment(raw) else {
                continue;
            };

            let mut line = match pending.take() {
                Some(mut joined) => {
                    joined.text.push_str(stripped.trim_start());
                    joined.last = self.number;
                    joined
                }
                None => LogicalLine {
                    text: stripped,
                    first: self.number,
                    last: self.number,
                },
            };
            line.text = line.text.trim().to_string();

            if line.text.is_empty() {
                continue;
            }

            if line.text.ends_with(CONTINUATION_MARKER) {
                line.text.pop();
                pending = Some(line);
                continue;
            }

            return Some(line);
        }
    }
}
