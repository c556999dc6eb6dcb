//! Source literals for the generated constants module.
//!
//! Values are rendered the way Python's `repr` writes them, so the module can
//! be imported directly:
//!
//! | Value            | Literal                |
//! |------------------|------------------------|
//! | text             | `'text'`, `"it's"`     |
//! | bool             | `True` / `False`       |
//! | integer, float   | `42`, `1.5`            |
//! | sequence         | `['a', 'b']`           |
//! | mapping          | `{'key': 'value'}`     |
//! | absent           | `None`                 |

use std::fmt::Write;

use crate::core::{ConfigureError, Result};
use crate::substitution::{Literal, Value};

/// Render a resolved value as a source literal.
///
/// # Errors
///
/// Deferred values have no literal form; they must be resolved first.
pub fn render(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(out)
}

fn write_value(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Text(text) => out.push_str(&quote(text)),
        Value::Literal(literal) => out.push_str(&render_scalar(*literal)),
        Value::Absent => out.push_str("None"),
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Mapping(entries) => {
            out.push('{');
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&quote(key));
                out.push_str(": ");
                write_value(out, item)?;
            }
            out.push('}');
        }
        Value::Deferred(_) => {
            return Err(ConfigureError::Other {
                message: "cannot write an unevaluated deferred value as a constant".to_string(),
            });
        }
    }
    Ok(())
}

fn render_scalar(literal: Literal) -> String {
    match literal {
        Literal::Bool(true) => "True".to_string(),
        Literal::Bool(false) => "False".to_string(),
        Literal::Integer(i) => i.to_string(),
        Literal::Float(x) if x.is_nan() => "float('nan')".to_string(),
        Literal::Float(x) if x.is_infinite() => {
            if x > 0.0 { "float('inf')".to_string() } else { "-float('inf')".to_string() }
        }
        // Debug keeps the fractional part of whole numbers: 1.0, not 1
        Literal::Float(x) => format!("{x:?}"),
    }
}

/// Quote text as a string literal.
///
/// Single quotes are used unless the text contains a single quote and no
/// double quote.
pub fn quote(text: &str) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(delimiter);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || (0x7f..0xa0).contains(&(c as u32)) => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}
