//! Deferred computations available to substitution tables.
//!
//! Each type implements [`Deferred`](crate::substitution::Deferred) and is stored
//! in a table as [`Value::Deferred`](crate::substitution::Value::Deferred). The
//! engine evaluates it the first time the variable is referenced (or when the
//! table is flattened) and replaces the entry with the result.
//!
//! | Type               | Result                                                    |
//! |--------------------|-----------------------------------------------------------|
//! | [`FindProgram`]    | path of the first candidate found, else the default       |
//! | [`RequireProgram`] | path of the first candidate found, else an executable default, else an error |
//! | [`ExecuteProcess`] | trimmed standard output of a successful command           |
//!
//! Parameters are substituted against the table before any external work, so
//! they may reference other variables:
//!
//! ```rust,no_run
//! use atconf::deferred::{ExecuteProcess, FindProgram};
//! use atconf::substitution::{SubstitutionTable, Value};
//!
//! let mut table = SubstitutionTable::new();
//! table.insert("PYTHON", Value::deferred(FindProgram::new(["python3", "python"])));
//! table.insert(
//!     "PYTHON_VERSION",
//!     Value::deferred(ExecuteProcess::new(["@PYTHON@", "--version"])),
//! );
//! ```

mod process;
mod program;

pub use process::ExecuteProcess;
pub use program::{FindProgram, RequireProgram, format_program_list};

use crate::core::{ConfigureError, Result};
use crate::substitution::Value;

/// Flatten a resolved parameter into a list of strings.
///
/// A single text becomes a one-element list.
fn text_list(value: &Value, what: &str) -> Result<Vec<String>> {
    match value {
        Value::Text(text) => Ok(vec![text.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                item.scalar_text().map(|s| s.into_owned()).ok_or_else(|| ConfigureError::Other {
                    message: format!("expected {what} to be text, found a {} value", item.kind()),
                })
            })
            .collect(),
        other => Err(ConfigureError::Other {
            message: format!("expected {what} to be text or a list, found a {} value", other.kind()),
        }),
    }
}

/// A resolved optional text parameter.
fn optional_text(value: &Value, what: &str) -> Result<Option<String>> {
    match value {
        Value::Absent => Ok(None),
        other => other.scalar_text().map(|s| Some(s.into_owned())).ok_or_else(|| {
            ConfigureError::Other {
                message: format!("expected {what} to be text, found a {} value", other.kind()),
            }
        }),
    }
}
