//! Placeholder expansion with cycle detection and memoization.
//!
//! Expansion follows references depth-first. The names on the current path
//! form the *reference chain*; it is copied into every recursive call so that
//! sibling branches never see each other's entries. A name that appears twice
//! on one path is a cycle.
//!
//! Every expanded variable is written back into the table as a resolved entry,
//! so later references (from any branch) reuse the result and deferred
//! computations run at most once.

use std::sync::Arc;

use tracing::{debug, trace};

use super::pattern::{PlaceholderKind, placeholders};
use super::table::SubstitutionTable;
use super::traversal;
use super::value::{Deferred, Value};
use crate::constants::DELIMITER;
use crate::core::{ConfigureError, Result};

/// Resolve a single value against the table.
///
/// - Text has its escapes and references expanded.
/// - Deferred values are evaluated with the table.
/// - Mappings and sequences are traversed (see [`traversal::substitute`]).
/// - Literals and absent values are returned unchanged.
///
/// # Errors
///
/// [`ConfigureError::UnknownVariable`], [`ConfigureError::CycleDetected`],
/// [`ConfigureError::NonScalarReference`], or whatever a deferred computation
/// reports.
///
/// # Examples
///
/// ```rust
/// use atconf::substitution::{resolve, SubstitutionTable, Value};
///
/// let mut table: SubstitutionTable = [("NAME", "acme")].into_iter().collect();
/// let value = resolve(&Value::text("hello @NAME@, mail me @@ home"), &mut table)?;
/// assert_eq!(value, Value::text("hello acme, mail me @ home"));
/// # Ok::<(), atconf::core::ConfigureError>(())
/// ```
pub fn resolve(value: &Value, table: &mut SubstitutionTable) -> Result<Value> {
    resolve_in_chain(value, table, &[])
}

/// Expand the escapes and references of a plain string.
///
/// Used for template lines, where the input and output are always text.
pub fn substitute_text(text: &str, table: &mut SubstitutionTable) -> Result<String> {
    expand_text(text, table, &[])
}

/// Resolve every entry of the table in place.
///
/// Entries are visited in name order. An entry already resolved as a side
/// effect of an earlier one is skipped.
///
/// # Examples
///
/// ```rust
/// use atconf::substitution::{flatten, SubstitutionTable};
///
/// let mut table: SubstitutionTable =
///     [("NAME", "acme"), ("GREETING", "hello @NAME@")].into_iter().collect();
/// flatten(&mut table)?;
/// assert_eq!(table.text("GREETING"), Some("hello acme"));
/// # Ok::<(), atconf::core::ConfigureError>(())
/// ```
pub fn flatten(table: &mut SubstitutionTable) -> Result<()> {
    let names: Vec<String> = table.names().map(str::to_string).collect();
    debug!("Flattening {} substitution variables", names.len());
    for name in names {
        expand(&name, table, &[])?;
    }
    Ok(())
}

pub(crate) fn resolve_in_chain(
    value: &Value,
    table: &mut SubstitutionTable,
    chain: &[String],
) -> Result<Value> {
    match value {
        Value::Text(text) => expand_text(text, table, chain).map(Value::Text),
        Value::Deferred(deferred) => evaluate_deferred(None, deferred, table),
        Value::Mapping(_) | Value::Sequence(_) => {
            traversal::substitute_in_chain(value, table, chain)
        }
        Value::Literal(_) | Value::Absent => Ok(value.clone()),
    }
}

/// Expand the escapes and references of one string.
pub(crate) fn expand_text(
    text: &str,
    table: &mut SubstitutionTable,
    chain: &[String],
) -> Result<String> {
    if !text.contains(DELIMITER) {
        return Ok(text.to_string());
    }

    let mut expanded = String::with_capacity(text.len());
    let mut last = 0;
    for placeholder in placeholders(text) {
        expanded.push_str(&text[last..placeholder.start]);
        match placeholder.kind {
            PlaceholderKind::Escape => expanded.push(DELIMITER),
            PlaceholderKind::Reference(name) => {
                let value = expand(name, table, chain)?;
                let Some(scalar) = value.scalar_text() else {
                    return Err(ConfigureError::NonScalarReference {
                        name: name.to_string(),
                    });
                };
                expanded.push_str(&scalar);
            }
        }
        last = placeholder.end;
    }
    expanded.push_str(&text[last..]);
    Ok(expanded)
}

/// Expand variable `name` reached through `chain` and memoize the result.
fn expand(name: &str, table: &mut SubstitutionTable, chain: &[String]) -> Result<Value> {
    let Some(current) = table.get(name).cloned() else {
        return Err(ConfigureError::UnknownVariable {
            name: name.to_string(),
        });
    };

    if table.is_resolved(name) {
        trace!("Reusing resolved value of {}", name);
        return Ok(current);
    }

    if chain.iter().any(|seen| seen == name) {
        let mut cycle = chain.to_vec();
        cycle.push(name.to_string());
        return Err(ConfigureError::CycleDetected {
            chain: cycle,
        });
    }

    // Reached from inside the parameters of its own deferred computation
    if table.is_evaluating(name) {
        let mut cycle = Vec::with_capacity(chain.len() + 2);
        cycle.push(name.to_string());
        cycle.extend(chain.iter().cloned());
        cycle.push(name.to_string());
        return Err(ConfigureError::CycleDetected {
            chain: cycle,
        });
    }

    let mut chain = chain.to_vec();
    chain.push(name.to_string());

    let resolved = match &current {
        Value::Deferred(deferred) => evaluate_deferred(Some(name), deferred, table)?,
        other => resolve_in_chain(other, table, &chain)?,
    };

    debug!("Resolved {} to {} value", name, resolved.kind());
    table.insert_resolved(name, resolved.clone());
    Ok(resolved)
}

fn evaluate_deferred(
    name: Option<&str>,
    deferred: &Arc<dyn Deferred>,
    table: &mut SubstitutionTable,
) -> Result<Value> {
    if let Some(name) = name {
        table.begin_evaluation(name);
    }
    let result = deferred.evaluate(table);
    if let Some(name) = name {
        table.end_evaluation(name);
    }
    result
}
