//! Kind-preserving substitution over nested values.

use std::collections::BTreeMap;

use super::engine;
use super::table::SubstitutionTable;
use super::value::Value;
use crate::core::Result;

/// Substitute into an arbitrary value tree.
///
/// Text and deferred values go through the engine. Mappings produce a new
/// mapping whose keys and values are substituted; sequences produce a new
/// sequence of the same length. Text is always a scalar, never a sequence of
/// characters. Literals and absent values are returned unchanged.
///
/// Nested containers are transformed in place of the given tree only; nothing
/// is added to the table besides the memoized variables the references reach.
///
/// # Examples
///
/// ```rust
/// use atconf::substitution::{substitute, SubstitutionTable, Value};
///
/// let mut table: SubstitutionTable = [("PREFIX", "/opt")].into_iter().collect();
/// let dirs = Value::Sequence(vec![Value::text("@PREFIX@/bin"), Value::text("@PREFIX@/lib")]);
/// let resolved = substitute(&dirs, &mut table)?;
/// assert_eq!(
///     resolved,
///     Value::Sequence(vec![Value::text("/opt/bin"), Value::text("/opt/lib")])
/// );
/// # Ok::<(), atconf::core::ConfigureError>(())
/// ```
pub fn substitute(value: &Value, table: &mut SubstitutionTable) -> Result<Value> {
    substitute_in_chain(value, table, &[])
}

pub(crate) fn substitute_in_chain(
    value: &Value,
    table: &mut SubstitutionTable,
    chain: &[String],
) -> Result<Value> {
    match value {
        Value::Text(_) | Value::Deferred(_) => engine::resolve_in_chain(value, table, chain),
        Value::Mapping(entries) => {
            let mut substituted = BTreeMap::new();
            for (key, item) in entries {
                let key = engine::expand_text(key, table, chain)?;
                let item = substitute_in_chain(item, table, chain)?;
                substituted.insert(key, item);
            }
            Ok(Value::Mapping(substituted))
        }
        Value::Sequence(items) => items
            .iter()
            .map(|item| substitute_in_chain(item, table, chain))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Literal(_) | Value::Absent => Ok(value.clone()),
    }
}
