//! The substitution table: one flat namespace of variables.

use std::collections::{BTreeMap, BTreeSet};

use super::value::Value;

/// Mapping from variable name to [`Value`], doubling as the resolution cache.
///
/// Entries are kept sorted by name, which makes iteration, `flatten` and the
/// cache file deterministic. Besides the entries the table tracks:
///
/// - which entries are **resolved** (memoized results that must not be
///   expanded again, e.g. a value that contains a literal `@` produced by an
///   `@@` escape),
/// - which deferred entries are **being evaluated**, so a reference reaching
///   one of them from inside its own parameters is reported as a cycle.
///
/// The table is owned by a single call and passed explicitly by `&mut` into
/// the engine; it is not meant to be shared.
///
/// Equality only compares entries.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    entries: BTreeMap<String, Value>,
    resolved: BTreeSet<String>,
    evaluating: Vec<String>,
}

impl SubstitutionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw value. The entry will be expanded when first referenced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        self.resolved.remove(&name);
        self.entries.insert(name, value.into())
    }

    /// Insert a final value. References to it return the value unchanged.
    pub fn insert_resolved(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        let name = name.into();
        self.resolved.insert(name.clone());
        self.entries.insert(name, value.into())
    }

    /// Copy every entry of `other` into this table, keeping `other`'s resolved marks.
    pub fn overlay(&mut self, other: SubstitutionTable) {
        for (name, value) in other.entries {
            if other.resolved.contains(&name) {
                self.insert_resolved(name, value);
            } else {
                self.insert(name, value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// The text of an entry, when it is a text value.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(Value::as_text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.resolved.contains(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Variable names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn begin_evaluation(&mut self, name: &str) {
        self.evaluating.push(name.to_string());
    }

    pub(crate) fn end_evaluation(&mut self, name: &str) {
        if let Some(pos) = self.evaluating.iter().rposition(|n| n == name) {
            self.evaluating.remove(pos);
        }
    }

    pub(crate) fn is_evaluating(&self, name: &str) -> bool {
        self.evaluating.iter().any(|n| n == name)
    }
}

impl PartialEq for SubstitutionTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SubstitutionTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for SubstitutionTable {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl IntoIterator for SubstitutionTable {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_sorted() {
        let table: SubstitutionTable = [("b", "2"), ("a", "1"), ("C", "3")].into_iter().collect();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["C", "a", "b"]);
    }

    #[test]
    fn test_insert_clears_resolved_mark() {
        let mut table = SubstitutionTable::new();
        table.insert_resolved("A", "x");
        assert!(table.is_resolved("A"));
        table.insert("A", "@B@");
        assert!(!table.is_resolved("A"));
    }

    #[test]
    fn test_overlay_keeps_marks() {
        let mut base: SubstitutionTable = [("A", "base"), ("B", "keep")].into_iter().collect();
        let mut top = SubstitutionTable::new();
        top.insert_resolved("A", "cached");
        base.overlay(top);

        assert_eq!(base.text("A"), Some("cached"));
        assert!(base.is_resolved("A"));
        assert_eq!(base.text("B"), Some("keep"));
        assert!(!base.is_resolved("B"));
    }

    #[test]
    fn test_equality_ignores_marks() {
        let mut a = SubstitutionTable::new();
        a.insert("A", "1");
        let mut b = SubstitutionTable::new();
        b.insert_resolved("A", "1");
        assert_eq!(a, b);
    }
}
