//! Values held by the substitution table.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::table::SubstitutionTable;
use crate::core::Result;

/// A unit of delayed work stored in the substitution table.
///
/// A deferred value is evaluated at most once: the engine replaces the table
/// entry with the returned [`Value`] as soon as evaluation succeeds. Any textual
/// parameters the computation carries are substituted by the implementation
/// itself, against the same table, before doing external work.
///
/// # Examples
///
/// ```rust,no_run
/// use atconf::core::Result;
/// use atconf::substitution::{Deferred, SubstitutionTable, Value};
///
/// #[derive(Debug)]
/// struct Hostname;
///
/// impl Deferred for Hostname {
///     fn evaluate(&self, _table: &mut SubstitutionTable) -> Result<Value> {
///         Ok(Value::text("build-host"))
///     }
/// }
/// ```
pub trait Deferred: fmt::Debug + Send + Sync {
    /// Run the computation against the table and produce its value.
    fn evaluate(&self, table: &mut SubstitutionTable) -> Result<Value>;
}

/// Already resolved scalar data that is not text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Bool(bool),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A value in the substitution table or in a tree being substituted.
#[derive(Debug, Clone)]
pub enum Value {
    /// Text that may contain `@NAME@` placeholders and `@@` escapes
    Text(String),
    /// A computation producing the value on first use
    Deferred(Arc<dyn Deferred>),
    /// Nested mapping; keys may contain placeholders as well
    Mapping(BTreeMap<String, Value>),
    /// Nested sequence
    Sequence(Vec<Value>),
    /// Resolved non-text scalar
    Literal(Literal),
    /// Absent value, e.g. a program lookup without match or default
    Absent,
}

impl Value {
    /// Text value from anything string-like.
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    /// Wrap a deferred computation.
    pub fn deferred(deferred: impl Deferred + 'static) -> Self {
        Value::Deferred(Arc::new(deferred))
    }

    /// The text, when this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text form of a scalar that can be spliced into a string.
    ///
    /// Text and literals qualify; mappings, sequences, absent and deferred
    /// values do not.
    pub fn scalar_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Text(text) => Some(Cow::Borrowed(text)),
            Value::Literal(literal) => Some(Cow::Owned(literal.to_string())),
            _ => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Value::Deferred(_))
    }

    /// Short name of the variant, for log and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Deferred(_) => "deferred",
            Value::Mapping(_) => "mapping",
            Value::Sequence(_) => "sequence",
            Value::Literal(_) => "literal",
            Value::Absent => "absent",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Deferred(a), Value::Deferred(b)) => Arc::ptr_eq(a, b),
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Literal(a), Value::Literal(b)) => a == b,
            (Value::Absent, Value::Absent) => true,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Literal(Literal::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Literal(Literal::Integer(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Literal(Literal::Float(x))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::Mapping(entries)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}
