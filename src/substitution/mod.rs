//! The `@`-variable substitution engine.
//!
//! A [`SubstitutionTable`] maps variable names to [`Value`]s. Values may be text
//! containing placeholders, deferred computations, nested containers or
//! already resolved scalars. The engine resolves each variable on first use,
//! memoizes the result back into the table and rejects circular references.
//!
//! # Placeholder Syntax
//!
//! | Syntax   | Meaning                                   |
//! |----------|-------------------------------------------|
//! | `@@`     | a literal `@`                             |
//! | `@NAME@` | the value of `NAME` (`[A-Za-z_][A-Za-z0-9_]*`) |
//!
//! Any other `@` is plain text.
//!
//! # Entry Points
//!
//! - [`resolve`] - resolve one value
//! - [`substitute`] - kind-preserving traversal of mappings and sequences
//! - [`substitute_text`] - expand one string, e.g. a template line
//! - [`flatten`] - resolve every entry of a table in place
//!
//! # Example
//!
//! ```rust
//! use atconf::substitution::{flatten, substitute, SubstitutionTable, Value};
//!
//! let mut table = SubstitutionTable::new();
//! table.insert("PREFIX", "/usr/local");
//! table.insert("BINDIR", "@PREFIX@/bin");
//! flatten(&mut table)?;
//!
//! let line = substitute(&Value::text("install -d @BINDIR@\n"), &mut table)?;
//! assert_eq!(line, Value::text("install -d /usr/local/bin\n"));
//! # Ok::<(), atconf::core::ConfigureError>(())
//! ```

mod engine;
pub mod pattern;
mod table;
mod traversal;
mod value;

pub use engine::{flatten, resolve, substitute_text};
pub use pattern::is_identifier;
pub use table::SubstitutionTable;
pub use traversal::substitute;
pub use value::{Deferred, Literal, Value};
