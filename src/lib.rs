//! atconf - `@`-variable substitution for project configuration
//!
//! atconf resolves `@NAME@` placeholders against a table of named values and
//! applies them to `.in` template files, the way autoconf's `configure`
//! substitutes `@VAR@` in `Makefile.in`. Values can be plain text that refers to
//! other variables, deferred computations ("find this program", "run this
//! command and capture its output") or nested lists and tables.
//!
//! # Architecture Overview
//!
//! - `atconf.toml` declares the project's variables, templates and an optional
//!   generated constants module
//! - `atconf configure` resolves every variable once, records the results in
//!   `config.cache` and rewrites the templates
//! - later invocations reuse `config.cache` instead of resolving again
//!
//! Each variable is resolved at most once per invocation, circular references
//! are rejected with the full reference chain, and nested containers keep
//! their shape.
//!
//! # Core Modules
//!
//! - [`substitution`] - placeholder parsing, the resolution engine and
//!   structural traversal
//! - [`deferred`] - program lookup and command execution as deferred values
//! - [`cache`] - the `name=value` cache file reader and writer
//! - [`configure`] - template rewriting, the constants module and the
//!   configure session state machine
//! - [`manifest`] - `atconf.toml` parsing and validation
//! - [`cli`] - the `atconf` command line, including override parsing
//!
//! ## Supporting Modules
//!
//! - [`core`] - the error type and user-facing error reporting
//! - [`constants`] - syntax characters, file names and search defaults
//! - [`utils`] - atomic file writes
//!
//! # Manifest Format (atconf.toml)
//!
//! ```toml
//! configure_files = ["acme/settings.py.in"]
//! constants_module = "acme.constants"
//!
//! [package]
//! name = "acme"
//! version = "1.0.0"
//!
//! [substitutions]
//! PREFIX = "/usr/local"
//! DATADIR = "@PREFIX@/share/@PACKAGE_NAME@"
//!
//! [find_program.PYTHON]
//! programs = ["python3", "python"]
//!
//! [execute_process.GIT_REV]
//! args = ["git", "rev-parse", "--short", "HEAD"]
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Resolve everything, overriding PREFIX
//! atconf configure PREFIX=/opt/acme
//!
//! # Inspect the cached result
//! atconf show
//! atconf expand "@DATADIR@/icons"
//! ```
//!
//! # Library Usage
//!
//! ```rust
//! use atconf::substitution::{flatten, SubstitutionTable};
//!
//! let mut table: SubstitutionTable =
//!     [("NAME", "acme"), ("GREETING", "hello @NAME@")].into_iter().collect();
//! flatten(&mut table)?;
//! assert_eq!(table.text("GREETING"), Some("hello acme"));
//! # Ok::<(), atconf::core::ConfigureError>(())
//! ```

pub mod cache;
pub mod cli;
pub mod configure;
pub mod constants;
pub mod core;
pub mod deferred;
pub mod manifest;
pub mod substitution;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cache::{read_cache, write_cache};
pub use cli::overrides::parse_overrides;
pub use substitution::{flatten, resolve, substitute};
