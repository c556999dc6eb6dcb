//! Project manifest (`atconf.toml`) parsing and validation.
//!
//! The manifest declares everything a project wants configured: the package
//! metadata, the raw substitution variables, deferred program lookups and
//! command executions, the `.in` templates to rewrite and an optional
//! generated constants module.
//!
//! # Format
//!
//! ```toml
//! # Exposed as PACKAGE_NAME, PACKAGE_VERSION, PACKAGE_AUTHOR,
//! # PACKAGE_AUTHOR_EMAIL, PACKAGE_LICENSE and PACKAGE_URL
//! [package]
//! name = "acme"
//! version = "1.0.0"
//!
//! configure_files = ["acme/settings.py.in"]
//! constants_module = "acme.constants"
//! constants_extension = "py"
//!
//! # Dotted package prefix -> directory, "" is the root package
//! [package_dir]
//! "" = "src"
//!
//! # Strings, arrays, tables, booleans, integers and floats
//! [substitutions]
//! PREFIX = "/usr/local"
//! BINDIR = "@PREFIX@/bin"
//!
//! [find_program.PYTHON]
//! programs = ["python3", "python"]
//! default = "/usr/bin/python3"
//!
//! [require_program.SH]
//! programs = "sh"
//!
//! [execute_process.GIT_REV]
//! args = ["git", "rev-parse", "HEAD"]
//! ```
//!
//! # Validation
//!
//! [`ProjectManifest::load`] validates eagerly, before anything is resolved or
//! written:
//!
//! - every variable name is an identifier and is declared only once across
//!   `[package]`, `[substitutions]` and the deferred sections
//! - every configure file ends in `.in`
//! - the constants module is a dotted sequence of identifiers

pub mod helpers;

#[cfg(test)]
mod manifest_tests;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::configure::{validate_configure_files, validate_constants_module};
use crate::constants::DEFAULT_CONSTANTS_EXTENSION;
use crate::core::{ConfigureError, Result};
use crate::deferred::{ExecuteProcess, FindProgram, RequireProgram};
use crate::substitution::{Literal, SubstitutionTable, Value, is_identifier};
use crate::utils::fs::read_text_file;

pub use helpers::{find_manifest, find_manifest_from, find_manifest_with_optional};

/// The parsed `atconf.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectManifest {
    #[serde(default)]
    pub package: PackageMetadata,

    /// Templates to configure, relative to the project root
    #[serde(default)]
    pub configure_files: Vec<String>,

    /// Dotted name of the generated constants module
    #[serde(default)]
    pub constants_module: Option<String>,

    /// File extension of the generated constants module
    #[serde(default)]
    pub constants_extension: Option<String>,

    /// Dotted package prefix to directory, relative to the project root
    #[serde(default)]
    pub package_dir: BTreeMap<String, String>,

    #[serde(default)]
    pub substitutions: BTreeMap<String, toml::Value>,

    #[serde(default)]
    pub find_program: BTreeMap<String, ProgramSpec>,

    #[serde(default)]
    pub require_program: BTreeMap<String, ProgramSpec>,

    #[serde(default)]
    pub execute_process: BTreeMap<String, ProcessSpec>,

    /// Directory containing the manifest; set by [`ProjectManifest::load`]
    #[serde(skip)]
    pub manifest_dir: Option<PathBuf>,
}

/// `[package]` metadata, exposed as `PACKAGE_*` variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub license: Option<String>,
    pub url: Option<String>,
}

impl PackageMetadata {
    /// `(variable, value)` pairs for the fields that are set.
    pub fn variables(&self) -> Vec<(&'static str, &str)> {
        [
            ("PACKAGE_NAME", &self.name),
            ("PACKAGE_VERSION", &self.version),
            ("PACKAGE_AUTHOR", &self.author),
            ("PACKAGE_AUTHOR_EMAIL", &self.author_email),
            ("PACKAGE_LICENSE", &self.license),
            ("PACKAGE_URL", &self.url),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

/// One candidate or a list of candidates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProgramList {
    One(String),
    Many(Vec<String>),
}

impl ProgramList {
    fn to_value(&self) -> Value {
        match self {
            ProgramList::One(program) => Value::text(program.as_str()),
            ProgramList::Many(programs) => {
                Value::Sequence(programs.iter().map(|p| Value::text(p.as_str())).collect())
            }
        }
    }
}

/// A `[find_program.NAME]` or `[require_program.NAME]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramSpec {
    pub programs: ProgramList,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_true")]
    pub include_defaults: bool,
}

const fn default_true() -> bool {
    true
}

impl ProgramSpec {
    fn parts(&self) -> (Value, Value, Value, bool) {
        (
            self.programs.to_value(),
            Value::from(self.default.clone()),
            Value::from(self.path.clone()),
            self.include_defaults,
        )
    }
}

/// An `[execute_process.NAME]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessSpec {
    pub args: Vec<String>,
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(text) => Value::Text(text),
            toml::Value::Integer(i) => Value::Literal(Literal::Integer(i)),
            toml::Value::Float(x) => Value::Literal(Literal::Float(x)),
            toml::Value::Boolean(b) => Value::Literal(Literal::Bool(b)),
            toml::Value::Datetime(dt) => Value::Text(dt.to_string()),
            toml::Value::Array(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            toml::Value::Table(entries) => Value::Mapping(
                entries.into_iter().map(|(key, item)| (key, Value::from(item))).collect(),
            ),
        }
    }
}

impl ProjectManifest {
    /// Load and validate a manifest file.
    ///
    /// # Errors
    ///
    /// - [`ConfigureError::FileSystem`] if the file cannot be read
    /// - [`ConfigureError::ManifestParse`] for invalid TOML or a wrong shape
    /// - any validation error listed in the module documentation
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_text_file(path, "reading manifest")?;
        let mut manifest = Self::from_toml_str(&content, &path.display().to_string())?;
        manifest.manifest_dir = Some(match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        });
        debug!("Loaded manifest {}", path.display());
        Ok(manifest)
    }

    /// Parse and validate manifest text. `file` names the source in errors.
    pub fn from_toml_str(content: &str, file: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content).map_err(|e| ConfigureError::ManifestParse {
            file: file.to_string(),
            reason: e.to_string(),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check names, template suffixes and the constants module.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for name in self.variable_names() {
            if !is_identifier(name) {
                return Err(ConfigureError::InvalidVariableName {
                    name: name.to_string(),
                });
            }
            if !seen.insert(name) {
                return Err(ConfigureError::DuplicateVariable {
                    name: name.to_string(),
                });
            }
        }

        validate_configure_files(&self.configure_files)?;
        if let Some(module) = &self.constants_module {
            validate_constants_module(module)?;
        }
        Ok(())
    }

    fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.package
            .variables()
            .into_iter()
            .map(|(name, _)| name)
            .chain(self.substitutions.keys().map(String::as_str))
            .chain(self.find_program.keys().map(String::as_str))
            .chain(self.require_program.keys().map(String::as_str))
            .chain(self.execute_process.keys().map(String::as_str))
    }

    /// Directory that relative paths in the manifest are resolved against.
    pub fn project_dir(&self) -> PathBuf {
        self.manifest_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Extension of the generated constants module.
    pub fn constants_extension(&self) -> &str {
        self.constants_extension.as_deref().unwrap_or(DEFAULT_CONSTANTS_EXTENSION)
    }

    /// Build the raw, unresolved substitution table.
    pub fn substitution_table(&self) -> SubstitutionTable {
        let mut table = SubstitutionTable::new();
        for (name, value) in self.package.variables() {
            table.insert(name, value);
        }
        for (name, value) in &self.substitutions {
            table.insert(name.as_str(), Value::from(value.clone()));
        }
        for (name, spec) in &self.find_program {
            let (programs, default, path, include_defaults) = spec.parts();
            table.insert(
                name.as_str(),
                Value::deferred(FindProgram::from_values(programs, default, path, include_defaults)),
            );
        }
        for (name, spec) in &self.require_program {
            let (programs, default, path, include_defaults) = spec.parts();
            table.insert(
                name.as_str(),
                Value::deferred(RequireProgram::from_values(
                    programs,
                    default,
                    path,
                    include_defaults,
                )),
            );
        }
        for (name, spec) in &self.execute_process {
            let args = Value::Sequence(spec.args.iter().map(|a| Value::text(a.as_str())).collect());
            table.insert(name.as_str(), Value::deferred(ExecuteProcess::from_value(args)));
        }
        table
    }
}
