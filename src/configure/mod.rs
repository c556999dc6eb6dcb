//! The configure step: rewriting templates and generating the constants module.
//!
//! Given a resolved [`SubstitutionTable`], [`run`] performs two jobs:
//!
//! 1. **Templates** - every configure file (`settings.py.in`) is substituted
//!    line by line and written to the same path without the `.in` suffix.
//! 2. **Constants module** - when a constants module is declared, every table
//!    entry is written as `NAME = <literal>`, sorted by name, to a module file
//!    inside the package directory.
//!
//! Outputs are written atomically: a template with a failing line produces no
//! output file at all, and an existing output is left untouched.
//!
//! Establishing the table itself (overrides and flattening vs. loading the
//! cache) is handled by [`session`].

pub mod literal;
pub mod session;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::constants::TEMPLATE_SUFFIX;
use crate::core::{ConfigureError, Result};
use crate::manifest::ProjectManifest;
use crate::substitution::{SubstitutionTable, is_identifier, substitute_text};
use crate::utils::fs::{read_text_file, safe_write};

pub use session::{Session, SessionState};

/// Files written by one configure run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigureReport {
    pub configured_files: Vec<PathBuf>,
    pub constants_module: Option<PathBuf>,
}

/// Check that every configure file name ends in `.in` and has a stem.
pub fn validate_configure_files<S: AsRef<str>>(files: &[S]) -> Result<()> {
    for file in files {
        let file = file.as_ref();
        if !file.ends_with(TEMPLATE_SUFFIX) || file.len() == TEMPLATE_SUFFIX.len() {
            return Err(ConfigureError::InvalidTemplateName {
                file: file.to_string(),
            });
        }
    }
    Ok(())
}

/// Check that a module name is a dotted sequence of identifiers.
pub fn validate_constants_module(name: &str) -> Result<()> {
    if name.split('.').all(is_identifier) {
        Ok(())
    } else {
        Err(ConfigureError::InvalidModuleName {
            name: name.to_string(),
        })
    }
}

/// Output path of a template: the template path without `.in`.
pub fn output_path(template: &Path) -> Result<PathBuf> {
    let name = template.to_string_lossy();
    match name.strip_suffix(TEMPLATE_SUFFIX) {
        Some(stem) if !stem.is_empty() => Ok(PathBuf::from(stem)),
        _ => Err(ConfigureError::InvalidTemplateName {
            file: name.into_owned(),
        }),
    }
}

/// Substitute one template into its output file.
///
/// Each line, including its line terminator, is substituted independently.
///
/// # Errors
///
/// [`ConfigureError::TemplateLine`] naming the template and the 0-based line
/// number of the first failing line; the output file is not written.
pub fn configure_file(template: &Path, table: &mut SubstitutionTable) -> Result<PathBuf> {
    let destination = output_path(template)?;
    info!("Configuring {}", template.display());

    let content = read_text_file(template, "reading template")?;
    let mut output = String::with_capacity(content.len());
    for (line_number, line) in content.split_inclusive('\n').enumerate() {
        let substituted =
            substitute_text(line, table).map_err(|e| ConfigureError::TemplateLine {
                file: template.display().to_string(),
                line: line_number,
                source: Box::new(e),
            })?;
        output.push_str(&substituted);
    }

    safe_write(&destination, &output)?;
    Ok(destination)
}

/// Configure several templates, resolving relative paths against `root`.
///
/// Names are validated before any file is touched.
pub fn configure_files<S: AsRef<str>>(
    root: &Path,
    files: &[S],
    table: &mut SubstitutionTable,
) -> Result<Vec<PathBuf>> {
    validate_configure_files(files)?;
    files.iter().map(|file| configure_file(&root.join(file.as_ref()), table)).collect()
}

/// Candidate package prefixes, longest first, ending with the root package `""`.
///
/// `a.b.c` yields `a.b.c`, `a.b`, `a`, `""`.
pub fn prefixes(package: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(package);
    std::iter::from_fn(move || {
        let current = next?;
        next = match current.rfind('.') {
            Some(index) => Some(&current[..index]),
            None if current.is_empty() => None,
            None => Some(""),
        };
        Some(current)
    })
}

/// Directory holding the modules of `package`.
///
/// The longest prefix of `package` found in `package_dir` selects the base
/// directory (`""` maps the root package); the remaining package components
/// are appended as subdirectories. Without a match the package components are
/// taken relative to `root`.
pub fn package_directory(
    root: &Path,
    package: &str,
    package_dir: &BTreeMap<String, String>,
) -> PathBuf {
    let (base, rest) = prefixes(package)
        .find_map(|prefix| {
            package_dir.get(prefix).map(|dir| {
                let rest = package[prefix.len()..].trim_start_matches('.');
                (root.join(dir), rest)
            })
        })
        .unwrap_or_else(|| (root.to_path_buf(), package));

    rest.split('.').filter(|part| !part.is_empty()).fold(base, |dir, part| dir.join(part))
}

/// Path of the generated constants module.
pub fn constants_module_path(
    root: &Path,
    module: &str,
    package_dir: &BTreeMap<String, String>,
    extension: &str,
) -> Result<PathBuf> {
    validate_constants_module(module)?;
    let (package, module_name) = match module.rsplit_once('.') {
        Some((package, name)) => (package, name),
        None => ("", module),
    };
    Ok(package_directory(root, package, package_dir).join(format!("{module_name}.{extension}")))
}

/// Render the constants module source for a resolved table.
pub fn render_constants(table: &SubstitutionTable) -> Result<String> {
    let mut source = String::new();
    for (name, value) in table.iter() {
        source.push_str(name);
        source.push_str(" = ");
        source.push_str(&literal::render(value)?);
        source.push('\n');
    }
    Ok(source)
}

/// Write the constants module for `table` to `path`.
pub fn generate_constants_module(path: &Path, table: &SubstitutionTable) -> Result<()> {
    let source = render_constants(table)?;
    safe_write(path, &source)
}

/// Run the configure step for a project.
///
/// Template paths may themselves contain placeholders; they are substituted
/// before use.
pub fn run(manifest: &ProjectManifest, table: &mut SubstitutionTable) -> Result<ConfigureReport> {
    validate_configure_files(&manifest.configure_files)?;
    let root = manifest.project_dir();

    let mut templates = Vec::with_capacity(manifest.configure_files.len());
    for file in &manifest.configure_files {
        templates.push(substitute_text(file, table)?);
    }
    let configured_files = configure_files(&root, &templates, table)?;

    let constants_module = match &manifest.constants_module {
        Some(module) => {
            let path = constants_module_path(
                &root,
                module,
                &manifest.package_dir,
                manifest.constants_extension(),
            )?;
            info!("Generating constants module {} at {}", module, path.display());
            generate_constants_module(&path, table)?;
            Some(path)
        }
        None => None,
    };

    Ok(ConfigureReport {
        configured_files,
        constants_module,
    })
}
