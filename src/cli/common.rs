//! Shared setup for the CLI commands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::configure::{Session, SessionState};
use crate::constants::CACHE_FILENAME;
use crate::manifest::{ProjectManifest, find_manifest_with_optional};
use crate::substitution::SubstitutionTable;

/// Everything a command needs to know about the project it runs in.
#[derive(Debug)]
pub struct CommandContext {
    pub manifest: ProjectManifest,
    /// `None` when no manifest was found
    pub manifest_path: Option<PathBuf>,
    pub project_dir: PathBuf,
    pub cache_path: PathBuf,
}

impl CommandContext {
    /// Locate and load the manifest and decide where the cache lives.
    ///
    /// Without a manifest the current directory is the project directory and
    /// the table starts out empty.
    pub fn load(manifest_path: Option<PathBuf>, cache_path: Option<PathBuf>) -> Result<Self> {
        let manifest_path = find_manifest_with_optional(manifest_path)?;
        let manifest = match &manifest_path {
            Some(path) => ProjectManifest::load(path)
                .with_context(|| format!("Failed to load manifest {}", path.display()))?,
            None => {
                tracing::debug!("No manifest found, using overrides and cache only");
                ProjectManifest::default()
            }
        };
        let project_dir = manifest.project_dir();
        let cache_path = cache_path.unwrap_or_else(|| project_dir.join(CACHE_FILENAME));

        Ok(Self {
            manifest,
            manifest_path,
            project_dir,
            cache_path,
        })
    }

    /// A fresh session over the manifest's raw table.
    pub fn session(&self) -> Session {
        Session::new(self.manifest.substitution_table(), &self.cache_path)
    }

    /// A session in the configured state.
    ///
    /// `Some(overrides)` runs the configure transition, `None` loads the cache.
    pub fn establish(&self, overrides: Option<BTreeMap<String, String>>) -> Result<Session> {
        let mut session = self.session();
        session.establish(overrides).with_context(|| match session.state() {
            SessionState::Configuring => "Failed to configure substitution variables".to_string(),
            _ => format!("Failed to load configure cache {}", self.cache_path.display()),
        })?;
        Ok(session)
    }
}

/// `name=value` lines for every entry, as printed by `atconf show`.
///
/// Scalars print as text; containers and absent values print as literals.
pub fn format_table(table: &SubstitutionTable) -> Result<String> {
    let mut out = String::new();
    for (name, value) in table.iter() {
        let rendered = match value.scalar_text() {
            Some(text) => text.into_owned(),
            None => crate::configure::literal::render(value)?,
        };
        out.push_str(name);
        out.push('=');
        out.push_str(&rendered);
        out.push('\n');
    }
    Ok(out)
}
