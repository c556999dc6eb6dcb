//! Establishing the substitution table for one invocation.
//!
//! ```text
//!                 configure (overrides)
//!  NotConfigured ──────────────────────▶ Configuring ──▶ Configured
//!        │          apply overrides, flatten,                ▲
//!        │          write the cache                          │
//!        └───────────────────────────────────────────────────┘
//!                 any other command: overlay the cache as-is
//! ```
//!
//! Configuring resolves every variable (running program lookups and commands)
//! and records the result in the cache. Every later invocation reuses the
//! cache instead, without flattening again.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cache::{read_cache, write_cache};
use crate::core::{ConfigureError, Result};
use crate::substitution::{SubstitutionTable, flatten, is_identifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotConfigured,
    Configuring,
    Configured,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NotConfigured => write!(f, "not configured"),
            SessionState::Configuring => write!(f, "configuring"),
            SessionState::Configured => write!(f, "configured"),
        }
    }
}

/// The substitution table of one invocation and how far it has been set up.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    table: SubstitutionTable,
    cache_path: PathBuf,
}

impl Session {
    /// Start from the raw table declared by the project.
    pub fn new(table: SubstitutionTable, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            state: SessionState::NotConfigured,
            table,
            cache_path: cache_path.into(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn table(&self) -> &SubstitutionTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut SubstitutionTable {
        &mut self.table
    }

    pub fn into_table(self) -> SubstitutionTable {
        self.table
    }

    /// Pick the transition for an invocation.
    ///
    /// `Some(overrides)` means the configure command was given (possibly with
    /// no overrides at all); `None` means any other command.
    pub fn establish(&mut self, overrides: Option<BTreeMap<String, String>>) -> Result<()> {
        match overrides {
            Some(overrides) => self.configure(overrides),
            None => self.load_cache(),
        }
    }

    /// Apply overrides, resolve every variable and write the cache.
    ///
    /// Override names are validated before the table is touched.
    pub fn configure(&mut self, overrides: BTreeMap<String, String>) -> Result<()> {
        self.expect_state(SessionState::NotConfigured)?;
        if let Some(name) = overrides.keys().find(|name| !is_identifier(name)) {
            return Err(ConfigureError::InvalidVariableName {
                name: name.clone(),
            });
        }

        self.transition(SessionState::Configuring);
        for (name, value) in overrides {
            debug!("Override {}={}", name, value);
            self.table.insert(name, value);
        }
        flatten(&mut self.table)?;
        write_cache(&self.cache_path, &self.table)?;
        self.transition(SessionState::Configured);
        Ok(())
    }

    /// Overlay the cached values without resolving anything.
    pub fn load_cache(&mut self) -> Result<()> {
        self.expect_state(SessionState::NotConfigured)?;
        let cached = read_cache(&self.cache_path)?;
        debug!("Loaded {} cached variables from {}", cached.len(), self.cache_path.display());
        self.table.overlay(cached);
        self.transition(SessionState::Configured);
        Ok(())
    }

    fn expect_state(&self, expected: SessionState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ConfigureError::Other {
                message: format!("configure session is {}, expected {}", self.state, expected),
            })
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Configure session: {} -> {}", self.state, next);
        self.state = next;
    }
}
