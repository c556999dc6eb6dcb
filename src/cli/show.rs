//! `atconf show` - print the substitution variables.

use anyhow::{Context, Result};
use clap::Args;

use super::common::{CommandContext, format_table};
use crate::configure::Session;
use crate::substitution::flatten;

/// Print every substitution variable as `NAME=value`, sorted by name.
///
/// Cached values are printed as they are; variables that are not in the cache
/// are resolved first (which may look up programs or run commands).
#[derive(Args, Debug)]
pub struct ShowCommand {}

impl ShowCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut session = ctx.establish(None)?;
        self.execute_with_session(&mut session)
    }

    pub fn execute_with_session(self, session: &mut Session) -> Result<()> {
        flatten(session.table_mut()).context("Failed to resolve substitution variables")?;
        print!("{}", format_table(session.table())?);
        Ok(())
    }
}
