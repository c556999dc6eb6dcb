//! `atconf expand` - substitute a string.

use anyhow::{Context, Result};
use clap::Args;

use super::common::CommandContext;
use crate::configure::Session;
use crate::substitution::substitute_text;

/// Substitute `@NAME@` references in TEXT and print the result.
#[derive(Args, Debug)]
pub struct ExpandCommand {
    /// Text to substitute, e.g. "@PREFIX@/bin"
    text: String,
}

impl ExpandCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut session = ctx.establish(None)?;
        self.execute_with_session(&mut session)
    }

    pub fn execute_with_session(self, session: &mut Session) -> Result<()> {
        let expanded = substitute_text(&self.text, session.table_mut())
            .with_context(|| format!("Failed to expand '{}'", self.text))?;
        println!("{expanded}");
        Ok(())
    }
}
