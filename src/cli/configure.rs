//! `atconf configure` - resolve variables, write the cache and configure files.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use super::common::CommandContext;
use super::expand::ExpandCommand;
use super::show::ShowCommand;
use crate::configure::Session;

/// Resolve every substitution variable and configure the project.
///
/// `NAME=VALUE` arguments directly after `configure` override or extend the
/// manifest's variables. Every variable is resolved, the results are written
/// to the cache, the configure files are rewritten and the constants module is
/// generated.
#[derive(Args, Debug)]
pub struct ConfigureCommand {
    /// Command to run with the configured variables afterwards
    #[command(subcommand)]
    then: Option<FollowUp>,
}

/// Commands that may follow `configure` in the same invocation.
#[derive(Subcommand, Debug)]
enum FollowUp {
    /// Print the configured variables
    Show(ShowCommand),
    /// Substitute a string with the configured variables
    Expand(ExpandCommand),
}

impl ConfigureCommand {
    pub fn execute(self, ctx: &CommandContext, overrides: BTreeMap<String, String>) -> Result<()> {
        let mut session = ctx.establish(Some(overrides))?;
        self.execute_with_session(ctx, &mut session)
    }

    fn execute_with_session(self, ctx: &CommandContext, session: &mut Session) -> Result<()> {
        let report = crate::configure::run(&ctx.manifest, session.table_mut())
            .context("Failed to configure project files")?;

        for file in &report.configured_files {
            println!("{} Configured {}", "✓".green(), file.display());
        }
        if let Some(module) = &report.constants_module {
            println!("{} Generated {}", "✓".green(), module.display());
        }
        tracing::info!("Configured {} variables", session.table().len());

        match self.then {
            Some(FollowUp::Show(cmd)) => cmd.execute_with_session(session),
            Some(FollowUp::Expand(cmd)) => cmd.execute_with_session(session),
            None => Ok(()),
        }
    }
}
