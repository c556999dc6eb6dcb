//! Command-line interface for atconf.
//!
//! # Commands
//!
//! - `configure [NAME=VALUE ...] [show|expand TEXT]` - resolve every variable,
//!   write the cache, rewrite the configure files and generate the constants
//!   module, optionally followed by another command
//! - `show` - print the variables, using the cache written by `configure`
//! - `expand TEXT` - substitute a string, using the cache written by `configure`
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging
//! - `--quiet` / `-q`: errors only
//! - `--manifest-path <PATH>`: use this manifest instead of searching for `atconf.toml`
//! - `--cache <PATH>`: cache file location (default `config.cache` next to the manifest)
//!
//! Logs go to stderr, command output to stdout. `RUST_LOG` takes precedence
//! over the verbosity flags.
//!
//! # Overrides
//!
//! `NAME=VALUE` arguments after `configure` are removed from the argument list
//! by [`overrides::parse_overrides`] before clap parses the rest, so they can
//! be mixed with options:
//!
//! ```bash
//! atconf configure PREFIX=/opt/acme DEBUG=1 --verbose show
//! ```

mod common;
mod configure;
mod expand;
pub mod overrides;
mod show;


use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::constants::CONFIGURE_COMMAND;
use common::CommandContext;

pub use common::format_table;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level filter (`debug`, `info`, `error`)
    pub log_level: Option<String>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            let level = self.log_level.as_deref().unwrap_or("info");
            EnvFilter::new(format!("atconf={level}"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "atconf",
    about = "Configure .in files by substituting @-variables",
    version,
    long_about = "atconf resolves @NAME@ variables declared in atconf.toml (including program \
                  lookups and command output), caches the results and rewrites .in templates."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to atconf.toml (default: search upwards from the current directory)
    #[arg(long, global = true)]
    manifest_path: Option<PathBuf>,

    /// Path to the configure cache (default: config.cache next to the manifest)
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// `NAME=VALUE` overrides extracted before parsing
    #[arg(skip)]
    overrides: BTreeMap<String, String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve variables, write the cache and configure files
    Configure(configure::ConfigureCommand),

    /// Print the substitution variables
    Show(show::ShowCommand),

    /// Substitute @-variables in a string
    Expand(expand::ExpandCommand),
}

impl Cli {
    /// Parse the process arguments, extracting `NAME=VALUE` overrides first.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse_with_overrides(std::env::args())
    }

    /// Parse an argument list (including the program name), exiting with
    /// clap's usage message on error.
    pub fn parse_with_overrides<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self::try_parse_with_overrides(args).unwrap_or_else(|e| e.exit())
    }

    /// Parse an argument list, extracting overrides after `configure` before
    /// clap sees it. Overrides are only recognised when `configure` is the
    /// subcommand itself, not an argument of another command or option.
    pub fn try_parse_with_overrides<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let (rest, overrides) = match Self::subcommand_position(&args) {
            Some(position) if args[position] == CONFIGURE_COMMAND => {
                let (tail, overrides) =
                    overrides::parse_overrides(&args[position..], CONFIGURE_COMMAND);
                let mut rest = args[..position].to_vec();
                rest.extend(tail);
                (rest, overrides)
            }
            _ => (args, BTreeMap::new()),
        };
        let mut cli = Self::try_parse_from(rest)?;
        cli.overrides = overrides;
        Ok(cli)
    }

    /// Index of the subcommand, skipping the program name and global options
    /// together with their values.
    fn subcommand_position(args: &[String]) -> Option<usize> {
        let command = Self::command();
        let takes_value: Vec<String> = command
            .get_arguments()
            .filter(|arg| arg.get_action().takes_values())
            .flat_map(|arg| {
                arg.get_long()
                    .map(|long| format!("--{long}"))
                    .into_iter()
                    .chain(arg.get_short().map(|short| format!("-{short}")))
            })
            .collect();

        let mut args = args.iter().enumerate().skip(1);
        while let Some((index, arg)) = args.next() {
            if takes_value.contains(arg) {
                args.next();
            } else if !arg.starts_with('-') {
                return Some(index);
            }
        }
        None
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
        }
    }

    /// Set up logging and run the selected command.
    pub fn execute(self) -> Result<()> {
        self.build_config().init_logging();

        let ctx = CommandContext::load(self.manifest_path, self.cache)?;
        match self.command {
            Commands::Configure(cmd) => cmd.execute(&ctx, self.overrides),
            Commands::Show(cmd) => cmd.execute(&ctx),
            Commands::Expand(cmd) => cmd.execute(&ctx),
        }
    }
}
