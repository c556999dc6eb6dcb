//! atconf CLI entry point
//!
//! Parses the command line (pulling `NAME=VALUE` overrides out first), runs the
//! selected command and reports failures with context and suggestions.

use atconf::cli::Cli;
use atconf::core::user_friendly_error;

fn main() {
    let cli = Cli::parse_args();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}
