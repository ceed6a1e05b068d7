//! tilekit CLI entry point
//!
//! Parses the command line, runs the command and prints failures with
//! suggestions:
//! - `render` - Render a component directory to HTML
//! - `check` - Check every component below a directory
//! - `list` - List components and their props
//! - `config` - Show the effective configuration

use anyhow::Result;
use clap::Parser;
use tilekit::cli;
use tilekit::core::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
