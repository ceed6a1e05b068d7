//! Command-line interface for tilekit.
//!
//! The CLI works on component directories: each directory holds a
//! `component.toml` manifest plus optional `view.*` / `style.*` files.
//!
//! # Commands
//!
//! - `render` - Render one component to HTML
//! - `check` - Resolve and parse every component below a directory
//! - `list` - List the components declared below a directory
//! - `config` - Show the effective render configuration
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--config <PATH>` - Use a specific configuration file
//!
//! # Examples
//!
//! ```bash
//! # Render a component with props
//! tilekit render components/card --props '{"title": "Hello"}'
//!
//! # Render with access to sibling components for nesting
//! tilekit render components/page --root components
//!
//! # Check every component, machine-readable
//! tilekit check components --format json
//! ```

mod check;
mod config;
mod list;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::RenderConfig;
use crate::environment::Environment;

pub use check::CheckCommand;
pub use config::ConfigCommand;
pub use list::ListCommand;
pub use render::RenderCommand;

/// Output format for reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Text,
    /// Structured JSON for automation
    Json,
}

/// Top-level command-line interface.
#[derive(Parser)]
#[command(
    name = "tilekit",
    about = "Render reusable view components",
    version,
    long_about = "tilekit renders components declared in component.toml directories: typed props, a view and an optional scoped style."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    ///
    /// Mutually exclusive with `--verbose`.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file.
    ///
    /// Overrides `TILEKIT_CONFIG_PATH` and `~/.tilekit/config.toml`.
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a component directory to HTML.
    Render(RenderCommand),

    /// Check that every component below a directory resolves and parses.
    Check(CheckCommand),

    /// List the components below a directory.
    List(ListCommand),

    /// Show the effective render configuration.
    Config(ConfigCommand),
}

impl Cli {
    /// Initialize logging, load the configuration and run the command.
    pub fn execute(self) -> Result<()> {
        init_logging(self.log_level());

        let config = RenderConfig::load(self.config.as_deref())?;
        tracing::debug!(?config, "Effective configuration");

        match self.command {
            Commands::Render(cmd) => cmd.execute(&Environment::new(config)),
            Commands::Check(cmd) => cmd.execute(&Environment::new(config), self.quiet),
            Commands::List(cmd) => cmd.execute(),
            Commands::Config(cmd) => cmd.execute(&config, self.config.as_deref()),
        }
    }

    /// `None` when quiet.
    fn log_level(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            None
        } else {
            Some("warn")
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the level derived
/// from the flags.
fn init_logging(level: Option<&str>) {
    let filter = match (std::env::var("RUST_LOG"), level) {
        (Ok(_), _) => EnvFilter::from_default_env(),
        (Err(_), Some(level)) => EnvFilter::new(format!("tilekit={level}")),
        (Err(_), None) => EnvFilter::new("error"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
