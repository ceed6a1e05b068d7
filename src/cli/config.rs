//! Show the effective render configuration.

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::config::{CONFIG_PATH_ENV, RenderConfig};

#[derive(Args)]
pub struct ConfigCommand {
    /// Print only the path of the configuration file in use
    #[arg(long)]
    pub path: bool,
}

impl ConfigCommand {
    pub fn execute(self, config: &RenderConfig, explicit: Option<&Path>) -> Result<()> {
        let source = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(Into::into))
            .or_else(RenderConfig::default_path)
            .filter(|path| path.is_file());

        if self.path {
            match &source {
                Some(path) => println!("{}", path.display()),
                None => println!("(defaults)"),
            }
            return Ok(());
        }

        if let Some(path) = &source {
            println!("# {}", path.display());
        }
        print!("{}", config.to_toml()?);
        Ok(())
    }
}
