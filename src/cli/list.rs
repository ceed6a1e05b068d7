//! List the components declared below a directory.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::OutputFormat;
use crate::manifest::ComponentManifest;

#[derive(Args)]
pub struct ListCommand {
    /// Directory to search for `component.toml` files
    #[arg(value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Output format: text or json
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct ListEntry {
    component: String,
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    props: Vec<String>,
    required: Vec<String>,
}

impl ListCommand {
    pub fn execute(self) -> Result<()> {
        let entries: Vec<ListEntry> = ComponentManifest::discover(&self.root)?
            .into_iter()
            .map(|manifest| ListEntry {
                component: manifest.full_name(),
                path: manifest.dir().to_path_buf(),
                props: manifest.props.keys().cloned().collect(),
                required: manifest
                    .props
                    .iter()
                    .filter(|(_, prop)| prop.required)
                    .map(|(name, _)| name.clone())
                    .collect(),
                description: manifest.description,
            })
            .collect();

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        if entries.is_empty() {
            println!("No components found below {}", self.root.display());
            return Ok(());
        }

        for entry in &entries {
            let props: Vec<String> = entry
                .props
                .iter()
                .map(|name| {
                    if entry.required.contains(name) {
                        format!("{name}*")
                    } else {
                        name.clone()
                    }
                })
                .collect();

            println!("{} {}", entry.component.bold(), entry.path.display().to_string().dimmed());
            if let Some(description) = &entry.description {
                println!("    {description}");
            }
            if !props.is_empty() {
                println!("    props: {}", props.join(", "));
            }
        }
        Ok(())
    }
}
