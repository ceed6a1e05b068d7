//! Check every component below a directory.
//!
//! For each `component.toml` the command builds the class, resolves its
//! view and style sources and parses the view, without rendering. This
//! catches unknown prop types, ambiguous asset directories, unknown formats,
//! blank declarations and template syntax errors.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::OutputFormat;
use crate::component::SourceReport;
use crate::core::ComponentError;
use crate::environment::Environment;
use crate::manifest::ComponentManifest;

#[derive(Args)]
pub struct CheckCommand {
    /// Directory to search for `component.toml` files
    #[arg(value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Output format: text or json
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Treat helper name collisions as failures
    #[arg(long)]
    pub strict: bool,
}

/// Result for one component.
#[derive(Debug, Serialize)]
struct CheckResult {
    component: String,
    path: PathBuf,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckSummary {
    valid: bool,
    components: Vec<CheckResult>,
    warnings: Vec<String>,
}

impl CheckCommand {
    pub fn execute(self, environment: &Arc<Environment>, quiet: bool) -> Result<()> {
        let manifests = ComponentManifest::discover(&self.root)?;
        if manifests.is_empty() && self.format == OutputFormat::Text && !quiet {
            println!("{} No components found below {}", "⚠".yellow(), self.root.display());
        }

        let components: Vec<CheckResult> =
            manifests.into_iter().map(|manifest| check_one(environment, manifest)).collect();
        let warnings: Vec<String> =
            environment.helpers().diagnostics().iter().map(ToString::to_string).collect();

        let failed = components.iter().filter(|result| !result.valid).count();
        let valid = failed == 0 && !(self.strict && !warnings.is_empty());
        let summary = CheckSummary {
            valid,
            components,
            warnings,
        };

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            OutputFormat::Text if !quiet => print_text(&summary),
            OutputFormat::Text => {}
        }

        if failed > 0 {
            bail!("{failed} of {} components failed the check", summary.components.len());
        }
        if !summary.valid {
            bail!("Helper name collisions found (--strict)");
        }
        Ok(())
    }
}

fn check_one(environment: &Arc<Environment>, manifest: ComponentManifest) -> CheckResult {
    let component = manifest.full_name();
    let path = manifest.manifest_path();

    let checked = manifest
        .into_builder(environment)
        .and_then(|builder| builder.define())
        .and_then(|class| class.check());

    match checked {
        Ok(SourceReport {
            view,
            style,
        }) => CheckResult {
            component,
            path,
            valid: true,
            view: view.map(|(origin, format)| format!("{format} from {origin}")),
            style: style.map(|(origin, format)| format!("{format} from {origin}")),
            error: None,
        },
        Err(error) => {
            tracing::debug!(%component, %error, "Component failed the check");
            CheckResult {
                component,
                path,
                valid: false,
                view: None,
                style: None,
                error: Some(describe(&error)),
            }
        }
    }
}

fn describe(error: &ComponentError) -> String {
    match error {
        ComponentError::Template(template_error) => template_error.format_with_context(),
        other => other.to_string(),
    }
}

fn print_text(summary: &CheckSummary) {
    for result in &summary.components {
        if result.valid {
            let view = result.view.as_deref().unwrap_or("no class-level view");
            println!("{} {} ({view})", "✓".green(), result.component.bold());
            if let Some(style) = &result.style {
                println!("    style: {style}");
            }
        } else {
            println!("{} {} {}", "✗".red(), result.component.bold(), result.path.display());
            if let Some(error) = &result.error {
                for line in error.lines() {
                    println!("    {line}");
                }
            }
        }
    }

    for warning in &summary.warnings {
        println!("{} {warning}", "⚠".yellow());
    }

    let failed = summary.components.iter().filter(|result| !result.valid).count();
    if failed == 0 {
        println!("{} {} component(s) checked", "✓".green(), summary.components.len());
    }
}
