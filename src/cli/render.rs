//! Render one component directory to HTML.

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::component::RenderArgs;
use crate::environment::Environment;

/// Render a component.
///
/// Props come from `--props` (inline JSON) or `--props-file`. With
/// `--root`, every component below that directory is registered first, so
/// the view can render them through `component(name=...)`. `--view` and
/// `--style` pass inline markup that competes with the component's own
/// sources under the configured precedence.
#[derive(Args)]
pub struct RenderCommand {
    /// Directory holding the component's `component.toml`
    #[arg(value_name = "DIR")]
    pub component: PathBuf,

    /// Props and state as a JSON object
    #[arg(long, value_name = "JSON", conflicts_with = "props_file")]
    pub props: Option<String>,

    /// File holding the props as a JSON object
    #[arg(long, value_name = "FILE")]
    pub props_file: Option<PathBuf>,

    /// Inline view markup, emitted without interpolation
    #[arg(long, value_name = "MARKUP")]
    pub view: Option<String>,

    /// Inline style sheet
    #[arg(long, value_name = "CSS")]
    pub style: Option<String>,

    /// Register every component below this directory before rendering
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Write the HTML to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn execute(self, environment: &Arc<Environment>) -> Result<()> {
        let registered = match &self.root {
            Some(root) => environment.load_components(root)?,
            None => Vec::new(),
        };

        let existing =
            registered.iter().find(|class| same_dir(class.asset_dir(), &self.component));
        let class = match existing {
            Some(class) => Arc::clone(class),
            None => environment.load_component(&self.component)?,
        };

        let mut args = RenderArgs::from_value(self.read_props()?)?;
        if let Some(view) = &self.view {
            args = args.view(view.as_str());
        }
        if let Some(style) = &self.style {
            args = args.style(style.as_str());
        }
        let html = class.render(args)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!(
                    path = %path.display(),
                    component = %class.full_name(),
                    "Wrote rendered component"
                );
            }
            None => println!("{html}"),
        }
        Ok(())
    }

    fn read_props(&self) -> Result<Value> {
        let text = match (&self.props, &self.props_file) {
            (Some(json), _) => json.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read props file: {}", path.display()))?,
            (None, None) => return Ok(Value::Null),
        };

        let value: Value = serde_json::from_str(&text).context("Props must be valid JSON")?;
        if !(value.is_object() || value.is_null()) {
            bail!("Props must be a JSON object");
        }
        Ok(value)
    }
}

fn same_dir(asset_dir: Option<&Path>, dir: &Path) -> bool {
    let Some(asset_dir) = asset_dir else {
        return false;
    };
    match (asset_dir.canonicalize(), dir.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => asset_dir == dir,
    }
}
