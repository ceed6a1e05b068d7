//! Test fixtures for component directories

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Files making up one component directory.
#[derive(Clone, Debug, Default)]
pub struct ComponentFixture {
    /// Directory name relative to the root it is written to
    pub dir: String,
    pub manifest: Option<String>,
    pub files: Vec<(String, String)>,
}

impl ComponentFixture {
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn manifest(mut self, content: impl Into<String>) -> Self {
        self.manifest = Some(content.into());
        self
    }

    pub fn file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((name.into(), content.into()));
        self
    }

    /// Add `view.<extension>`.
    pub fn view(self, extension: &str, content: impl Into<String>) -> Self {
        self.file(format!("view.{extension}"), content)
    }

    /// Add `style.<extension>`.
    pub fn style(self, extension: &str, content: impl Into<String>) -> Self {
        self.file(format!("style.{extension}"), content)
    }

    /// A component with a defaulted prop, a Tera view file and a CSS file.
    pub fn badge() -> Self {
        Self::new("badge")
            .manifest(
                r#"
name = "Badge"

[props.description]
type = "string"
default = "Default Description"
"#,
            )
            .view("tera", "<div>{{ description }}</div>")
            .style("css", "div { color: blue; }")
    }

    /// A component with one required prop.
    pub fn greeting() -> Self {
        Self::new("greeting")
            .manifest(
                r#"
name = "Greeting"

[props.name]
type = "string"
required = true
"#,
            )
            .view("tera", "<p>Hello {{ name }}</p>")
    }

    /// A component whose view does not parse.
    pub fn broken() -> Self {
        Self::new("broken")
            .manifest("name = \"Broken\"\n")
            .view("tera", "<p>{% if %}</p>")
    }

    /// Write the directory under `root` and return its path.
    pub fn write_to(&self, root: &Path) -> Result<PathBuf> {
        let dir = root.join(&self.dir);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        if let Some(manifest) = &self.manifest {
            fs::write(dir.join("component.toml"), manifest.trim_start())
                .context("Failed to write component.toml")?;
        }
        for (name, content) in &self.files {
            fs::write(dir.join(name), content)
                .with_context(|| format!("Failed to write {name}"))?;
        }
        Ok(dir)
    }
}
