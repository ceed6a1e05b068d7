//! Component manifests: components declared in `component.toml` files.
//!
//! A component directory holds a manifest next to its asset files. The
//! directory doubles as the component's asset directory, so `view.*` and
//! `style.*` files beside the manifest are picked up as usual.
//!
//! # Format
//!
//! ```toml
//! name = "DropdownMenu"
//! namespace = "Navigation"           # optional
//! description = "Menu with a toggle" # optional, shown by `tilekit list`
//!
//! [props.title]
//! type = "string"
//! required = true
//!
//! [props.items]
//! type = "array"
//! default = []
//!
//! [props.note]
//! type = "string"
//! allow_nil = true
//!
//! [view]                             # optional; a view.* file works too
//! format = "md"                      # default: tera
//! content = "## {{ title }}"
//!
//! [style]                            # optional; default format: css
//! content = "ul { margin: 0; }"
//! ```
//!
//! Props are declared in the order they appear in the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::component::{ComponentBuilder, Prop};
use crate::config::parse_toml_file;
use crate::core::ComponentError;
use crate::environment::Environment;
use crate::templating::content::{FormatTag, TypedContent};

/// A parsed `component.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentManifest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Props in file order, which is the order they are bound in.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub props: IndexMap<String, PropManifest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ContentManifest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ContentManifest>,

    /// Directory the manifest was loaded from.
    #[serde(skip)]
    dir: PathBuf,
}

/// One `[props.<name>]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropManifest {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub prop_type: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<toml::Value>,

    #[serde(default)]
    pub allow_nil: bool,
}

/// A `[view]` or `[style]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub content: String,
}

impl ComponentManifest {
    pub const FILE_NAME: &'static str = "component.toml";

    /// Load `dir/component.toml`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::Manifest`] when the file is missing, is not valid
    /// TOML, or has unknown keys.
    pub fn load(dir: &Path) -> Result<Self, ComponentError> {
        let path = dir.join(Self::FILE_NAME);
        let mut manifest: Self = parse_toml_file(&path).map_err(|e| ComponentError::Manifest {
            path: path.clone(),
            message: format!("{e:#}"),
        })?;
        manifest.dir = dir.to_path_buf();
        tracing::debug!(path = %path.display(), component = %manifest.full_name(), "Loaded component manifest");
        Ok(manifest)
    }

    /// Every manifest below `root`, in path order.
    pub fn discover(root: &Path) -> Result<Vec<Self>, ComponentError> {
        let mut manifests = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                ComponentError::io(path, e.into())
            })?;
            if entry.file_type().is_file() && entry.file_name() == Self::FILE_NAME {
                if let Some(dir) = entry.path().parent() {
                    manifests.push(Self::load(dir)?);
                }
            }
        }
        Ok(manifests)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(Self::FILE_NAME)
    }

    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}::{}", self.name),
            None => self.name.clone(),
        }
    }

    /// A builder declaring this component on `environment`, with the
    /// manifest's directory as asset directory.
    pub fn into_builder(
        self,
        environment: &Arc<Environment>,
    ) -> Result<ComponentBuilder, ComponentError> {
        let path = self.manifest_path();
        let mut builder = environment.component(&self.name).asset_dir(&self.dir);
        if let Some(namespace) = self.namespace {
            builder = builder.namespace(namespace);
        }

        for (name, prop) in self.props {
            let prop = prop.into_prop().map_err(|message| ComponentError::Manifest {
                path: path.clone(),
                message: format!("prop `{name}`: {message}"),
            })?;
            builder = builder.prop(name, prop);
        }

        if let Some(view) = self.view {
            builder = builder.view(view.into_typed(FormatTag::TERA));
        }
        if let Some(style) = self.style {
            builder = builder.style(style.into_typed(FormatTag::CSS));
        }
        Ok(builder)
    }
}

impl PropManifest {
    fn into_prop(self) -> Result<Prop, String> {
        let mut prop = match self.prop_type {
            Some(type_name) => Prop::typed(type_name),
            None => Prop::new(),
        };
        if self.required {
            prop = prop.required();
        }
        if self.allow_nil {
            prop = prop.allow_nil();
        }
        if let Some(default) = self.default {
            let default = serde_json::to_value(&default)
                .map_err(|e| format!("default cannot be represented as JSON: {e}"))?;
            prop = prop.with_default(default);
        }
        Ok(prop)
    }
}

impl ContentManifest {
    fn into_typed(self, default_format: FormatTag) -> TypedContent {
        let format = self.format.map_or(default_format, FormatTag::new);
        TypedContent::literal(format, self.content)
    }
}
