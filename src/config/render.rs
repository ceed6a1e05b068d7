//! Rendering configuration.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::parser::parse_toml_file;

/// Environment variable naming a configuration file.
pub const CONFIG_PATH_ENV: &str = "TILEKIT_CONFIG_PATH";

/// Environment variable selecting a preset (`development` or `production`).
pub const ENV_PRESET_ENV: &str = "TILEKIT_ENV";

const fn default_max_nesting_depth() -> usize {
    10
}

/// Which content source wins when several resolve to non-empty content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    /// Inline argument, then class declaration, then asset file.
    #[default]
    InlineFirst,
    /// Asset file, then class declaration, then inline argument.
    FileFirst,
}

/// Settings shared by every component defined in an
/// [`Environment`](crate::environment::Environment).
///
/// # Examples
///
/// ```toml
/// # ~/.tilekit/config.toml
/// precedence = "inline-first"
/// compile_views = true
/// components_root = "app/components"
/// max_nesting_depth = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Content source precedence for views and styles.
    pub precedence: Precedence,

    /// Compile each class's view once and reuse it. When `false`, every
    /// render resolves and interprets its view from scratch, which picks up
    /// edits to view files immediately.
    pub compile_views: bool,

    /// Remember which `view.*` / `style.*` files a class's asset directory
    /// contains after the first lookup.
    pub cache_asset_lookups: bool,

    /// Log a warning when a component shadows another component's helper
    /// name. Collisions are recorded as diagnostics either way.
    pub warn_on_helper_collision: bool,

    /// Directory holding one asset directory per component, named after the
    /// underscored component name (`navigation/dropdown_menu`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components_root: Option<PathBuf>,

    /// Limit on components rendering components from templates.
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            precedence: Precedence::default(),
            compile_views: true,
            cache_asset_lookups: false,
            warn_on_helper_collision: true,
            components_root: None,
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}

/// File values layered over a preset; absent keys keep the preset's value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RenderConfigFile {
    precedence: Option<Precedence>,
    compile_views: Option<bool>,
    cache_asset_lookups: Option<bool>,
    warn_on_helper_collision: Option<bool>,
    components_root: Option<PathBuf>,
    max_nesting_depth: Option<usize>,
}

impl RenderConfig {
    /// Interpreted rendering, no lookup caching, collision warnings on.
    pub fn development() -> Self {
        Self {
            compile_views: false,
            cache_asset_lookups: false,
            warn_on_helper_collision: true,
            ..Self::default()
        }
    }

    /// Compiled views, cached asset lookups, collision warnings off.
    pub fn production() -> Self {
        Self {
            compile_views: true,
            cache_asset_lookups: true,
            warn_on_helper_collision: false,
            ..Self::default()
        }
    }

    /// Preset selected by `TILEKIT_ENV`, or the defaults.
    pub fn from_env_preset() -> Self {
        match std::env::var(ENV_PRESET_ENV).ok().as_deref().map(str::trim) {
            Some("production") => Self::production(),
            Some("development") => Self::development(),
            Some("") | None => Self::default(),
            Some(other) => {
                tracing::warn!(
                    "Ignoring unknown {ENV_PRESET_ENV} value `{other}`; expected `development` or `production`"
                );
                Self::default()
            }
        }
    }

    /// Load configuration.
    ///
    /// Starts from the `TILEKIT_ENV` preset, then applies the first file
    /// found among: `explicit`, `TILEKIT_CONFIG_PATH`, and
    /// `~/.tilekit/config.toml`. Missing implicit files leave the preset
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` does not exist, or the chosen file
    /// cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let base = Self::from_env_preset();

        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Configuration file not found: {}", path.display());
            }
            return base.overlay_file(path);
        }

        let implicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from).or_else(Self::default_path);
        match implicit {
            Some(path) if path.is_file() => base.overlay_file(&path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(base)
            }
            None => Ok(base),
        }
    }

    /// Load a configuration file over the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::default().overlay_file(path)
    }

    fn overlay_file(self, path: &Path) -> Result<Self> {
        let file: RenderConfigFile = parse_toml_file(path)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");

        let config = Self {
            precedence: file.precedence.unwrap_or(self.precedence),
            compile_views: file.compile_views.unwrap_or(self.compile_views),
            cache_asset_lookups: file.cache_asset_lookups.unwrap_or(self.cache_asset_lookups),
            warn_on_helper_collision: file
                .warn_on_helper_collision
                .unwrap_or(self.warn_on_helper_collision),
            components_root: file.components_root.or(self.components_root),
            max_nesting_depth: file.max_nesting_depth.unwrap_or(self.max_nesting_depth),
        };
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            bail!("max_nesting_depth must be at least 1");
        }
        Ok(())
    }

    /// `~/.tilekit/config.toml`, or `%LOCALAPPDATA%\tilekit\config.toml` on
    /// Windows.
    pub fn default_path() -> Option<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()?.join("tilekit")
        } else {
            dirs::home_dir()?.join(".tilekit")
        };
        Some(config_dir.join("config.toml"))
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
