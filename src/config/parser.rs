//! TOML file parsing shared by the render configuration and component
//! manifests.
//!
//! Errors carry the file path as context:
//!
//! ```text
//! Failed to parse TOML file: /path/to/config.toml
//! Caused by:
//!     invalid type: string "yes", expected a boolean
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Read `path` and deserialize it as TOML into `T`.
///
/// # Examples
///
/// ```rust,no_run
/// use tilekit::config::parse_toml_file;
/// use tilekit::config::RenderConfig;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: RenderConfig = parse_toml_file(Path::new("tilekit.toml"))?;
/// println!("compile views: {}", config.compile_views);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or does
/// not match the shape of `T`.
pub fn parse_toml_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read TOML file: {}", path.display()))?;

    let parsed: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML file: {}", path.display()))?;

    Ok(parsed)
}
