//! Test environment setup and management
//!
//! A [`TestEnvironment`] owns a temporary directory whose `components`
//! subdirectory is the components root of its rendering environment, so
//! classes built without an explicit asset directory find their files
//! under it.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use super::fixtures::ComponentFixture;
use crate::config::RenderConfig;
use crate::environment::Environment;
use crate::helpers::naming::underscore;

/// Temporary components root plus an environment configured for it.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub components_root: PathBuf,
    environment: Arc<Environment>,
}

impl TestEnvironment {
    /// Default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(RenderConfig::default())
    }

    /// `config` with `components_root` pointed at the temporary directory.
    pub fn with_config(config: RenderConfig) -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let components_root = temp_dir.path().join("components");
        fs::create_dir_all(&components_root)?;

        let environment = Environment::new(RenderConfig {
            components_root: Some(components_root.clone()),
            ..config
        });

        Ok(Self {
            temp_dir,
            components_root,
            environment,
        })
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The asset directory a class named `full_name` uses by default.
    pub fn asset_dir(&self, full_name: &str) -> PathBuf {
        self.components_root.join(underscore(full_name))
    }

    /// Write `file` into the default asset directory of `full_name`.
    pub fn write_asset(&self, full_name: &str, file: &str, content: &str) -> Result<PathBuf> {
        let dir = self.asset_dir(full_name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(file);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a component directory under the components root.
    pub fn add_component(&self, fixture: &ComponentFixture) -> Result<PathBuf> {
        fixture.write_to(&self.components_root)
    }
}
