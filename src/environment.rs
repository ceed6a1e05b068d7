//! The rendering environment shared by a set of component classes.
//!
//! An [`Environment`] owns the [`RenderConfig`], the
//! [`TemplateDispatcher`] with its engines, and the [`HelperRegistry`]
//! through which components find each other by name. Hosts usually create
//! one environment at startup and define every component against it.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::component::{ComponentBuilder, ComponentClass, RenderArgs};
use crate::config::RenderConfig;
use crate::core::ComponentError;
use crate::helpers::{HelperHandle, HelperRegistry};
use crate::manifest::ComponentManifest;
use crate::templating::TemplateDispatcher;

#[derive(Debug)]
pub struct Environment {
    config: RenderConfig,
    dispatcher: Arc<TemplateDispatcher>,
    helpers: Arc<HelperRegistry>,
}

impl Environment {
    /// An environment with the built-in engines.
    pub fn new(config: RenderConfig) -> Arc<Self> {
        Self::with_dispatcher(config, TemplateDispatcher::new())
    }

    /// An environment with a customized dispatcher, e.g. one with an `scss`
    /// style engine registered.
    pub fn with_dispatcher(config: RenderConfig, dispatcher: TemplateDispatcher) -> Arc<Self> {
        let helpers = Arc::new(HelperRegistry::new(config.warn_on_helper_collision));
        Arc::new(Self {
            config,
            dispatcher: Arc::new(dispatcher),
            helpers,
        })
    }

    /// An environment configured by [`RenderConfig::load`].
    pub fn load(config_path: Option<&Path>) -> Result<Arc<Self>> {
        let config = RenderConfig::load(config_path)?;
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<TemplateDispatcher> {
        &self.dispatcher
    }

    pub fn helpers(&self) -> &Arc<HelperRegistry> {
        &self.helpers
    }

    /// Start declaring a component. `name` may be namespaced
    /// (`Navigation::DropdownMenu`).
    pub fn component(self: &Arc<Self>, name: &str) -> ComponentBuilder {
        ComponentBuilder::new(Arc::clone(self), name)
    }

    /// Build and register a component declared on this environment.
    pub fn define(&self, builder: ComponentBuilder) -> Result<Arc<ComponentClass>, ComponentError> {
        builder.define()
    }

    /// Install the helper names of `class`.
    pub fn register(&self, class: &Arc<ComponentClass>) -> HelperHandle {
        self.helpers.register(class)
    }

    /// Remove the helper names of `class`. Returns how many were removed.
    ///
    /// The registry holds every defined class alive; this is the only way
    /// to release one.
    pub fn undefine(&self, class: &Arc<ComponentClass>) -> usize {
        let handle = self.helpers.handle_for(class);
        self.helpers.unregister(&handle)
    }

    /// Find a registered component by helper name.
    pub fn lookup(&self, name: &str) -> Result<Arc<ComponentClass>, ComponentError> {
        self.helpers.lookup(name)
    }

    /// Render a registered component by helper name.
    pub fn render(&self, name: &str, args: RenderArgs) -> Result<String, ComponentError> {
        self.lookup(name)?.render(args)
    }

    /// Define and register a component from a directory holding a
    /// `component.toml` manifest.
    pub fn load_component(
        self: &Arc<Self>,
        dir: &Path,
    ) -> Result<Arc<ComponentClass>, ComponentError> {
        ComponentManifest::load(dir)?.into_builder(self)?.define()
    }

    /// Load every manifest below `root`. Stops at the first invalid one.
    pub fn load_components(
        self: &Arc<Self>,
        root: &Path,
    ) -> Result<Vec<Arc<ComponentClass>>, ComponentError> {
        ComponentManifest::discover(root)?
            .into_iter()
            .map(|manifest| manifest.into_builder(self)?.define())
            .collect()
    }
}
