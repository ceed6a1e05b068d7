//! Component classes and the builder that declares them.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use super::assets::AssetLocator;
use super::callbacks::{AroundHook, Callbacks, Hook, HookRef, Next, PendingHook, Phase};
use super::instance::{Component, RenderArgs};
use super::props::{Prop, PropDefinition, PropRegistry};
use super::resolver::{self, ResolvedContent};
use crate::config::RenderConfig;
use crate::core::ComponentError;
use crate::environment::Environment;
use crate::helpers::naming::{self, underscore};
use crate::templating::cache::{RenderCache, RenderCacheStats};
use crate::templating::content::{ContentOrigin, FormatTag, TypedContent};
use crate::templating::dispatcher::{ContentKind, TemplateDispatcher};
use crate::templating::engine::{CompiledTemplate, TemplateScope};

/// What a class renders when no inline view overrides it.
pub(crate) enum ClassView {
    /// Neither an asset file nor a declaration produced a view.
    Missing,
    /// A source re-rendered on every call.
    Interpreted(ResolvedContent),
    Compiled {
        routine: Arc<dyn CompiledTemplate>,
        origin: ContentOrigin,
    },
}

/// Where the view and style of a class come from, as reported by
/// [`ComponentClass::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub view: Option<(ContentOrigin, FormatTag)>,
    pub style: Option<(ContentOrigin, FormatTag)>,
}

/// A declared component: props, view and style sources, asset directory and
/// lifecycle callbacks.
///
/// Create one with [`Environment::component`] and
/// [`ComponentBuilder::define`]. Classes are shared as `Arc`s and rendered
/// from any number of threads.
pub struct ComponentClass {
    name: String,
    namespace: Option<String>,
    full_name: String,
    config: RenderConfig,
    dispatcher: Arc<TemplateDispatcher>,
    props: PropRegistry,
    declared_view: Option<TypedContent>,
    declared_style: Option<TypedContent>,
    assets: AssetLocator,
    callbacks: Callbacks,
    scope: TemplateScope,
    render_cache: RenderCache<ClassView>,
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.full_name)
            .field("props", &self.props.names())
            .field("declared_view", &self.declared_view)
            .field("declared_style", &self.declared_style)
            .field("asset_dir", &self.assets.dir())
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

impl ComponentClass {
    /// Short name, e.g. `DropdownMenu`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Qualified name, e.g. `Navigation::DropdownMenu`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &TemplateDispatcher {
        &self.dispatcher
    }

    pub fn props(&self) -> &PropRegistry {
        &self.props
    }

    pub fn prop_names(&self) -> Vec<&str> {
        self.props.names()
    }

    pub fn required_prop_names(&self) -> Vec<&str> {
        self.props.required_names()
    }

    pub fn prop_definition(&self, name: &str) -> Option<&PropDefinition> {
        self.props.get(name)
    }

    pub fn declared_view(&self) -> Option<&TypedContent> {
        self.declared_view.as_ref()
    }

    pub fn declared_style(&self) -> Option<&TypedContent> {
        self.declared_style.as_ref()
    }

    pub(crate) fn declared(&self, kind: ContentKind) -> Option<&TypedContent> {
        match kind {
            ContentKind::View => self.declared_view.as_ref(),
            ContentKind::Style => self.declared_style.as_ref(),
        }
    }

    pub fn asset_dir(&self) -> Option<&Path> {
        self.assets.dir()
    }

    pub(crate) fn assets(&self) -> &AssetLocator {
        &self.assets
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    pub(crate) fn scope(&self) -> &TemplateScope {
        &self.scope
    }

    /// A CSS identifier scoped to this component.
    pub fn css_id(&self, name: &str) -> String {
        naming::scoped_css_identifier(&self.scope.css_prefix, name)
    }

    /// Create an instance: run the `initialize` phase, binding `args`.
    pub fn instantiate(self: &Arc<Self>, args: RenderArgs) -> Result<Component, ComponentError> {
        Component::new(Arc::clone(self), args)
    }

    /// Instantiate and render in one step.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use tilekit::component::{Prop, RenderArgs};
    /// use tilekit::config::RenderConfig;
    /// use tilekit::environment::Environment;
    /// use tilekit::templating::TypedContent;
    ///
    /// # fn main() -> Result<(), tilekit::core::ComponentError> {
    /// let env = Environment::new(RenderConfig::default());
    /// let greeting = env
    ///     .component("Greeting")
    ///     .prop("name", Prop::typed("string").required())
    ///     .view(TypedContent::literal("tera", "<p>Hello {{ name }}</p>"))
    ///     .define()?;
    ///
    /// let html = greeting.render(RenderArgs::new().arg("name", "Ada"))?;
    /// assert_eq!(html, "<p>Hello Ada</p>");
    /// # Ok(())
    /// # }
    /// ```
    pub fn render(self: &Arc<Self>, args: RenderArgs) -> Result<String, ComponentError> {
        self.instantiate(args)?.render()
    }

    /// Render with a nested content block, available to the view as
    /// `children` and `nested_content`. The block runs once, inside the
    /// render phase.
    pub fn render_with<F>(self: &Arc<Self>, args: RenderArgs, block: F) -> Result<String, ComponentError>
    where
        F: FnOnce() -> Result<String, ComponentError>,
    {
        self.instantiate(args)?.render_with(block)
    }

    /// Render from a JSON object of props and state.
    pub fn render_value(self: &Arc<Self>, values: Value) -> Result<String, ComponentError> {
        self.render(RenderArgs::from_value(values)?)
    }

    /// Resolve and compile the class-level view now instead of on first
    /// render. No-op when compilation is disabled.
    pub fn compile(&self) -> Result<(), ComponentError> {
        if self.config().compile_views {
            self.class_view()?;
        }
        Ok(())
    }

    /// Whether the view has been compiled into the render cache.
    pub fn is_compiled(&self) -> bool {
        self.render_cache
            .peek()
            .is_some_and(|view| matches!(view.as_ref(), ClassView::Compiled { .. }))
    }

    pub fn cache_stats(&self) -> RenderCacheStats {
        self.render_cache.stats()
    }

    /// Resolve the class-level view and style without rendering, parsing
    /// the view to surface syntax errors.
    pub fn check(&self) -> Result<SourceReport, ComponentError> {
        let view = resolver::class_candidate(ContentKind::View, self)?;
        if let Some(ResolvedContent::Template {
            format,
            source,
            origin,
        }) = &view
        {
            self.dispatcher.compile(
                ContentKind::View,
                Some(format),
                &self.template_name(),
                source,
                &self.scope,
                origin,
            )?;
        }
        let style = resolver::class_candidate(ContentKind::Style, self)?;

        let describe = |content: Option<ResolvedContent>| {
            content.and_then(|content| Some((content.origin(), content.format()?.clone())))
        };
        Ok(SourceReport {
            view: describe(view),
            style: describe(style),
        })
    }

    fn template_name(&self) -> String {
        format!("{}#view", self.full_name)
    }

    /// The class-level view, from the render cache when compilation is on.
    pub(crate) fn class_view(&self) -> Result<Arc<ClassView>, ComponentError> {
        if !self.config().compile_views {
            return self.resolve_class_view(false).map(Arc::new);
        }
        self.render_cache.get_or_try_init(|| self.resolve_class_view(true))
    }

    fn resolve_class_view(&self, compile: bool) -> Result<ClassView, ComponentError> {
        let candidate = resolver::class_candidate(ContentKind::View, self)?;
        let view = match candidate {
            None => ClassView::Missing,
            Some(ResolvedContent::Template {
                format,
                source,
                origin,
            }) if compile => {
                let compiled = self.dispatcher.compile(
                    ContentKind::View,
                    Some(&format),
                    &self.template_name(),
                    &source,
                    &self.scope,
                    &origin,
                )?;
                match compiled {
                    Some(routine) => {
                        tracing::debug!(component = %self.full_name, %origin, "Compiled view");
                        ClassView::Compiled {
                            routine,
                            origin,
                        }
                    }
                    None => ClassView::Interpreted(ResolvedContent::Template {
                        format,
                        source,
                        origin,
                    }),
                }
            }
            Some(content) => ClassView::Interpreted(content),
        };
        Ok(view)
    }
}

/// Declares a component class.
///
/// Obtained from [`Environment::component`]; finish with
/// [`ComponentBuilder::define`] (build and register helpers) or
/// [`ComponentBuilder::build`] (build only).
pub struct ComponentBuilder {
    environment: Arc<Environment>,
    name: String,
    namespace: Option<String>,
    props: Vec<(String, Prop)>,
    view: Option<TypedContent>,
    style: Option<TypedContent>,
    asset_dir: Option<PathBuf>,
    hooks: Vec<PendingHook>,
    methods: HashMap<String, Hook>,
    around_methods: HashMap<String, AroundHook>,
}

impl fmt::Debug for ComponentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentBuilder")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("props", &self.props.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .field("asset_dir", &self.asset_dir)
            .finish_non_exhaustive()
    }
}

impl ComponentBuilder {
    /// `name` may be qualified (`Navigation::DropdownMenu`).
    pub(crate) fn new(environment: Arc<Environment>, name: &str) -> Self {
        let (namespace, short) = naming::split_qualified(name.trim());
        Self {
            environment,
            name: short.to_string(),
            namespace: namespace.map(str::to_string),
            props: Vec::new(),
            view: None,
            style: None,
            asset_dir: None,
            hooks: Vec::new(),
            methods: HashMap::new(),
            around_methods: HashMap::new(),
        }
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, prop: Prop) -> Self {
        self.props.push((name.into(), prop));
        self
    }

    /// Declare several props sharing one declaration.
    #[must_use]
    pub fn props(mut self, names: &[&str], prop: Prop) -> Self {
        for name in names {
            self.props.push(((*name).to_string(), prop.clone()));
        }
        self
    }

    #[must_use]
    pub fn view(mut self, content: TypedContent) -> Self {
        self.view = Some(content);
        self
    }

    /// Declare a view produced on demand.
    #[must_use]
    pub fn view_with<F>(self, format: impl Into<FormatTag>, producer: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.view(TypedContent::deferred(format, producer))
    }

    #[must_use]
    pub fn style(mut self, content: TypedContent) -> Self {
        self.style = Some(content);
        self
    }

    #[must_use]
    pub fn style_with<F>(self, format: impl Into<FormatTag>, producer: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.style(TypedContent::deferred(format, producer))
    }

    /// Use `dir` as the asset directory instead of the one derived from
    /// `components_root`.
    #[must_use]
    pub fn asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn before<F>(mut self, phase: Phase, hook: F) -> Self
    where
        F: Fn(&mut Component) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.push(PendingHook::Before(phase, HookRef::Inline(Arc::new(hook))));
        self
    }

    #[must_use]
    pub fn around<F>(mut self, phase: Phase, hook: F) -> Self
    where
        F: Fn(&mut Component, Next<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.push(PendingHook::Around(phase, HookRef::Inline(Arc::new(hook))));
        self
    }

    #[must_use]
    pub fn after<F>(mut self, phase: Phase, hook: F) -> Self
    where
        F: Fn(&mut Component) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.push(PendingHook::After(phase, HookRef::Inline(Arc::new(hook))));
        self
    }

    /// Register the method `name` as a before hook. The method may be
    /// defined later on the same builder.
    #[must_use]
    pub fn before_method(mut self, phase: Phase, name: impl Into<String>) -> Self {
        self.hooks.push(PendingHook::Before(phase, HookRef::Method(name.into())));
        self
    }

    #[must_use]
    pub fn around_method(mut self, phase: Phase, name: impl Into<String>) -> Self {
        self.hooks.push(PendingHook::Around(phase, HookRef::Method(name.into())));
        self
    }

    #[must_use]
    pub fn after_method(mut self, phase: Phase, name: impl Into<String>) -> Self {
        self.hooks.push(PendingHook::After(phase, HookRef::Method(name.into())));
        self
    }

    /// Define a method usable by `before_method` and `after_method`.
    #[must_use]
    pub fn define_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut Component) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Define a method usable by `around_method`.
    #[must_use]
    pub fn define_around_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut Component, Next<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.around_methods.insert(name.into(), Arc::new(method));
        self
    }

    fn full_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}::{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Build the class without registering helper names.
    ///
    /// # Errors
    ///
    /// - [`ComponentError::InvalidComponentName`] for a malformed name
    /// - [`ComponentError::IncorrectPropType`] for an unknown prop type name
    /// - [`ComponentError::UndefinedCallback`] for a hook naming an
    ///   undefined method
    pub fn build(self) -> Result<Arc<ComponentClass>, ComponentError> {
        let full_name = self.full_name();
        if !naming::is_valid_component_name(&full_name) {
            return Err(ComponentError::InvalidComponentName {
                name: full_name,
            });
        }

        let mut props = PropRegistry::default();
        for (name, prop) in self.props {
            props.declare(PropDefinition::resolve(&full_name, name, prop)?);
        }

        let callbacks =
            Callbacks::resolve(&full_name, self.hooks, &self.methods, &self.around_methods)?;

        let config = self.environment.config();
        let asset_dir = self.asset_dir.or_else(|| {
            config.components_root.as_ref().map(|root| root.join(underscore(&full_name)))
        });
        let assets = AssetLocator::new(asset_dir, config.cache_asset_lookups);

        let scope = TemplateScope {
            component_name: full_name.clone(),
            css_prefix: naming::css_prefix(&full_name),
            helpers: Arc::downgrade(self.environment.helpers()),
            max_depth: config.max_nesting_depth,
        };

        tracing::debug!(
            component = %full_name,
            props = props.len(),
            asset_dir = ?assets.dir(),
            "Built component class"
        );

        Ok(Arc::new(ComponentClass {
            name: self.name,
            namespace: self.namespace,
            full_name,
            config: config.clone(),
            dispatcher: Arc::clone(self.environment.dispatcher()),
            props,
            declared_view: self.view,
            declared_style: self.style,
            assets,
            callbacks,
            scope,
            render_cache: RenderCache::new(),
        }))
    }

    /// Build the class and register its helper names.
    pub fn define(self) -> Result<Arc<ComponentClass>, ComponentError> {
        let environment = Arc::clone(&self.environment);
        let class = self.build()?;
        environment.register(&class);
        Ok(class)
    }
}
