//! Format tag to engine dispatch.
//!
//! The dispatcher is the single extension point for template languages:
//! registering an engine under a new tag makes that tag usable in view or
//! style declarations, view/style file extensions and inline content.

use std::collections::HashMap;
use std::sync::Arc;

use super::content::{ContentOrigin, FormatTag};
use super::engine::{
    CompiledTemplate, CssEngine, LiteralTemplate, MarkdownEngine, PassthroughEngine,
    PrepassTemplate, RenderContext, TemplateEngine, TemplateScope,
};
use super::renderer::TeraEngine;
use crate::core::ComponentError;

/// Whether content is a view or a style. Each has its own engine table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    View,
    Style,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::View => f.write_str("view"),
            ContentKind::Style => f.write_str("style"),
        }
    }
}

/// Maps format tags to engines.
#[derive(Clone)]
pub struct TemplateDispatcher {
    view_engines: HashMap<FormatTag, Arc<dyn TemplateEngine>>,
    style_engines: HashMap<FormatTag, Arc<dyn TemplateEngine>>,
    scripting: Arc<dyn TemplateEngine>,
}

impl Default for TemplateDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateDispatcher {
    /// A dispatcher with the built-in engines: `tera`, `html`, `md` and
    /// `markdown` views, and `css` styles.
    pub fn new() -> Self {
        let tera: Arc<dyn TemplateEngine> = Arc::new(TeraEngine);
        let markdown: Arc<dyn TemplateEngine> = Arc::new(MarkdownEngine);

        let mut view_engines: HashMap<FormatTag, Arc<dyn TemplateEngine>> = HashMap::new();
        view_engines.insert(FormatTag::TERA, Arc::clone(&tera));
        view_engines.insert(FormatTag::HTML, Arc::new(PassthroughEngine));
        view_engines.insert(FormatTag::MD, Arc::clone(&markdown));
        view_engines.insert(FormatTag::MARKDOWN, markdown);

        let mut style_engines: HashMap<FormatTag, Arc<dyn TemplateEngine>> = HashMap::new();
        style_engines.insert(FormatTag::CSS, Arc::new(CssEngine));

        Self {
            view_engines,
            style_engines,
            scripting: tera,
        }
    }

    /// Register (or replace) the engine for a view format.
    pub fn register_view_engine(
        &mut self,
        format: impl Into<FormatTag>,
        engine: Arc<dyn TemplateEngine>,
    ) -> &mut Self {
        let format = format.into();
        tracing::debug!(%format, "Registering view engine");
        self.view_engines.insert(format, engine);
        self
    }

    /// Register (or replace) the engine for a style format, e.g. `scss`.
    pub fn register_style_engine(
        &mut self,
        format: impl Into<FormatTag>,
        engine: Arc<dyn TemplateEngine>,
    ) -> &mut Self {
        let format = format.into();
        tracing::debug!(%format, "Registering style engine");
        self.style_engines.insert(format, engine);
        self
    }

    /// Known tags for `kind`, sorted.
    pub fn known_formats(&self, kind: ContentKind) -> Vec<String> {
        let mut formats: Vec<String> =
            self.table(kind).keys().map(|tag| tag.as_str().to_string()).collect();
        formats.sort();
        formats
    }

    fn table(&self, kind: ContentKind) -> &HashMap<FormatTag, Arc<dyn TemplateEngine>> {
        match kind {
            ContentKind::View => &self.view_engines,
            ContentKind::Style => &self.style_engines,
        }
    }

    /// Look up the engine for `format`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnknownViewType`] or
    /// [`ComponentError::UnknownStyleType`] when no engine is registered for
    /// the tag, or the content carries no tag at all.
    pub fn engine(
        &self,
        kind: ContentKind,
        format: Option<&FormatTag>,
        component: &str,
        origin: &ContentOrigin,
    ) -> Result<Arc<dyn TemplateEngine>, ComponentError> {
        if let Some(engine) = format.and_then(|tag| self.table(kind).get(tag)) {
            return Ok(Arc::clone(engine));
        }

        let format = format.map_or_else(|| "<none>".to_string(), |tag| tag.as_str().to_string());
        let known = self.known_formats(kind);
        Err(match kind {
            ContentKind::View => ComponentError::UnknownViewType {
                component: component.to_string(),
                format,
                origin: origin.clone(),
                known,
            },
            ContentKind::Style => ComponentError::UnknownStyleType {
                component: component.to_string(),
                format,
                origin: origin.clone(),
                known,
            },
        })
    }

    /// Render `source` in `format` against `ctx`.
    ///
    /// Scripting formats are rendered directly. Terminal literal formats
    /// read from a file without a `.tera` segment are returned verbatim.
    /// Every other format is first interpolated by Tera and then rendered by
    /// its own engine.
    pub fn render(
        &self,
        kind: ContentKind,
        format: Option<&FormatTag>,
        source: &str,
        ctx: &RenderContext<'_>,
    ) -> Result<String, ComponentError> {
        let engine = self.engine(kind, format, &ctx.scope.component_name, ctx.origin)?;

        if engine.embeds_expressions() {
            return engine.render(source, ctx);
        }

        if engine.is_terminal_literal() && ctx.origin.is_untemplated_file() {
            return Ok(source.to_string());
        }

        let interpolated = self.scripting.render(source, ctx)?;
        engine.render(&interpolated, ctx)
    }

    /// Compile `source` into a reusable routine equivalent to
    /// [`TemplateDispatcher::render`]. `Ok(None)` when the engines involved
    /// can only interpret.
    pub fn compile(
        &self,
        kind: ContentKind,
        format: Option<&FormatTag>,
        name: &str,
        source: &str,
        scope: &TemplateScope,
        origin: &ContentOrigin,
    ) -> Result<Option<Arc<dyn CompiledTemplate>>, ComponentError> {
        let engine = self.engine(kind, format, &scope.component_name, origin)?;

        if engine.embeds_expressions() {
            return engine.compile(name, source, scope, origin).transpose();
        }

        if engine.is_terminal_literal() && origin.is_untemplated_file() {
            return Ok(Some(Arc::new(LiteralTemplate(source.to_string()))));
        }

        match self.scripting.compile(name, source, scope, origin) {
            Some(prepass) => Ok(Some(Arc::new(PrepassTemplate::new(prepass?, engine)))),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for TemplateDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateDispatcher")
            .field("view_formats", &self.known_formats(ContentKind::View))
            .field("style_formats", &self.known_formats(ContentKind::Style))
            .finish()
    }
}
