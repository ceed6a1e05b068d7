//! Format engines and the context they render against.
//!
//! An engine turns source text in one format into markup. Engines that embed
//! expressions natively (Tera) receive the source untouched; every other
//! engine receives the output of a Tera pre-pass, except for terminal
//! literal formats read from a file, which are emitted verbatim.

use std::sync::{Arc, Weak};

use pulldown_cmark::{Options, Parser, html};
use tera::Context as TeraContext;

use super::content::ContentOrigin;
use crate::core::ComponentError;
use crate::helpers::HelperRegistry;

/// Class-level data visible to template functions.
///
/// Built once per component class and shared by every render of it.
#[derive(Clone)]
pub struct TemplateScope {
    /// Fully qualified component name, e.g. `Navigation::DropdownMenu`.
    pub component_name: String,
    /// Prefix used by `css_id`, e.g. `navigation-dropdown_menu`.
    pub css_prefix: String,
    /// Registry used by the `component` template function. Held weakly:
    /// the registry owns the classes that own this scope.
    pub helpers: Weak<HelperRegistry>,
    /// Maximum nesting depth for components rendered from templates.
    pub max_depth: usize,
}

impl std::fmt::Debug for TemplateScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateScope")
            .field("component_name", &self.component_name)
            .field("css_prefix", &self.css_prefix)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// Everything an engine sees while rendering one piece of content.
pub struct RenderContext<'a> {
    pub scope: &'a TemplateScope,
    /// Instance variables: ad-hoc state, bound props and nested content.
    pub variables: &'a TeraContext,
    pub origin: &'a ContentOrigin,
}

/// A pre-parsed render routine produced by [`TemplateEngine::compile`].
pub trait CompiledTemplate: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, ComponentError>;
}

/// A rendering engine registered under one or more format tags.
pub trait TemplateEngine: Send + Sync {
    /// Whether the format evaluates embedded expressions itself.
    fn embeds_expressions(&self) -> bool;

    /// Whether the format has no templating semantics at all. File sources
    /// in such formats skip the scripting pre-pass.
    fn is_terminal_literal(&self) -> bool {
        false
    }

    fn render(&self, source: &str, ctx: &RenderContext<'_>) -> Result<String, ComponentError>;

    /// Compile `source` ahead of time. `None` means the engine is
    /// interpreted only.
    fn compile(
        &self,
        _name: &str,
        _source: &str,
        _scope: &TemplateScope,
        _origin: &ContentOrigin,
    ) -> Option<Result<Arc<dyn CompiledTemplate>, ComponentError>> {
        None
    }
}

/// Emits its input unchanged. Used for `html` views.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughEngine;

impl TemplateEngine for PassthroughEngine {
    fn embeds_expressions(&self) -> bool {
        false
    }

    fn render(&self, source: &str, _ctx: &RenderContext<'_>) -> Result<String, ComponentError> {
        Ok(source.to_string())
    }
}

/// CommonMark to HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownEngine;

impl MarkdownEngine {
    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options
    }
}

impl TemplateEngine for MarkdownEngine {
    fn embeds_expressions(&self) -> bool {
        false
    }

    fn render(&self, source: &str, _ctx: &RenderContext<'_>) -> Result<String, ComponentError> {
        let parser = Parser::new_ext(source, Self::options());
        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, parser);
        Ok(output)
    }
}

/// Plain CSS, the terminal literal style format.
#[derive(Debug, Default, Clone, Copy)]
pub struct CssEngine;

impl TemplateEngine for CssEngine {
    fn embeds_expressions(&self) -> bool {
        false
    }

    fn is_terminal_literal(&self) -> bool {
        true
    }

    fn render(&self, source: &str, _ctx: &RenderContext<'_>) -> Result<String, ComponentError> {
        Ok(source.to_string())
    }
}

/// Compiled form of a non-scripting format: a compiled Tera pre-pass
/// followed by the format's own engine on every render.
pub struct PrepassTemplate {
    prepass: Arc<dyn CompiledTemplate>,
    engine: Arc<dyn TemplateEngine>,
}

impl PrepassTemplate {
    pub fn new(prepass: Arc<dyn CompiledTemplate>, engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            prepass,
            engine,
        }
    }
}

impl CompiledTemplate for PrepassTemplate {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, ComponentError> {
        let interpolated = self.prepass.render(ctx)?;
        self.engine.render(&interpolated, ctx)
    }
}

/// A source emitted as-is on every render.
pub struct LiteralTemplate(pub String);

impl CompiledTemplate for LiteralTemplate {
    fn render(&self, _ctx: &RenderContext<'_>) -> Result<String, ComponentError> {
        Ok(self.0.clone())
    }
}
