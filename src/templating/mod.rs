//! Template dispatch for component views and styles.
//!
//! Every view and style flows through this module as a [`TypedContent`]: a
//! format tag plus literal or deferred text. The [`TemplateDispatcher`] maps
//! the tag to a [`TemplateEngine`] and renders the text against the
//! component instance's variables.
//!
//! # Formats
//!
//! | Tag                | Kind  | Rendering                                   |
//! |--------------------|-------|---------------------------------------------|
//! | `tera`             | view  | Tera, directly                              |
//! | `html`             | view  | Tera pre-pass, then emitted as-is           |
//! | `md`, `markdown`   | view  | Tera pre-pass, then CommonMark to HTML      |
//! | `css`              | style | verbatim from files, Tera pre-pass otherwise |
//!
//! `scss`, `sass` and `less` are recognised tags without a bundled engine;
//! register one with [`TemplateDispatcher::register_style_engine`].
//!
//! # Template functions
//!
//! - `{{ css_id(name="list_item") }}` or `{{ "list_item" | css_id }}` scopes a
//!   CSS identifier to the component, e.g. `navigation-dropdown_menu--list_item`
//! - `{{ component(name="Badge", label=title, children="<b>new</b>") }}`
//!   renders another registered component in place
//!
//! Templates also see `children` / `nested_content` when the component was
//! rendered with a nested block.
//!
//! # Compilation
//!
//! Engines may compile a template ahead of time. The component class keeps
//! the compiled routine in a [`RenderCache`], compiled once under a
//! per-class lock and read without locking afterwards.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tilekit::templating::{TemplateDispatcher, TemplateEngine, RenderContext};
//! use tilekit::core::ComponentError;
//!
//! struct Upper;
//!
//! impl TemplateEngine for Upper {
//!     fn embeds_expressions(&self) -> bool {
//!         false
//!     }
//!
//!     fn render(&self, source: &str, _ctx: &RenderContext<'_>) -> Result<String, ComponentError> {
//!         Ok(source.to_uppercase())
//!     }
//! }
//!
//! let mut dispatcher = TemplateDispatcher::new();
//! dispatcher.register_style_engine("scss", Arc::new(Upper));
//! ```

pub mod cache;
pub mod content;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub(crate) mod filters;
pub mod renderer;

pub use cache::{ReentrantCompile, RenderCache, RenderCacheStats};
pub use content::{Content, ContentOrigin, ContentSource, FormatTag, TypedContent};
pub use dispatcher::{ContentKind, TemplateDispatcher};
pub use engine::{
    CompiledTemplate, CssEngine, MarkdownEngine, PassthroughEngine, RenderContext, TemplateEngine,
    TemplateScope,
};
pub use error::{ErrorLocation, TemplateError};
pub use renderer::TeraEngine;
