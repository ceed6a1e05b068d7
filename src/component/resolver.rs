//! View and style source resolution.
//!
//! Up to three sources compete for a component's view (and likewise its
//! style):
//!
//! | Source   | Where it comes from                          | Empty means        |
//! |----------|----------------------------------------------|--------------------|
//! | file     | `view.*` in the class's asset directory      | no candidate       |
//! | declared | `view(...)` on the class builder             | `EmptyView` error  |
//! | inline   | `view` passed to the instance                | no candidate for a literal string, `EmptyView` for typed content |
//!
//! Every candidate is read and checked before one is chosen, so a broken
//! losing source fails the render the same way a broken winner does. Only
//! the winner is rendered.

use tera::Context as TeraContext;

use super::class::ComponentClass;
use crate::config::Precedence;
use crate::core::ComponentError;
use crate::templating::content::{ContentOrigin, ContentSource, FormatTag, TypedContent};
use crate::templating::dispatcher::{ContentKind, TemplateDispatcher};
use crate::templating::engine::{RenderContext, TemplateScope};

use super::assets::file_format;

/// A source that won (or may win) resolution.
#[derive(Debug, Clone)]
pub enum ResolvedContent {
    /// Pre-rendered markup from an inline literal; emitted as is.
    Markup(String),
    /// Source text to dispatch on `format`.
    Template {
        format: FormatTag,
        source: String,
        origin: ContentOrigin,
    },
}

impl ResolvedContent {
    pub fn origin(&self) -> ContentOrigin {
        match self {
            ResolvedContent::Markup(_) => ContentOrigin::Inline,
            ResolvedContent::Template {
                origin,
                ..
            } => origin.clone(),
        }
    }

    pub fn format(&self) -> Option<&FormatTag> {
        match self {
            ResolvedContent::Markup(_) => None,
            ResolvedContent::Template {
                format,
                ..
            } => Some(format),
        }
    }

    pub(crate) fn render(
        &self,
        kind: ContentKind,
        dispatcher: &TemplateDispatcher,
        scope: &TemplateScope,
        variables: &TeraContext,
    ) -> Result<String, ComponentError> {
        match self {
            ResolvedContent::Markup(markup) => Ok(markup.clone()),
            ResolvedContent::Template {
                format,
                source,
                origin,
            } => {
                let ctx = RenderContext {
                    scope,
                    variables,
                    origin,
                };
                dispatcher.render(kind, Some(format), source, &ctx)
            }
        }
    }
}

/// The class-level winner between the asset file and the declaration.
pub(crate) fn class_candidate(
    kind: ContentKind,
    class: &ComponentClass,
) -> Result<Option<ResolvedContent>, ComponentError> {
    let file = file_candidate(kind, class)?;
    let declared = match class.declared(kind) {
        Some(content) => typed_candidate(kind, content, ContentOrigin::Declared, class)?,
        None => None,
    };

    Ok(match class.config().precedence {
        Precedence::InlineFirst => declared.or(file),
        Precedence::FileFirst => file.or(declared),
    })
}

/// The candidate supplied at call time.
pub(crate) fn inline_candidate(
    kind: ContentKind,
    source: Option<&ContentSource>,
    class: &ComponentClass,
) -> Result<Option<ResolvedContent>, ComponentError> {
    match source {
        None => Ok(None),
        Some(ContentSource::Literal(markup)) if markup.trim().is_empty() => Ok(None),
        Some(ContentSource::Literal(markup)) => Ok(Some(ResolvedContent::Markup(markup.clone()))),
        Some(ContentSource::Typed(content)) => {
            typed_candidate(kind, content, ContentOrigin::Inline, class)
        }
    }
}

/// Merge the class-level winner with the inline candidate.
pub(crate) fn select<T>(precedence: Precedence, class_level: Option<T>, inline: Option<T>) -> Option<T> {
    match precedence {
        Precedence::InlineFirst => inline.or(class_level),
        Precedence::FileFirst => class_level.or(inline),
    }
}

/// Full, uncached resolution.
pub(crate) fn resolve(
    kind: ContentKind,
    class: &ComponentClass,
    inline: Option<&ContentSource>,
) -> Result<Option<ResolvedContent>, ComponentError> {
    let class_level = class_candidate(kind, class)?;
    let inline = inline_candidate(kind, inline, class)?;
    Ok(select(class.config().precedence, class_level, inline))
}

fn file_candidate(
    kind: ContentKind,
    class: &ComponentClass,
) -> Result<Option<ResolvedContent>, ComponentError> {
    let Some(path) = class.assets().file(kind, class.full_name())? else {
        return Ok(None);
    };

    let source = std::fs::read_to_string(&path).map_err(|e| ComponentError::io(&path, e))?;
    if source.trim().is_empty() {
        tracing::debug!(path = %path.display(), "Ignoring empty asset file");
        return Ok(None);
    }

    let format = file_format(&path, kind);
    let origin = ContentOrigin::File(path);
    class.dispatcher().engine(kind, Some(&format), class.full_name(), &origin)?;

    Ok(Some(ResolvedContent::Template {
        format,
        source,
        origin,
    }))
}

fn typed_candidate(
    kind: ContentKind,
    content: &TypedContent,
    origin: ContentOrigin,
    class: &ComponentClass,
) -> Result<Option<ResolvedContent>, ComponentError> {
    let source = content.text();
    if source.trim().is_empty() {
        let component = class.full_name().to_string();
        return Err(match kind {
            ContentKind::View => ComponentError::EmptyView {
                component,
                origin,
            },
            ContentKind::Style => ComponentError::EmptyStyle {
                component,
                origin,
            },
        });
    }

    class.dispatcher().engine(kind, content.format(), class.full_name(), &origin)?;
    let format = content.format().cloned().unwrap_or(FormatTag::TERA);

    Ok(Some(ResolvedContent::Template {
        format,
        source,
        origin,
    }))
}
