//! Typed content: the (format, content) pair every view and style flows through.
//!
//! A [`TypedContent`] couples a [`FormatTag`] with either literal text or a
//! deferred producer. Producers are re-invoked on every [`TypedContent::text`]
//! call; nothing is cached at this layer.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::core::ComponentError;

/// Identifier selecting the engine that renders a piece of content.
///
/// Tags are lower-cased and a leading `:` is stripped, so `":MD"` and `"md"`
/// name the same format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatTag(Cow<'static, str>);

impl FormatTag {
    /// Tera, the scripting-capable format used for interpolation pre-passes.
    pub const TERA: FormatTag = FormatTag(Cow::Borrowed("tera"));
    /// Plain HTML markup.
    pub const HTML: FormatTag = FormatTag(Cow::Borrowed("html"));
    /// CommonMark, short form.
    pub const MD: FormatTag = FormatTag(Cow::Borrowed("md"));
    /// CommonMark, long form.
    pub const MARKDOWN: FormatTag = FormatTag(Cow::Borrowed("markdown"));
    /// Plain CSS.
    pub const CSS: FormatTag = FormatTag(Cow::Borrowed("css"));
    pub const SCSS: FormatTag = FormatTag(Cow::Borrowed("scss"));
    pub const SASS: FormatTag = FormatTag(Cow::Borrowed("sass"));
    pub const LESS: FormatTag = FormatTag(Cow::Borrowed("less"));

    /// Normalize a raw tag.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw.as_ref().trim().trim_start_matches(':').to_ascii_lowercase();
        Self(Cow::Owned(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FormatTag {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for FormatTag {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Where a view or style source was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOrigin {
    /// A `view.*` / `style.*` file in the component's asset directory.
    File(PathBuf),
    /// Registered on the class through `view(...)` / `style(...)`.
    Declared,
    /// Passed to the instance at call time.
    Inline,
}

impl ContentOrigin {
    /// A file whose name has no `.tera` segment, such as `style.css`.
    /// `style.css.tera` asks for interpolation and does not count.
    pub fn is_untemplated_file(&self) -> bool {
        match self {
            ContentOrigin::File(path) => {
                path.file_name().and_then(|name| name.to_str()).is_none_or(|name| {
                    !name.split('.').skip(1).any(|part| part.eq_ignore_ascii_case("tera"))
                })
            }
            ContentOrigin::Declared | ContentOrigin::Inline => false,
        }
    }
}

impl fmt::Display for ContentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentOrigin::File(path) => write!(f, "file {}", path.display()),
            ContentOrigin::Declared => f.write_str("class declaration"),
            ContentOrigin::Inline => f.write_str("inline argument"),
        }
    }
}

/// Zero-argument producer used for deferred content.
pub type ContentProducer = Arc<dyn Fn() -> String + Send + Sync>;

/// Literal text or a deferred producer.
#[derive(Clone)]
pub enum Content {
    Literal(String),
    Deferred(ContentProducer),
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Content::Deferred(_) => f.write_str("Deferred(<producer>)"),
        }
    }
}

/// Immutable (format, content) pair.
#[derive(Debug, Clone)]
pub struct TypedContent {
    format: Option<FormatTag>,
    content: Content,
}

impl TypedContent {
    /// Literal content in the given format.
    pub fn literal(format: impl Into<FormatTag>, text: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            content: Content::Literal(text.into()),
        }
    }

    /// Deferred content; `producer` runs each time the text is requested.
    pub fn deferred<F>(format: impl Into<FormatTag>, producer: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            format: Some(format.into()),
            content: Content::Deferred(Arc::new(producer)),
        }
    }

    /// Normalize a structural `{ "type": ..., "content": ... }` record.
    ///
    /// A missing `type` yields content without a format, which is rejected
    /// later as an unknown type. Anything that is not an object, or whose
    /// `content` is an array or object, fails with
    /// [`ComponentError::InvalidContent`].
    pub fn wrap(value: &Value) -> Result<Self, ComponentError> {
        let Value::Object(record) = value else {
            return Err(ComponentError::InvalidContent {
                found: describe_value(value),
            });
        };

        let format = match record.get("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(tag)) => Some(FormatTag::new(tag)),
            Some(other) => {
                return Err(ComponentError::InvalidContent {
                    found: format!("a record whose `type` is {}", describe_value(other)),
                });
            }
        };

        let text = match record.get("content") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(scalar @ (Value::Number(_) | Value::Bool(_))) => scalar.to_string(),
            Some(other) => {
                return Err(ComponentError::InvalidContent {
                    found: format!("a record whose `content` is {}", describe_value(other)),
                });
            }
        };

        Ok(Self {
            format,
            content: Content::Literal(text),
        })
    }

    pub fn format(&self) -> Option<&FormatTag> {
        self.format.as_ref()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// The content as text, invoking the producer when deferred.
    pub fn text(&self) -> String {
        match &self.content {
            Content::Literal(text) => text.clone(),
            Content::Deferred(producer) => producer(),
        }
    }
}

impl fmt::Display for TypedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl TryFrom<&Value> for TypedContent {
    type Error = ComponentError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::wrap(value)
    }
}

/// An ad-hoc view or style handed to an instance at call time.
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// Pre-rendered markup, emitted without dispatch.
    Literal(String),
    Typed(TypedContent),
}

impl ContentSource {
    /// Normalize an inline argument: strings are literal markup, objects are
    /// wrapped into [`TypedContent`].
    pub fn from_value(value: &Value) -> Result<Self, ComponentError> {
        match value {
            Value::String(markup) => Ok(ContentSource::Literal(markup.clone())),
            other => TypedContent::wrap(other).map(ContentSource::Typed),
        }
    }
}

impl From<TypedContent> for ContentSource {
    fn from(content: TypedContent) -> Self {
        ContentSource::Typed(content)
    }
}

impl From<&str> for ContentSource {
    fn from(markup: &str) -> Self {
        ContentSource::Literal(markup.to_string())
    }
}

impl From<String> for ContentSource {
    fn from(markup: String) -> Self {
        ContentSource::Literal(markup)
    }
}

/// Short description of a JSON value for error messages.
pub(crate) fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("a boolean ({b})"),
        Value::Number(n) => format!("a number ({n})"),
        Value::String(s) => format!("a string ({s:?})"),
        Value::Array(items) => format!("an array of {} item(s)", items.len()),
        Value::Object(_) => "an object".to_string(),
    }
}
