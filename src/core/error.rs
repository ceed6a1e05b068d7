//! Error handling for tilekit
//!
//! This module provides the error taxonomy for component definition, prop
//! validation, content resolution and template dispatch, plus user-friendly
//! error reporting for the CLI.
//!
//! # Architecture
//!
//! - [`ComponentError`] - Enumerated error types for every failure case
//! - [`ErrorContext`] - Wrapper that adds user-facing suggestions and details
//!
//! Every error is a developer-input error. Nothing here is transient and
//! nothing is retried: a failure aborts the render that raised it and no
//! partial markup is returned.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tilekit::core::{ComponentError, user_friendly_error};
//!
//! let error = ComponentError::MissingProps {
//!     component: "PriceComponent".to_string(),
//!     prop: "amount".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::component::Phase;
use crate::templating::cache::ReentrantCompile;
use crate::templating::content::ContentOrigin;
use crate::templating::error::TemplateError;

/// The main error type for component rendering.
///
/// # Error Categories
///
/// ## Props
/// - [`MissingProps`] - A required prop was not supplied
/// - [`IncorrectPropType`] - A value failed its type check, or a declaration
///   named a type that does not exist
/// - [`UnknownProp`] - A typed setter was called for an undeclared prop
///
/// ## Content resolution
/// - [`ViewNotFound`] - No view source resolved to content
/// - [`MultipleViews`] / [`MultipleStyles`] - Ambiguous asset directory
/// - [`EmptyView`] / [`EmptyStyle`] - Declared or inline source is blank
/// - [`InvalidContent`] - A value could not be normalized to typed content
///
/// ## Dispatch
/// - [`UnknownViewType`] / [`UnknownStyleType`] - No engine for a format tag
/// - [`Template`] - The engine rejected the template
///
/// [`MissingProps`]: ComponentError::MissingProps
/// [`IncorrectPropType`]: ComponentError::IncorrectPropType
/// [`UnknownProp`]: ComponentError::UnknownProp
/// [`ViewNotFound`]: ComponentError::ViewNotFound
/// [`MultipleViews`]: ComponentError::MultipleViews
/// [`MultipleStyles`]: ComponentError::MultipleStyles
/// [`EmptyView`]: ComponentError::EmptyView
/// [`EmptyStyle`]: ComponentError::EmptyStyle
/// [`InvalidContent`]: ComponentError::InvalidContent
/// [`UnknownViewType`]: ComponentError::UnknownViewType
/// [`UnknownStyleType`]: ComponentError::UnknownStyleType
/// [`Template`]: ComponentError::Template
#[derive(Error, Debug)]
pub enum ComponentError {
    /// A required prop was absent at bind time.
    #[error("`{component}` has a missing required prop: `{prop}`")]
    MissingProps {
        /// Component class name
        component: String,
        /// Name of the missing prop
        prop: String,
    },

    /// A bound value failed the declared type/allow-nil check, or a prop
    /// declaration used something that is not a type.
    #[error("`{component}` prop `{prop}`: {reason}")]
    IncorrectPropType {
        component: String,
        prop: String,
        reason: String,
    },

    /// A typed setter was called for a prop the class does not declare.
    #[error("`{component}` does not declare a prop named `{prop}`")]
    UnknownProp {
        component: String,
        prop: String,
    },

    #[error("View for `{component}` could not be found")]
    ViewNotFound {
        component: String,
    },

    #[error("More than one view file for `{component}` found: {}", .files.join(", "))]
    MultipleViews {
        component: String,
        files: Vec<String>,
    },

    #[error("More than one style file for `{component}` found: {}", .files.join(", "))]
    MultipleStyles {
        component: String,
        files: Vec<String>,
    },

    /// No view engine is registered for the format tag.
    #[error(
        "Unknown view type `{format}` for `{component}` (from {origin}). Use a valid type in the view declaration or a known view file extension; known types: {}",
        .known.join(", ")
    )]
    UnknownViewType {
        component: String,
        format: String,
        origin: ContentOrigin,
        known: Vec<String>,
    },

    /// No style engine is registered for the format tag.
    #[error(
        "Unknown style type `{format}` for `{component}` (from {origin}). Use a valid type in the style declaration or a known style file extension; known types: {}",
        .known.join(", ")
    )]
    UnknownStyleType {
        component: String,
        format: String,
        origin: ContentOrigin,
        known: Vec<String>,
    },

    #[error("Custom view for `{component}` from {origin} cannot be empty")]
    EmptyView {
        component: String,
        origin: ContentOrigin,
    },

    #[error("Custom style for `{component}` from {origin} cannot be empty")]
    EmptyStyle {
        component: String,
        origin: ContentOrigin,
    },

    #[error("`TypedContent` should be a record with `type` and `content` keys but was {found}")]
    InvalidContent {
        found: String,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A lifecycle hook returned an error.
    #[error("{phase} callback failed for `{component}`: {source}")]
    Callback {
        component: String,
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },

    /// A hook names a method the class never defined.
    #[error("`{component}` registers `{method}` as a {phase} callback but defines no such method")]
    UndefinedCallback {
        component: String,
        method: String,
        phase: Phase,
    },

    #[error("Unknown component `{name}`{}", format_suggestions(.suggestions))]
    UnknownComponent {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("`{name}` is not a valid component name; use a CamelCase identifier such as `DropdownMenu`")]
    InvalidComponentName {
        name: String,
    },

    #[error("Component nesting exceeded {max} levels while rendering `{component}`")]
    NestingTooDeep {
        component: String,
        max: usize,
    },

    #[error("Invalid component manifest {}: {message}", .path.display())]
    Manifest {
        path: PathBuf,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    #[error("{message}")]
    Other {
        message: String,
    },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(", "))
    }
}

impl From<ReentrantCompile> for ComponentError {
    fn from(error: ReentrantCompile) -> Self {
        ComponentError::Other {
            message: error.to_string(),
        }
    }
}

impl ComponentError {
    /// Wrap an I/O error with the path it concerned.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ComponentError::Io {
            path: path.into(),
            source,
        }
    }

    /// The error that started a chain of nested component failures.
    ///
    /// A component rendered from a template reports its failure wrapped in
    /// [`TemplateError::NestedRenderFailed`], once per nesting level.
    pub fn innermost(&self) -> &ComponentError {
        let mut current = self;
        while let ComponentError::Template(TemplateError::NestedRenderFailed {
            source,
            ..
        }) = current
        {
            current = source.as_ref();
        }
        current
    }

    /// Recover a `ComponentError` that travelled through a hook as
    /// `anyhow::Error`, or wrap a foreign error as a callback failure.
    pub(crate) fn from_callback(component: &str, phase: Phase, error: anyhow::Error) -> Self {
        match error.downcast::<ComponentError>() {
            Ok(inner) => inner,
            Err(source) => ComponentError::Callback {
                component: component.to_string(),
                phase,
                source,
            },
        }
    }
}

/// Error wrapper carrying a suggestion and details for terminal display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ComponentError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: ComponentError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow,
    /// suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion matching
/// its kind.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<ErrorContext>() {
        Ok(ctx) => return ctx,
        Err(error) => error,
    };

    let error = match error.downcast::<ComponentError>() {
        Ok(component_error) => return contextualize(component_error),
        Err(error) => error,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let details = io_error.to_string();
        return ErrorContext::new(ComponentError::Other {
            message: format!("{error:#}"),
        })
        .with_details(details)
        .with_suggestion("Check that the path exists and is readable");
    }

    ErrorContext::new(ComponentError::Other {
        message: format!("{error:#}"),
    })
}

fn contextualize(error: ComponentError) -> ErrorContext {
    let (suggestion, details): (Option<String>, Option<String>) = match &error {
        ComponentError::MissingProps {
            prop,
            ..
        } => (Some(format!("Pass `{prop}` when rendering the component")), None),
        ComponentError::IncorrectPropType {
            ..
        } => (
            Some("Pass a value matching the declared prop type".to_string()),
            Some(
                "Known prop types: string, numeric, integer, float, boolean, array, object"
                    .to_string(),
            ),
        ),
        ComponentError::MultipleViews {
            ..
        }
        | ComponentError::MultipleStyles {
            ..
        } => (
            Some("Keep exactly one view.* and at most one style.* file per component".to_string()),
            None,
        ),
        ComponentError::ViewNotFound {
            ..
        } => (
            Some(
                "Add a view.* file to the asset directory, declare a view, or pass `view` inline"
                    .to_string(),
            ),
            None,
        ),
        ComponentError::UnknownViewType {
            ..
        }
        | ComponentError::UnknownStyleType {
            ..
        } => (Some("Register an engine for the format or use a known type".to_string()), None),
        ComponentError::Template(template_error) => {
            (None, Some(template_error.format_with_context()))
        }
        ComponentError::UnknownComponent {
            ..
        } => (Some("Run `tilekit list` to see registered components".to_string()), None),
        _ => (None, None),
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    if let Some(details) = details {
        ctx = ctx.with_details(details);
    }
    ctx
}
