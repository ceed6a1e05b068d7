//! Structured template errors
//!
//! Tera failures are parsed into [`TemplateError`] values that remember which
//! component, format and content source produced them, the failing line and
//! a window of surrounding template lines.

use std::fmt::Write;
use std::sync::Arc;

use super::content::{ContentOrigin, FormatTag};
use crate::core::ComponentError;

/// Template errors with detailed context
#[derive(Debug)]
pub enum TemplateError {
    VariableNotFound {
        variable: String,
        available_variables: Box<Vec<String>>,
        suggestions: Box<Vec<String>>,
        location: Box<ErrorLocation>,
    },

    SyntaxError {
        message: String,
        location: Box<ErrorLocation>,
    },

    /// A component rendered from inside a template failed.
    NestedRenderFailed {
        child: String,
        source: Arc<ComponentError>,
        location: Box<ErrorLocation>,
    },

    /// A format engine other than Tera rejected its input.
    EngineFailed {
        message: String,
        location: Box<ErrorLocation>,
    },
}

/// Location information for template errors
#[derive(Debug, Clone)]
pub struct ErrorLocation {
    /// Component whose template failed
    pub component: String,
    /// Format of the failing content
    pub format: FormatTag,
    /// Where the template source came from
    pub origin: ContentOrigin,
    /// Line number if available from Tera
    pub line_number: Option<usize>,
    /// Numbered template lines around the failure
    pub context_lines: Option<Vec<(usize, String)>>,
}

impl ErrorLocation {
    pub fn new(component: impl Into<String>, format: FormatTag, origin: ContentOrigin) -> Self {
        Self {
            component: component.into(),
            format,
            origin,
            line_number: None,
            context_lines: None,
        }
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::VariableNotFound {
                variable,
                location,
                ..
            } => {
                write!(
                    f,
                    "Template variable not found: '{}' in `{}`",
                    variable, location.component
                )
            }
            TemplateError::SyntaxError {
                message,
                location,
            } => {
                write!(f, "Template error in `{}`: {}", location.component, message)
            }
            TemplateError::NestedRenderFailed {
                child,
                source,
                location,
            } => {
                write!(
                    f,
                    "Failed to render nested component '{}' inside `{}`: {}",
                    child, location.component, source
                )
            }
            TemplateError::EngineFailed {
                message,
                location,
            } => {
                write!(
                    f,
                    "The `{}` engine failed for `{}`: {}",
                    location.format, location.component, message
                )
            }
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::NestedRenderFailed {
                source,
                ..
            } => Some(source.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl TemplateError {
    pub fn location(&self) -> &ErrorLocation {
        match self {
            TemplateError::VariableNotFound {
                location,
                ..
            }
            | TemplateError::SyntaxError {
                location,
                ..
            }
            | TemplateError::NestedRenderFailed {
                location,
                ..
            }
            | TemplateError::EngineFailed {
                location,
                ..
            } => location,
        }
    }

    /// Multi-line report for the terminal: what failed, where, the
    /// template lines around the failure and a hint.
    pub fn format_with_context(&self) -> String {
        let mut report = String::new();
        match self {
            TemplateError::VariableNotFound {
                variable,
                available_variables,
                suggestions,
                location,
            } => {
                let _ = writeln!(report, "Undefined variable `{variable}`");
                describe_location(&mut report, location);
                if suggestions.is_empty() {
                    let _ = writeln!(
                        report,
                        "\nhint: declare `{variable}` as a prop of `{}` or set it in a before-render hook",
                        location.component
                    );
                } else {
                    let _ = writeln!(report, "\nhint: did you mean {}?", quoted(suggestions));
                }
                if !available_variables.is_empty() {
                    let shown: Vec<String> =
                        available_variables.iter().take(MAX_LISTED_VARIABLES).cloned().collect();
                    let _ = write!(report, "defined: {}", quoted(&shown));
                    let hidden = available_variables.len().saturating_sub(MAX_LISTED_VARIABLES);
                    if hidden > 0 {
                        let _ = write!(report, " and {hidden} more");
                    }
                    report.push('\n');
                }
            }
            TemplateError::SyntaxError {
                message,
                location,
            } => {
                let _ = writeln!(report, "Invalid template: {message}");
                describe_location(&mut report, location);
                let _ = writeln!(
                    report,
                    "\nhint: look for an unclosed `{{{{ }}}}` or `{{% %}}` tag, an unknown filter or an unquoted string"
                );
            }
            TemplateError::NestedRenderFailed {
                child,
                source,
                location,
            } => {
                let _ = writeln!(report, "Nested component `{child}` failed: {source}");
                describe_location(&mut report, location);
                if !matches!(source.innermost(), ComponentError::Template(_)) {
                    let _ = writeln!(report, "\ncause: {}", source.innermost());
                }
            }
            TemplateError::EngineFailed {
                message,
                location,
            } => {
                let _ = writeln!(report, "The `{}` engine failed: {message}", location.format);
                describe_location(&mut report, location);
            }
        }
        report
    }
}

const MAX_LISTED_VARIABLES: usize = 10;

fn quoted(names: &[String]) -> String {
    names.iter().map(|name| format!("`{name}`")).collect::<Vec<_>>().join(", ")
}

/// `  --> Card (tera from class declaration), line 2` followed by the
/// numbered excerpt, the failing line marked with `>`.
fn describe_location(report: &mut String, location: &ErrorLocation) {
    let _ = write!(
        report,
        "  --> {} ({} from {})",
        location.component, location.format, location.origin
    );
    match location.line_number {
        Some(line) => {
            let _ = writeln!(report, ", line {line}");
        }
        None => report.push('\n'),
    }

    for (number, text) in location.context_lines.iter().flatten() {
        let marker = if Some(*number) == location.line_number { '>' } else { ' ' };
        let _ = writeln!(report, "{marker} {number:>4} | {text}");
    }
}
