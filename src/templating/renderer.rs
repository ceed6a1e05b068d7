//! Tera, the scripting-capable engine.
//!
//! Tera handles the `tera` format directly and performs the interpolation
//! pre-pass for every non-scripting format. Interpreted renders build a
//! fresh [`Tera`] instance per call; compiled renders parse the template once
//! and keep the instance for the lifetime of the component class.
//!
//! Tera failures are converted into structured [`TemplateError`] values with
//! the failing line, surrounding template lines and, for unknown variables,
//! the closest variable names in scope.

use regex::Regex;
use std::sync::Arc;
use strsim::levenshtein;
use tera::{Context as TeraContext, Tera};

use super::content::{ContentOrigin, FormatTag};
use super::engine::{CompiledTemplate, RenderContext, TemplateEngine, TemplateScope};
use super::error::{ErrorLocation, TemplateError};
use super::filters::{self, NestedFailure};
use crate::core::ComponentError;

/// Maximum Levenshtein distance, as a percentage of the variable name length,
/// for a name in scope to be suggested.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Lines shown before and after the failing line.
const CONTEXT_LINES: usize = 3;

/// The Tera engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeraEngine;

impl TeraEngine {
    /// A Tera instance with the component template functions registered.
    fn instance(scope: &TemplateScope) -> Tera {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        filters::register(&mut tera, scope);
        tera
    }

    /// Parse a Tera error into a structured error.
    fn parse_tera_error(
        error: &tera::Error,
        template_content: &str,
        context: Option<&TeraContext>,
        scope: &TemplateScope,
        origin: &ContentOrigin,
    ) -> ComponentError {
        let line_number = Self::extract_line_from_tera_error(error);
        let context_lines = line_number
            .map(|line| Self::extract_context_lines(template_content, line, CONTEXT_LINES))
            .filter(|lines| !lines.is_empty());

        let mut location = ErrorLocation::new(&scope.component_name, FormatTag::TERA, origin.clone());
        location.line_number = line_number;
        location.context_lines = context_lines;

        if let Some(nested) = Self::find_nested_failure(error) {
            return TemplateError::NestedRenderFailed {
                child: nested.child.clone(),
                source: Arc::clone(&nested.error),
                location: Box::new(location),
            }
            .into();
        }

        let full_message = Self::format_tera_error(error);
        if full_message.contains("Variable") && full_message.contains("not found") {
            if let Some(name) = Self::extract_variable_name(&full_message) {
                let available_variables =
                    context.map(Self::extract_available_variables).unwrap_or_default();
                let suggestions = Self::find_similar_variables(&name, &available_variables);
                return TemplateError::VariableNotFound {
                    variable: name,
                    available_variables: Box::new(available_variables),
                    suggestions: Box::new(suggestions),
                    location: Box::new(location),
                }
                .into();
            }
        }

        TemplateError::SyntaxError {
            message: full_message,
            location: Box::new(location),
        }
        .into()
    }

    fn find_nested_failure(error: &tera::Error) -> Option<&NestedFailure> {
        use std::error::Error;

        let mut current: Option<&(dyn Error + 'static)> = error.source();
        while let Some(err) = current {
            if let Some(nested) = err.downcast_ref::<NestedFailure>() {
                return Some(nested);
            }
            current = err.source();
        }
        None
    }

    /// Extract variable name from "Variable `foo` not found" message
    fn extract_variable_name(error_msg: &str) -> Option<String> {
        let re = Regex::new(r"Variable `([^`]+)` not found").ok()?;
        re.captures(error_msg).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
    }

    /// Top-level variable names in the render context, sorted.
    fn extract_available_variables(context: &TeraContext) -> Vec<String> {
        match context.clone().into_json() {
            serde_json::Value::Object(map) => {
                let mut vars: Vec<String> = map.keys().cloned().collect();
                vars.sort();
                vars
            }
            _ => Vec::new(),
        }
    }

    /// Find similar variable names using Levenshtein distance
    fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
        let mut scored: Vec<_> =
            available.iter().map(|var| (var.clone(), levenshtein(target, var))).collect();

        scored.sort_by_key(|(_, dist)| *dist);

        scored
            .into_iter()
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(var, _)| var)
            .collect()
    }

    /// Up to `context_size` lines before and after the 1-indexed
    /// `error_line`, with their line numbers.
    fn extract_context_lines(
        content: &str,
        error_line: usize,
        context_size: usize,
    ) -> Vec<(usize, String)> {
        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();

        if error_line == 0 || error_line > total_lines {
            return Vec::new();
        }

        let start = error_line.saturating_sub(context_size + 1);
        let end = (error_line + context_size).min(total_lines);

        lines[start..end]
            .iter()
            .enumerate()
            .map(|(idx, line)| (start + idx + 1, line.to_string()))
            .collect()
    }

    /// Tera parse errors carry `line:column` positions, e.g. `1:7`.
    fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
        let error_msg = format!("{:?}", error);

        let re = Regex::new(r"(\d+):(\d+)").ok()?;
        re.captures(&error_msg)
            .and_then(|caps| caps.get(1))
            .and_then(|line| line.as_str().parse::<usize>().ok())
    }

    /// Flatten a Tera error chain into one readable message, dropping
    /// Tera's internal template names.
    pub fn format_tera_error(error: &tera::Error) -> String {
        use std::error::Error;

        let mut all_messages = vec![error.to_string()];
        let mut current_error: Option<&dyn Error> = error.source();
        while let Some(err) = current_error {
            all_messages.push(err.to_string());
            current_error = err.source();
        }

        let messages: Vec<String> = all_messages
            .into_iter()
            .map(|msg| {
                let cleaned = msg
                    .replace("while rendering '__tera_one_off'", "")
                    .replace("Failed to render '__tera_one_off'", "Template rendering failed")
                    .replace("Failed to parse '__tera_one_off'", "Template syntax error")
                    .replace("'__tera_one_off'", "template");
                cleaned.trim().to_string()
            })
            .filter(|msg| {
                !msg.is_empty() && msg != "Template rendering failed" && msg != "Template syntax error"
            })
            .collect();

        if messages.is_empty() {
            "Template syntax error (see details above)".to_string()
        } else {
            messages.join("\n  → ")
        }
    }

    fn log_context_as_kv(context: &TeraContext) {
        if !tracing::enabled!(tracing::Level::TRACE) {
            return;
        }
        if let serde_json::Value::Object(map) = context.clone().into_json() {
            for (key, value) in map {
                tracing::trace!(%key, %value, "template variable");
            }
        }
    }
}

impl TemplateEngine for TeraEngine {
    fn embeds_expressions(&self) -> bool {
        true
    }

    fn render(&self, source: &str, ctx: &RenderContext<'_>) -> Result<String, ComponentError> {
        tracing::debug!(
            component = %ctx.scope.component_name,
            origin = %ctx.origin,
            "Rendering Tera template (interpreted)"
        );
        Self::log_context_as_kv(ctx.variables);

        let mut tera = Self::instance(ctx.scope);
        tera.render_str(source, ctx.variables).map_err(|e| {
            Self::parse_tera_error(&e, source, Some(ctx.variables), ctx.scope, ctx.origin)
        })
    }

    fn compile(
        &self,
        name: &str,
        source: &str,
        scope: &TemplateScope,
        origin: &ContentOrigin,
    ) -> Option<Result<Arc<dyn CompiledTemplate>, ComponentError>> {
        let mut tera = Self::instance(scope);
        let compiled = match tera.add_raw_template(name, source) {
            Ok(()) => Ok(Arc::new(CompiledTera {
                tera,
                name: name.to_string(),
                source: source.to_string(),
            }) as Arc<dyn CompiledTemplate>),
            Err(e) => Err(Self::parse_tera_error(&e, source, None, scope, origin)),
        };
        Some(compiled)
    }
}

/// A Tera template parsed once and rendered many times.
struct CompiledTera {
    tera: Tera,
    name: String,
    source: String,
}

impl CompiledTemplate for CompiledTera {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, ComponentError> {
        tracing::debug!(component = %ctx.scope.component_name, "Rendering compiled template");
        TeraEngine::log_context_as_kv(ctx.variables);

        self.tera.render(&self.name, ctx.variables).map_err(|e| {
            TeraEngine::parse_tera_error(&e, &self.source, Some(ctx.variables), ctx.scope, ctx.origin)
        })
    }
}
