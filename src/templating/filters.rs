//! Template functions and filters available in every Tera template.
//!
//! - `css_id(name="list_item")` (also usable as a filter) scopes a CSS class
//!   or id to the rendering component.
//! - `component(name="Card", title="Hi", children="...")` renders another
//!   registered component in place. Every argument other than `name` and
//!   `children` is passed to the component as a render argument.
//!
//! Components rendered through `component` may themselves render
//! components. The nesting depth is tracked per thread and bounded by
//! [`TemplateScope::max_depth`].

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tera::Tera;

use super::engine::TemplateScope;
use crate::component::RenderArgs;
use crate::core::ComponentError;
use crate::helpers::naming;

thread_local! {
    static RENDER_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Marks one level of nested component rendering on the current thread.
pub(crate) struct DepthGuard(());

impl DepthGuard {
    pub(crate) fn enter(component: &str, max: usize) -> Result<Self, ComponentError> {
        RENDER_DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > max {
                return Err(ComponentError::NestingTooDeep {
                    component: component.to_string(),
                    max,
                });
            }
            depth.set(next);
            Ok(DepthGuard(()))
        })
    }

    #[cfg(test)]
    pub(crate) fn current() -> usize {
        RENDER_DEPTH.with(Cell::get)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        RENDER_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// A nested component failure carried through Tera's error chain.
#[derive(Debug)]
pub(crate) struct NestedFailure {
    pub(crate) child: String,
    pub(crate) error: Arc<ComponentError>,
}

impl fmt::Display for NestedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component `{}` failed: {}", self.child, self.error)
    }
}

impl std::error::Error for NestedFailure {}

/// Register the component functions on a Tera instance.
pub(crate) fn register(tera: &mut Tera, scope: &TemplateScope) {
    let prefix = scope.css_prefix.clone();
    tera.register_function("css_id", move |args: &HashMap<String, Value>| {
        let name = args.get("name").and_then(Value::as_str).ok_or_else(|| {
            tera::Error::msg("`css_id` requires a string `name` argument, e.g. css_id(name='item')")
        })?;
        Ok(Value::String(naming::scoped_css_identifier(&prefix, name)))
    });

    let prefix = scope.css_prefix.clone();
    tera.register_filter("css_id", move |value: &Value, _: &HashMap<String, Value>| {
        let name = value
            .as_str()
            .ok_or_else(|| tera::Error::msg("the `css_id` filter only applies to strings"))?;
        Ok(Value::String(naming::scoped_css_identifier(&prefix, name)))
    });

    let helpers = scope.helpers.clone();
    let max_depth = scope.max_depth;
    tera.register_function("component", move |args: &HashMap<String, Value>| {
        let name = match args.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => {
                return Err(tera::Error::msg(
                    "`component` requires a string `name` argument, e.g. component(name='Card')",
                ));
            }
        };

        let mut values = Map::new();
        let mut children = None;
        for (key, value) in args {
            match key.as_str() {
                "name" => {}
                "children" => {
                    children = Some(match value {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    });
                }
                _ => {
                    values.insert(key.clone(), value.clone());
                }
            }
        }

        let rendered = (|| {
            let _guard = DepthGuard::enter(&name, max_depth)?;
            let class = match helpers.upgrade() {
                Some(helpers) => helpers.lookup(&name)?,
                None => {
                    return Err(ComponentError::UnknownComponent {
                        name: name.clone(),
                        suggestions: Vec::new(),
                    });
                }
            };
            let args = RenderArgs::from_map(values);
            match children {
                Some(children) => class.render_with(args, move || Ok(children)),
                None => class.render(args),
            }
        })();

        rendered.map(Value::String).map_err(|error| {
            tera::Error::chain(
                format!("Function call 'component' failed for `{name}`"),
                NestedFailure {
                    child: name.clone(),
                    error: Arc::new(error),
                },
            )
        })
    });
}
