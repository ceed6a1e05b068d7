//! Component instances and the arguments that create them.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tera::Context as TeraContext;

use super::callbacks::Phase;
use super::class::{ClassView, ComponentClass};
use super::resolver::{self, ResolvedContent};
use super::style::StyleInjector;
use crate::core::ComponentError;
use crate::templating::content::{ContentSource, describe_value};
use crate::templating::dispatcher::ContentKind;
use crate::templating::engine::RenderContext;

/// Values and inline sources for one instantiation.
///
/// Keys matching declared props are bound as props; every other key becomes
/// ad-hoc instance state. Undeclared `view` and `style` keys are taken as
/// inline sources instead: strings are pre-rendered markup, objects are
/// `{ "type": ..., "content": ... }` records.
#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    values: Map<String, Value>,
    view: Option<ContentSource>,
    style: Option<ContentSource>,
}

impl RenderArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Arguments from a JSON object; `null` means no arguments.
    pub fn from_value(value: Value) -> Result<Self, ComponentError> {
        match value {
            Value::Object(values) => Ok(Self::from_map(values)),
            Value::Null => Ok(Self::default()),
            other => Err(ComponentError::Other {
                message: format!("Render arguments must be an object, got {}", describe_value(&other)),
            }),
        }
    }

    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn view(mut self, source: impl Into<ContentSource>) -> Self {
        self.view = Some(source.into());
        self
    }

    #[must_use]
    pub fn style(mut self, source: impl Into<ContentSource>) -> Self {
        self.style = Some(source.into());
        self
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// A component instance: bound props, ad-hoc state and inline sources.
pub struct Component {
    class: Arc<ComponentClass>,
    props: Map<String, Value>,
    state: Map<String, Value>,
    inline_view: Option<ContentSource>,
    inline_style: Option<ContentSource>,
    nested: Option<String>,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("class", &self.class.full_name())
            .field("props", &self.props)
            .field("state", &self.state)
            .field("inline_view", &self.inline_view)
            .field("inline_style", &self.inline_style)
            .finish()
    }
}

type Block<'a> = Box<dyn FnOnce() -> Result<String, ComponentError> + 'a>;

impl Component {
    pub(crate) fn new(class: Arc<ComponentClass>, args: RenderArgs) -> Result<Self, ComponentError> {
        let RenderArgs {
            values,
            view,
            style,
        } = args;
        let mut component = Self {
            class: Arc::clone(&class),
            props: Map::new(),
            state: Map::new(),
            inline_view: view,
            inline_style: style,
            nested: None,
        };

        let mut values = Some(values);
        let bound = class.callbacks().run(
            Phase::Initialize,
            class.full_name(),
            &mut component,
            &mut |component: &mut Component| match values.take() {
                Some(values) => component.bind(values),
                None => Ok(()),
            },
        )?;
        if !bound {
            tracing::debug!(component = %class.full_name(), "Initialization suppressed, props left unbound");
        }
        Ok(component)
    }

    fn bind(&mut self, values: Map<String, Value>) -> Result<(), ComponentError> {
        let class = Arc::clone(&self.class);
        class.props().bind(class.full_name(), &values, &mut self.props)?;

        for (key, value) in values {
            if class.props().contains(&key) {
                continue;
            }
            match key.as_str() {
                "view" if self.inline_view.is_none() && !value.is_null() => {
                    self.inline_view = Some(ContentSource::from_value(&value)?);
                }
                "style" if self.inline_style.is_none() && !value.is_null() => {
                    self.inline_style = Some(ContentSource::from_value(&value)?);
                }
                _ => {
                    self.state.insert(key, value);
                }
            }
        }
        Ok(())
    }

    pub fn class(&self) -> &Arc<ComponentClass> {
        &self.class
    }

    pub fn name(&self) -> &str {
        self.class.full_name()
    }

    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }

    /// Assign a declared prop, with the same type check as binding.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnknownProp`] for an undeclared name,
    /// [`ComponentError::IncorrectPropType`] for a value of the wrong type.
    pub fn set_prop(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ComponentError> {
        let value = value.into();
        let Some(definition) = self.class.prop_definition(name) else {
            return Err(ComponentError::UnknownProp {
                component: self.class.full_name().to_string(),
                prop: name.to_string(),
            });
        };
        definition.check(self.class.full_name(), &value)?;
        self.props.insert(name.to_string(), value);
        Ok(())
    }

    /// Ad-hoc state set at instantiation or by a hook.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.state.insert(key.into(), value.into());
    }

    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    pub fn inline_view(&self) -> Option<&ContentSource> {
        self.inline_view.as_ref()
    }

    pub fn set_inline_view(&mut self, source: impl Into<ContentSource>) {
        self.inline_view = Some(source.into());
    }

    pub fn inline_style(&self) -> Option<&ContentSource> {
        self.inline_style.as_ref()
    }

    pub fn set_inline_style(&mut self, source: impl Into<ContentSource>) {
        self.inline_style = Some(source.into());
    }

    /// Output of the nested block, once the render phase has evaluated it.
    pub fn nested_content(&self) -> Option<&str> {
        self.nested.as_deref()
    }

    pub fn css_id(&self, name: &str) -> String {
        self.class.css_id(name)
    }

    /// Variables visible to templates: ad-hoc state, then bound props over
    /// it, then `children` / `nested_content` when a block was given.
    pub fn template_context(&self) -> TeraContext {
        let mut ctx = TeraContext::new();
        for (key, value) in &self.state {
            ctx.insert(key.as_str(), value);
        }
        for (key, value) in &self.props {
            ctx.insert(key.as_str(), value);
        }
        if let Some(nested) = &self.nested {
            ctx.insert("children", nested);
            ctx.insert("nested_content", nested);
        }
        ctx
    }

    /// Run the render phase.
    pub fn render(&mut self) -> Result<String, ComponentError> {
        self.render_phase(None)
    }

    /// Run the render phase with a nested content block.
    pub fn render_with<F>(&mut self, block: F) -> Result<String, ComponentError>
    where
        F: FnOnce() -> Result<String, ComponentError>,
    {
        self.render_phase(Some(Box::new(block)))
    }

    fn render_phase(&mut self, block: Option<Block<'_>>) -> Result<String, ComponentError> {
        let class = Arc::clone(&self.class);
        let mut block = block;
        let mut output = None;

        let rendered = class.callbacks().run(
            Phase::Render,
            class.full_name(),
            self,
            &mut |component: &mut Component| {
                if let Some(block) = block.take() {
                    component.nested = Some(block()?);
                }
                output = Some(component.render_body()?);
                Ok(())
            },
        )?;

        if !rendered {
            return Ok(String::new());
        }
        Ok(output.unwrap_or_default())
    }

    fn render_body(&self) -> Result<String, ComponentError> {
        let class = &self.class;
        let dispatcher = class.dispatcher();
        let precedence = class.config().precedence;
        let variables = self.template_context();

        let class_view = class.class_view()?;
        let inline_view =
            resolver::inline_candidate(ContentKind::View, self.inline_view.as_ref(), class)?;
        let class_level = match class_view.as_ref() {
            ClassView::Missing => None,
            view => Some(ViewSource::Class(view)),
        };

        let html = match resolver::select(precedence, class_level, inline_view.map(ViewSource::Inline))
        {
            Some(ViewSource::Inline(content)) => {
                content.render(ContentKind::View, dispatcher, class.scope(), &variables)?
            }
            Some(ViewSource::Class(ClassView::Interpreted(content))) => {
                content.render(ContentKind::View, dispatcher, class.scope(), &variables)?
            }
            Some(ViewSource::Class(ClassView::Compiled {
                routine,
                origin,
            })) => routine.render(&RenderContext {
                scope: class.scope(),
                variables: &variables,
                origin,
            })?,
            Some(ViewSource::Class(ClassView::Missing)) | None => {
                return Err(ComponentError::ViewNotFound {
                    component: class.full_name().to_string(),
                });
            }
        };

        let css = match resolver::resolve(ContentKind::Style, class, self.inline_style.as_ref())? {
            Some(content) => {
                Some(content.render(ContentKind::Style, dispatcher, class.scope(), &variables)?)
            }
            None => None,
        };

        tracing::trace!(component = %class.full_name(), bytes = html.len(), "Rendered view");
        Ok(StyleInjector::compose(html, css.as_deref()))
    }
}

enum ViewSource<'a> {
    Class(&'a ClassView),
    Inline(ResolvedContent),
}
