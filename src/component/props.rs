//! Prop declarations, type checks and binding.
//!
//! A class declares its props once. Each instantiation binds the supplied
//! values against those declarations in declaration order:
//!
//! 1. A declared default is evaluated and assigned (every instance gets a
//!    fresh value; deferred defaults run once per instance)
//! 2. A required prop with no supplied value fails with
//!    [`ComponentError::MissingProps`], even when it has a default
//! 3. A supplied value is type-checked and assigned, replacing the default
//!
//! Keys that match no declaration are left for the instance to keep as
//! ad-hoc state.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::ComponentError;
use crate::templating::content::describe_value;

/// Predicate backing a [`PropType::Custom`] type.
pub type TypePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Producer backing a deferred default.
pub type DefaultProducer = Arc<dyn Fn() -> Value + Send + Sync>;

/// The type a prop value must have.
#[derive(Clone)]
pub enum PropType {
    String,
    /// Any number.
    Numeric,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
    /// A host-defined type checked by a predicate.
    Custom { name: String, predicate: TypePredicate },
}

/// Names accepted by [`PropType::parse`], for error messages.
const KNOWN_TYPE_NAMES: &str = "string, numeric, integer, float, boolean, array, object";

impl PropType {
    /// Parse a type name such as `"string"` or `"numeric"`.
    ///
    /// Aliases: `number` for `numeric`, `bool` for `boolean`, `list` for
    /// `array`, `hash` and `map` for `object`. Matching is case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Some(PropType::String),
            "numeric" | "number" => Some(PropType::Numeric),
            "integer" | "int" => Some(PropType::Integer),
            "float" => Some(PropType::Float),
            "boolean" | "bool" => Some(PropType::Boolean),
            "array" | "list" => Some(PropType::Array),
            "object" | "hash" | "map" => Some(PropType::Object),
            _ => None,
        }
    }

    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        PropType::Custom {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PropType::String => "string",
            PropType::Numeric => "numeric",
            PropType::Integer => "integer",
            PropType::Float => "float",
            PropType::Boolean => "boolean",
            PropType::Array => "array",
            PropType::Object => "object",
            PropType::Custom {
                name,
                ..
            } => name,
        }
    }

    /// Whether `value` is an instance of this type. `null` is never
    /// accepted here; nil handling belongs to the prop.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            PropType::String => value.is_string(),
            PropType::Numeric => value.is_number(),
            PropType::Integer => value.is_i64() || value.is_u64(),
            PropType::Float => value.is_f64(),
            PropType::Boolean => value.is_boolean(),
            PropType::Array => value.is_array(),
            PropType::Object => value.is_object(),
            PropType::Custom {
                predicate,
                ..
            } => !value.is_null() && predicate(value),
        }
    }
}

impl fmt::Debug for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropType::Custom {
                name,
                ..
            } => write!(f, "Custom({name})"),
            other => f.write_str(other.name()),
        }
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A prop default: a literal copied into each instance, or a producer
/// invoked once per instance.
#[derive(Clone)]
pub enum PropDefault {
    Value(Value),
    Deferred(DefaultProducer),
}

impl PropDefault {
    pub fn evaluate(&self) -> Value {
        match self {
            PropDefault::Value(value) => value.clone(),
            PropDefault::Deferred(producer) => producer(),
        }
    }
}

impl fmt::Debug for PropDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            PropDefault::Deferred(_) => f.write_str("Deferred(<producer>)"),
        }
    }
}

#[derive(Debug, Clone)]
enum TypeRef {
    Named(String),
    Resolved(PropType),
}

/// A prop declaration as written on a
/// [`ComponentBuilder`](super::ComponentBuilder).
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use tilekit::component::{Prop, PropType};
///
/// let title = Prop::typed("string").required();
/// let tags = Prop::of(PropType::Array).with_default(json!([]));
/// let note = Prop::typed("string").allow_nil();
/// # let _ = (title, tags, note);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Prop {
    type_ref: Option<TypeRef>,
    required: bool,
    default: Option<PropDefault>,
    allow_nil: bool,
}

impl Prop {
    /// An untyped, optional prop.
    pub fn new() -> Self {
        Self::default()
    }

    /// A prop whose type is given by name. Unknown names are reported when
    /// the class is built.
    pub fn typed(type_name: impl Into<String>) -> Self {
        Self {
            type_ref: Some(TypeRef::Named(type_name.into())),
            ..Self::default()
        }
    }

    pub fn of(prop_type: PropType) -> Self {
        Self {
            type_ref: Some(TypeRef::Resolved(prop_type)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(PropDefault::Value(value.into()));
        self
    }

    /// A default produced afresh for every instance.
    #[must_use]
    pub fn with_default_fn<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(PropDefault::Deferred(Arc::new(producer)));
        self
    }

    /// Accept `null` in addition to the declared type.
    #[must_use]
    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }
}

/// A resolved prop declaration.
#[derive(Debug, Clone)]
pub struct PropDefinition {
    name: String,
    prop_type: Option<PropType>,
    required: bool,
    default: Option<PropDefault>,
    allow_nil: bool,
}

impl PropDefinition {
    pub(crate) fn resolve(
        component: &str,
        name: impl Into<String>,
        prop: Prop,
    ) -> Result<Self, ComponentError> {
        let name = name.into();
        let prop_type = match prop.type_ref {
            None => None,
            Some(TypeRef::Resolved(prop_type)) => Some(prop_type),
            Some(TypeRef::Named(type_name)) => match PropType::parse(&type_name) {
                Some(prop_type) => Some(prop_type),
                None => {
                    return Err(ComponentError::IncorrectPropType {
                        component: component.to_string(),
                        prop: name,
                        reason: format!(
                            "`{type_name}` is not a type (expected one of: {KNOWN_TYPE_NAMES})"
                        ),
                    });
                }
            },
        };

        Ok(Self {
            name,
            prop_type,
            required: prop.required,
            default: prop.default,
            allow_nil: prop.allow_nil,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prop_type(&self) -> Option<&PropType> {
        self.prop_type.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&PropDefault> {
        self.default.as_ref()
    }

    pub fn allows_nil(&self) -> bool {
        self.allow_nil
    }

    /// Check `value` against the declared type and nil policy. Untyped props
    /// accept anything.
    ///
    /// # Errors
    ///
    /// [`ComponentError::IncorrectPropType`] naming the component, the prop
    /// and what was received.
    pub fn check(&self, component: &str, value: &Value) -> Result<(), ComponentError> {
        let Some(prop_type) = &self.prop_type else {
            return Ok(());
        };

        let reason = if value.is_null() {
            if self.allow_nil {
                return Ok(());
            }
            format!("received null instead of `{prop_type}` and the prop does not allow nil")
        } else if prop_type.accepts(value) {
            return Ok(());
        } else {
            format!("received {} instead of `{prop_type}`", describe_value(value))
        };

        Err(ComponentError::IncorrectPropType {
            component: component.to_string(),
            prop: self.name.clone(),
            reason,
        })
    }
}

/// The ordered prop declarations of one class.
#[derive(Debug, Clone, Default)]
pub struct PropRegistry {
    definitions: Vec<PropDefinition>,
}

impl PropRegistry {
    /// Add a declaration. Declaring a name again replaces the earlier
    /// declaration in place.
    pub(crate) fn declare(&mut self, definition: PropDefinition) {
        match self.definitions.iter_mut().find(|existing| existing.name == definition.name) {
            Some(existing) => *existing = definition,
            None => self.definitions.push(definition),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropDefinition> {
        self.definitions.iter().find(|definition| definition.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropDefinition> {
        self.definitions.iter()
    }

    /// Declared names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(PropDefinition::name).collect()
    }

    pub fn required_names(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .filter(|definition| definition.required)
            .map(PropDefinition::name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Bind `values` into `bound` following the declaration order.
    ///
    /// Stops at the first failing prop; `bound` may then hold the props
    /// that were processed before it.
    pub(crate) fn bind(
        &self,
        component: &str,
        values: &Map<String, Value>,
        bound: &mut Map<String, Value>,
    ) -> Result<(), ComponentError> {
        for definition in &self.definitions {
            if let Some(default) = &definition.default {
                bound.insert(definition.name.clone(), default.evaluate());
            }

            match values.get(&definition.name) {
                Some(value) => {
                    definition.check(component, value)?;
                    bound.insert(definition.name.clone(), value.clone());
                }
                None if definition.required => {
                    return Err(ComponentError::MissingProps {
                        component: component.to_string(),
                        prop: definition.name.clone(),
                    });
                }
                None => {}
            }
        }
        Ok(())
    }
}
