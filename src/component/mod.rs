//! Component classes, instances and their rendering pipeline.
//!
//! A component couples typed props with a view and an optional style. A
//! class is declared once through a [`ComponentBuilder`] and rendered any
//! number of times, from any thread.
//!
//! # Rendering
//!
//! Rendering an instance runs the `render` [`Phase`]:
//!
//! 1. The nested content block, if any, is evaluated
//! 2. The view is resolved (see [`resolver`]) and rendered by the engine
//!    registered for its format
//! 3. The style is resolved and rendered the same way
//! 4. A non-empty style is appended as `<style type='text/css'>…</style>`
//!
//! With `compile_views` on, the class-level view (asset file or
//! declaration) is compiled on first render and reused. Inline views are
//! rendered afresh every time.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tilekit::component::{Phase, Prop, RenderArgs};
//! use tilekit::config::RenderConfig;
//! use tilekit::environment::Environment;
//! use tilekit::templating::TypedContent;
//!
//! # fn main() -> Result<(), tilekit::core::ComponentError> {
//! let env = Environment::new(RenderConfig::default());
//! let card = env
//!     .component("Card")
//!     .prop("title", Prop::typed("string").required())
//!     .prop("tags", Prop::typed("array").with_default(json!([])))
//!     .view(TypedContent::literal(
//!         "tera",
//!         "<h2>{{ title }}</h2>{% for tag in tags %}<i>{{ tag }}</i>{% endfor %}",
//!     ))
//!     .style(TypedContent::literal("css", "h2 { margin: 0; }"))
//!     .before(Phase::Render, |card| {
//!         let title = card.prop("title").and_then(|t| t.as_str()).unwrap_or_default();
//!         let upper = title.to_uppercase();
//!         card.set_prop("title", upper)?;
//!         Ok(())
//!     })
//!     .define()?;
//!
//! let html = card.render(RenderArgs::new().arg("title", "news").arg("tags", json!(["a"])))?;
//! assert_eq!(html, "<h2>NEWS</h2><i>a</i><style type='text/css'>h2 { margin: 0; }</style>");
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod callbacks;
mod class;
mod instance;
pub mod props;
pub mod resolver;
pub mod style;

pub use callbacks::{AroundHook, Callbacks, Hook, Next, Phase};
pub use class::{ComponentBuilder, ComponentClass, SourceReport};
pub use instance::{Component, RenderArgs};
pub use props::{Prop, PropDefault, PropDefinition, PropRegistry, PropType};
pub use resolver::ResolvedContent;
pub use style::StyleInjector;
