//! tilekit - reusable view components
//!
//! A component couples a set of typed props with a view template and an
//! optional style sheet. Classes are declared once, from code or from a
//! `component.toml` directory, and rendered any number of times from any
//! thread.
//!
//! # Architecture Overview
//!
//! - A class declares props (type, required, default, allow-nil), a view and
//!   a style, and lifecycle callbacks around `initialize` and `render`
//! - Each render binds props, resolves the view from the asset file, the
//!   class declaration or an inline argument, and dispatches it to the
//!   engine registered for its format
//! - Class-level views are compiled once into a per-class render cache
//! - Components render other components from templates through the helper
//!   registry, with nested failures reported as a chain
//!
//! # Core Modules
//!
//! - [`component`] - Classes, builders, instances, props, callbacks and
//!   view/style resolution
//! - [`environment`] - Shared configuration, engines and helper registry
//! - [`templating`] - Typed content, format engines, the dispatcher and the
//!   render cache
//! - [`helpers`] - Helper names, aliases and scoped CSS identifiers
//! - [`manifest`] - `component.toml` parsing and discovery
//! - [`config`] - Render configuration presets and files
//! - [`core`] - Error types and user-facing error reporting
//! - [`cli`] - The `tilekit` command
//!
//! # Example
//!
//! ```rust
//! use tilekit::component::{Prop, RenderArgs};
//! use tilekit::config::RenderConfig;
//! use tilekit::environment::Environment;
//! use tilekit::templating::TypedContent;
//!
//! # fn main() -> Result<(), tilekit::core::ComponentError> {
//! let env = Environment::new(RenderConfig::default());
//! let badge = env
//!     .component("Badge")
//!     .prop("label", Prop::typed("string").with_default("Default Description"))
//!     .view(TypedContent::literal("tera", "<div>{{ label }}</div>"))
//!     .style(TypedContent::literal("css", "div { color: blue; }"))
//!     .define()?;
//!
//! assert_eq!(
//!     badge.render(RenderArgs::new())?,
//!     "<div>Default Description</div><style type='text/css'>div { color: blue; }</style>"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Render a component directory
//! tilekit render components/badge --props '{"label": "New"}'
//!
//! # Check every component below a directory
//! tilekit check components
//!
//! # List components and their props
//! tilekit list components
//! ```

pub mod cli;
pub mod component;
pub mod config;
pub mod core;
pub mod environment;
pub mod helpers;
pub mod manifest;
pub mod templating;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use component::{ComponentBuilder, ComponentClass, Prop, PropType, RenderArgs};
pub use config::RenderConfig;
pub use core::ComponentError;
pub use environment::Environment;
pub use templating::TypedContent;
