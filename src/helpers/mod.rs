//! Helper names for component classes.
//!
//! Hosts render components either through the class handle returned by
//! [`Environment::define`](crate::environment::Environment::define) or by
//! name through the [`HelperRegistry`]. Templates use the registry through
//! the `component(name=...)` function.

pub mod naming;
pub mod registry;

pub use registry::{Diagnostic, HelperHandle, HelperKey, HelperRegistry, HelperScope};
