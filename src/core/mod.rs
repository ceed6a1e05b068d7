//! Core types for tilekit
//!
//! This module holds the error system shared by every other module:
//! - [`ComponentError`] - Enumerated error types covering all failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! Every fallible library operation returns `Result<_, ComponentError>`; the
//! CLI layer works in `anyhow::Result` and converts at the edge.

pub mod error;

pub use error::{ComponentError, ErrorContext, user_friendly_error};
