//! Integration test suite for tilekit
//!
//! End-to-end tests that define components through the public API or from
//! `component.toml` directories and check the rendered markup.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! cargo nextest run --test integration
//! ```
//!
//! # Test Organization
//!
//! - **callbacks**: Before/around/after hooks on `initialize` and `render`
//! - **cli**: The `tilekit` binary (render, check, list, config)
//! - **concurrency**: Shared classes rendered from many threads
//! - **nested**: Components rendering components from templates
//! - **precedence**: Inline, declared and file sources competing
//! - **props**: Prop binding, defaults and type checks
//! - **rendering**: Asset files, formats, styles and nested content

mod callbacks;
mod cli;
mod concurrency;
mod nested;
mod precedence;
mod rendering;
