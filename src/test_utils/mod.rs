//! Test utilities for tilekit
//!
//! This module provides:
//! - [`TestEnvironment`] - A temporary components root with an
//!   [`Environment`](crate::environment::Environment) pointed at it
//! - [`ComponentFixture`] - Builder for component directories
//! - [`init_test_logging`] - One-time tracing setup for tests
//!
//! Available to integration tests through the `test-utils` feature.

pub mod environment;
pub mod fixtures;

pub use environment::TestEnvironment;
pub use fixtures::ComponentFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```rust,no_run
/// use tracing::Level;
///
/// tilekit::test_utils::init_test_logging(Some(Level::DEBUG));
/// ```
///
/// To enable logging in tests via environment variable:
/// ```bash
/// RUST_LOG=tilekit=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
