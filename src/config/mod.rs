//! Configuration for tilekit.
//!
//! # Sources
//!
//! [`RenderConfig::load`] builds the configuration in layers:
//!
//! 1. Built-in defaults, or the preset named by `TILEKIT_ENV`
//!    (`development` or `production`)
//! 2. The first configuration file found among the `--config` path,
//!    `TILEKIT_CONFIG_PATH` and `~/.tilekit/config.toml`
//!
//! Keys present in the file override the preset; absent keys keep it.
//!
//! # Presets
//!
//! | Setting                    | default        | development | production |
//! |----------------------------|----------------|-------------|------------|
//! | `precedence`               | `inline-first` | same        | same       |
//! | `compile_views`            | `true`         | `false`     | `true`     |
//! | `cache_asset_lookups`      | `false`        | `false`     | `true`     |
//! | `warn_on_helper_collision` | `true`         | `true`      | `false`    |
//! | `max_nesting_depth`        | `10`           | same        | same       |
//!
//! # Modules
//!
//! - `render` - [`RenderConfig`] and its loading rules
//! - `parser` - TOML file parsing with file path context

pub mod parser;
pub mod render;

pub use parser::parse_toml_file;
pub use render::{CONFIG_PATH_ENV, ENV_PRESET_ENV, Precedence, RenderConfig};
