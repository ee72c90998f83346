//! Configuration system for shaderpipe.
//!
//! Provides TOML-based configuration with:
//! - Tool executable locations and timeouts (`[tools]`, `[tools.executables]`)
//! - A directory of named pipeline definitions (`[pipelines]`)
//! - Logging level and optional JSON log files (`[logging]`)
//! - Config file layering (user config + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    save_config, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
