//! Configuration for Bronze applications.
//!
//! Files, environment variables and programmatic overrides are layered with
//! figment; see [`loader`] for the precedence rules.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BronzeConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SpanEventConfig,
    SystemConfig,
};
pub use validation::validate_config;
