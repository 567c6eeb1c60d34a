//! Bronze Runtime - the ambient stack around the command framework.
//!
//! This crate provides:
//! - Layered configuration (`config`), loaded with figment
//! - Logging setup (`logging`) on top of `tracing-subscriber`
//! - Building a [`System`](bronze_framework::System) from configuration (`bootstrap`)
//! - A per-message task loop with graceful shutdown (`serve`)
//!
//! ```rust,ignore
//! use bronze_runtime::{bootstrap, config::load_config, logging, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let system = bootstrap::build_system(&config, commands());
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     let platform = MyPlatform::connect(tx).await?;
//!
//!     serve::run(system, platform, rx).await;
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod serve;

pub use bootstrap::build_system;
pub use config::{BronzeConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig, SystemConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for bot code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
