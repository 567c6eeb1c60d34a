//! # Bronze
//!
//! A command framework for chat bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  Message  ┌────────┐   ┌──────────────┐   ┌───────┐   ┌──────────┐
//! │   Adapter   │──────────▶│ System │──▶│ Container    │──▶│ Hooks │──▶│ Command  │
//! │ (Platform)  │◀──────────│        │   │ tree routing │   │       │   │          │
//! └─────────────┘   sends   └────────┘   └──────────────┘   └───────┘   └──────────┘
//! ```
//!
//! - **Core**: the data model and the `Platform` trait adapters implement
//! - **Framework**: tokenizer, typed arguments, routing tree, hooks, dispatch
//! - **Runtime**: configuration, logging and the message loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bronze::prelude::*;
//!
//! async fn add(data: Data) -> CommandResult {
//!     Ok((data.arg(0).int64() + data.arg(1).int64()).to_string().into())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().load()?;
//!     init_from_config(&config.logging);
//!
//!     let root = ContainerBuilder::standard().command(
//!         handler(add).args(
//!             ArgSpec::new()
//!                 .arg(ArgDef::new("a", ArgType::INT))
//!                 .arg(ArgDef::new("b", ArgType::INT))
//!                 .required(2),
//!         ),
//!         "add",
//!     );
//!
//!     let system = build_system(&config, root);
//!     serve::run(system, platform, incoming).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use bronze_core as core;
pub use bronze_framework as framework;
pub use bronze_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use bronze::prelude::*;
/// ```
pub mod prelude {
    // Commands and routing
    pub use bronze_framework::prelude::*;

    // Dispatch
    pub use bronze_framework::{PrefixProvider, ResponseSender, StdResponseSender};

    // Platform collaborator - for adapters and handlers
    pub use bronze_core::{BoxedPlatform, Channel, Embed, Id, Member, Message, Platform, User};

    // Runtime
    pub use bronze_runtime::config::{BronzeConfig, ConfigLoader};
    pub use bronze_runtime::logging::init_from_config;
    pub use bronze_runtime::{build_system, serve};
}
