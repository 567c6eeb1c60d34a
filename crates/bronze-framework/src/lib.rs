//! # Bronze Framework
//!
//! Command routing and argument parsing for chat bots.
//!
//! This layer provides:
//! - A tokenizer for quoted command arguments
//! - Typed argument definitions, combos and switches, bound per invocation
//! - A tree of containers routing command names, with hook chains
//! - Trigger resolution (private message, bot mention, text prefix)
//! - Response delivery for command results
//!
//! ```text
//! message ─▶ System ─▶ find_prefix ─▶ Container::route ─▶ hooks ─▶ ArgParserLayer ─▶ Command
//!                                                                                     │
//!                                               ResponseSender ◀──── Reply / error ◀──┘
//! ```
//!
//! ```rust,ignore
//! use bronze_framework::prelude::*;
//!
//! async fn ping(_data: Data) -> CommandResult {
//!     Ok("pong".into())
//! }
//!
//! let root = ContainerBuilder::standard()
//!     .command(handler(ping).description("Replies with pong"), "ping")
//!     .seal();
//! let system = System::standard(root, "!");
//! system.handle_message(platform, message).await;
//! ```

pub mod arg;
pub mod command;
pub mod container;
pub mod data;
pub mod error;
pub mod hook;
pub mod parse;
pub mod response;
pub mod split;
pub mod system;
pub mod trigger;

#[cfg(test)]
mod test_support;

pub use arg::{ArgDef, ArgType, ArgValue, ParsedArg};
pub use command::{Command, CommandResult, FnCommand, handler};
pub use container::{CommandNode, Container, ContainerBuilder, ContainerOptions, RegisteredCommand};
pub use data::{Data, TriggerSource};
pub use error::{ArgError, DispatchError, DispatchResult, UserError, is_user_error};
pub use hook::{Hook, RunService};
pub use parse::{ArgParserLayer, ArgSpec};
pub use response::{Reply, ResponseSender, StdResponseSender};
pub use split::{RawArg, split_args};
pub use system::{PrefixProvider, SimplePrefixProvider, System};
pub use trigger::Trigger;

/// Commonly used types for writing commands.
pub mod prelude {
    pub use crate::arg::{ArgDef, ArgType, ParsedArg};
    pub use crate::command::{Command, CommandResult, handler};
    pub use crate::container::ContainerBuilder;
    pub use crate::data::{Data, TriggerSource};
    pub use crate::error::{ArgError, UserError};
    pub use crate::hook::{Hook, RunService};
    pub use crate::parse::ArgSpec;
    pub use crate::response::Reply;
    pub use crate::system::System;
    pub use crate::trigger::Trigger;
    pub use tower::ServiceExt;
}
