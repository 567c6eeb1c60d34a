//! The command trait and closure-backed commands.
//!
//! A command is anything implementing [`Command`]. Most commands are plain
//! async functions wrapped with [`handler`]:
//!
//! ```rust,ignore
//! use bronze_framework::prelude::*;
//!
//! async fn add(data: Data) -> CommandResult {
//!     Ok(format!("{}", data.arg(0).int64() + data.arg(1).int64()).into())
//! }
//!
//! let add = handler(add)
//!     .description("Adds two numbers")
//!     .args(ArgSpec::new().arg(ArgDef::new("a", ArgType::INT)).arg(ArgDef::new("b", ArgType::INT)).required(2));
//! ```

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use tower::BoxError;

use crate::data::Data;
use crate::parse::ArgSpec;
use crate::response::Reply;

/// What a command (or hook chain) produces.
pub type CommandResult = Result<Reply, BoxError>;

/// A command handler.
#[async_trait]
pub trait Command: Send + Sync + 'static {
    async fn run(&self, data: Data) -> CommandResult;

    /// One-line description for help listings.
    fn description(&self) -> &str {
        ""
    }

    fn long_description(&self) -> &str {
        ""
    }

    /// Declared arguments and switches, read once at registration.
    fn arg_spec(&self) -> ArgSpec {
        ArgSpec::default()
    }
}

/// Wraps an async function into a [`Command`].
pub fn handler<F, Fut>(f: F) -> FnCommand<F>
where
    F: Fn(Data) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CommandResult> + Send + 'static,
{
    FnCommand {
        f,
        description: String::new(),
        long_description: String::new(),
        spec: ArgSpec::default(),
    }
}

/// A [`Command`] backed by a function. Created by [`handler`].
pub struct FnCommand<F> {
    f: F,
    description: String,
    long_description: String,
    spec: ArgSpec,
}

impl<F> FnCommand<F> {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn long_description(mut self, long_description: impl Into<String>) -> Self {
        self.long_description = long_description.into();
        self
    }

    pub fn args(mut self, spec: ArgSpec) -> Self {
        self.spec = spec;
        self
    }
}

impl<F> fmt::Debug for FnCommand<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("description", &self.description)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Command for FnCommand<F>
where
    F: Fn(Data) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CommandResult> + Send + 'static,
{
    async fn run(&self, data: Data) -> CommandResult {
        (self.f)(data).await
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn long_description(&self) -> &str {
        &self.long_description
    }

    fn arg_spec(&self) -> ArgSpec {
        self.spec.clone()
    }
}
