//! Error types for the Bronze framework.
//!
//! Errors fall into two families:
//!
//! - **User errors** ([`ArgError`], [`UserError`]): the invoking user typed
//!   something the command cannot work with. They travel through the hook chain
//!   like any other error and are rendered back to the channel as plain text.
//! - **Everything else**: handler failures and [`DispatchError`]s. These are
//!   logged; whether they are shown to the user is up to the response sender.
//!
//! Handler and hook errors are carried as [`tower::BoxError`]. Use
//! [`is_user_error`] to test for the user-facing tag, which survives any
//! amount of wrapping as long as the wrappers expose their cause via
//! [`Error::source`].

use std::error::Error;
use std::iter;

use bronze_core::{Id, PlatformError};
use thiserror::Error;

/// Maximum number of candidates listed in name-search errors.
pub const MAX_NAME_CANDIDATES: usize = 5;

/// Errors produced while matching and parsing command arguments.
///
/// All variants are user errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgError {
    #[error("{0:?} is not a whole number")]
    InvalidInt(String),

    #[error("{0:?} is not a number")]
    InvalidFloat(String),

    #[error("Improper mention {0:?}")]
    ImproperMention(String),

    #[error("Improper channel mention {0:?}")]
    ImproperChannel(String),

    #[error("User {0:?} not found")]
    UserNotFound(String),

    #[error("Channel {0} not found")]
    ChannelNotFound(Id),

    /// An integer outside of the declared inclusive range.
    #[error("{arg} is {} (has to be within {min} - {max})", bound_word(.got, .min))]
    IntOutOfRange {
        arg: String,
        got: i64,
        min: i64,
        max: i64,
    },

    /// A float outside of the declared inclusive range.
    #[error("{arg} is {} (has to be within {min:.6} - {max:.6})", bound_word(.got, .min))]
    FloatOutOfRange {
        arg: String,
        got: f64,
        min: f64,
        max: f64,
    },

    /// More than one member matched a name exactly.
    #[error(
        "Too many users with those names, please narrow it down a bit. Matches: {}",
        backticked(.0)
    )]
    AmbiguousUser(Vec<String>),

    /// No exact match, but some partial ones.
    #[error("Did you mean one of these? {}", backticked(.0))]
    DidYouMean(Vec<String>),

    #[error("No matching combo found")]
    NoComboFound,

    #[error("Not enough arguments passed")]
    NotEnoughArguments,
}

fn bound_word<T: PartialOrd>(got: &T, min: &T) -> &'static str {
    if got < min { "too small" } else { "too big" }
}

fn backticked(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A free-form error meant to be shown to the invoking user.
///
/// Handlers and hooks return this when the input was understood but cannot be
/// acted upon ("you need to be in a voice channel", "missing permission").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct UserError(pub String);

impl UserError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Returns `true` if `err`, or any error in its source chain, is a user error.
pub fn is_user_error(err: &(dyn Error + 'static)) -> bool {
    iter::successors(Some(err), |&e| e.source()).any(|e| e.is::<ArgError>() || e.is::<UserError>())
}

/// Errors that abort handling of a message outside of any command.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The channel or guild of the message could not be resolved.
    #[error("failed to establish message context: {0}")]
    Context(#[source] PlatformError),

    /// A guild message arrived without the author's member profile and it
    /// could not be fetched.
    #[error("member profile of user {user} in guild {guild} is unavailable")]
    MissingMember { guild: Id, user: Id },

    /// The response could not be delivered.
    #[error("failed to send response: {0}")]
    Send(#[source] PlatformError),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
