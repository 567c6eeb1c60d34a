//! Error types for platform collaborators.

use thiserror::Error;

use crate::model::Id;

/// Errors reported by a [`Platform`](crate::Platform) implementation.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The channel is unknown to the platform state.
    #[error("channel {0} not found")]
    ChannelNotFound(Id),

    /// The guild is unknown to the platform state.
    #[error("guild {0} not found")]
    GuildNotFound(Id),

    /// The user is not a member of the guild, or could not be fetched.
    #[error("member {user} not found in guild {guild}")]
    MemberNotFound {
        /// Guild that was searched.
        guild: Id,
        /// User that was looked up.
        user: Id,
    },

    /// The user profile could not be fetched.
    #[error("user {0} not found")]
    UserNotFound(Id),

    /// The session is not connected (no bot user known yet).
    #[error("platform is not connected")]
    NotConnected,

    /// Sending a message failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// Deleting messages failed.
    #[error("failed to delete messages: {0}")]
    DeleteFailed(String),

    /// Any other adapter failure.
    #[error("platform error: {0}")]
    Other(String),
}

impl PlatformError {
    /// Creates an adapter-specific error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
