//! The platform collaborator trait.
//!
//! A [`Platform`] is the framework's only window onto the chat service. The
//! command framework calls it to establish the context of an incoming message
//! (channel, guild, author profile), to resolve user and channel arguments
//! while parsing, and to deliver responses.
//!
//! Lookups are `async` because an adapter may fall back to a network fetch when
//! its local cache misses.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PlatformResult;
use crate::guild::GuildState;
use crate::model::{Channel, Embed, Id, Member, SentMessage, User};

/// Type-erased platform shared between the system and every invocation.
pub type BoxedPlatform = Arc<dyn Platform>;

#[async_trait]
pub trait Platform: Send + Sync + 'static {
    /// The bot's own user, once the session is ready.
    fn current_user(&self) -> Option<User>;

    /// Resolves a channel by id.
    async fn channel(&self, channel_id: Id) -> PlatformResult<Channel>;

    /// Resolves the live state of a guild.
    async fn guild(&self, guild_id: Id) -> PlatformResult<Arc<GuildState>>;

    /// Fetches a guild member, bypassing the cached [`GuildState`].
    async fn fetch_member(&self, guild_id: Id, user_id: Id) -> PlatformResult<Member>;

    /// Fetches a user profile directly from the platform.
    async fn fetch_user(&self, user_id: Id) -> PlatformResult<User>;

    /// Sends a plain text message. `content` is already within length limits.
    async fn send_message(&self, channel_id: Id, content: &str) -> PlatformResult<SentMessage>;

    /// Sends a rich embed.
    async fn send_embed(&self, channel_id: Id, embed: &Embed) -> PlatformResult<SentMessage>;

    /// Deletes previously sent messages.
    async fn delete_messages(&self, channel_id: Id, message_ids: &[Id]) -> PlatformResult<()>;
}
