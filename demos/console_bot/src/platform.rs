//! A fake chat service living in the terminal.
//!
//! There is one guild, "Console Guild", with a `#general` channel (100) and
//! a few members. Every stdin line is a message from `you`; lines starting
//! with `dm ` go to a private channel (200) instead.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bronze::core::{
    Channel, Embed, GuildState, Id, Member, Message, Platform, PlatformError, PlatformResult,
    SentMessage, User,
};
use tracing::debug;

pub const BOT_ID: Id = 900;
pub const GUILD_ID: Id = 1;
pub const GENERAL: Id = 100;
pub const DIRECT: Id = 200;
const YOU: Id = 20;

pub struct ConsolePlatform {
    bot: User,
    guild: Arc<GuildState>,
    next_id: AtomicU64,
}

impl ConsolePlatform {
    pub fn new() -> Self {
        let bot = User::new(BOT_ID, "bronze").as_bot();

        let guild = GuildState::new(GUILD_ID, "Console Guild");
        guild.upsert_channel(Channel::guild(GENERAL, GUILD_ID, "general"));
        guild.upsert_member(Member::new(GUILD_ID, User::new(YOU, "you")));
        guild.upsert_member(Member::new(GUILD_ID, User::new(10, "alice")).with_nick("Ally"));
        guild.upsert_member(Member::new(GUILD_ID, User::new(11, "bob")));
        guild.upsert_member(Member::new(GUILD_ID, User::new(12, "bobby")));
        guild.upsert_member(Member::new(GUILD_ID, bot.clone()));

        Self {
            bot,
            guild: Arc::new(guild),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> Id {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Turns a line typed by the user into an incoming message.
    pub fn message_from_line(&self, line: &str) -> Message {
        let author = User::new(YOU, "you");
        let id = self.next_id();

        if let Some(content) = line.strip_prefix("dm ") {
            return Message::new(id, DIRECT, author, content);
        }

        let mentions = line
            .split_whitespace()
            .filter_map(mention_id)
            .filter_map(|id| self.known_user(id))
            .collect();

        Message::new(id, GENERAL, author.clone(), line)
            .with_member(Member::new(GUILD_ID, author))
            .with_mentions(mentions)
    }

    fn known_user(&self, id: Id) -> Option<User> {
        self.guild.member(id).map(|m| m.user)
    }

    fn channel_label(&self, channel_id: Id) -> String {
        match self.guild.channel(channel_id) {
            Some(channel) => format!("#{}", channel.name),
            None => "dm".to_string(),
        }
    }
}

/// Extracts the id from a `<@id>` or `<@!id>` token.
fn mention_id(token: &str) -> Option<Id> {
    let inner = token.strip_prefix("<@")?.strip_suffix('>')?;
    inner.strip_prefix('!').unwrap_or(inner).parse().ok()
}

#[async_trait]
impl Platform for ConsolePlatform {
    fn current_user(&self) -> Option<User> {
        Some(self.bot.clone())
    }

    async fn channel(&self, channel_id: Id) -> PlatformResult<Channel> {
        if channel_id == DIRECT {
            return Ok(Channel::private(DIRECT));
        }
        self.guild
            .channel(channel_id)
            .ok_or(PlatformError::ChannelNotFound(channel_id))
    }

    async fn guild(&self, guild_id: Id) -> PlatformResult<Arc<GuildState>> {
        if guild_id == GUILD_ID {
            Ok(Arc::clone(&self.guild))
        } else {
            Err(PlatformError::GuildNotFound(guild_id))
        }
    }

    async fn fetch_member(&self, guild_id: Id, user_id: Id) -> PlatformResult<Member> {
        debug!(guild_id, user_id, "Member fetch");
        self.guild
            .member(user_id)
            .filter(|_| guild_id == GUILD_ID)
            .ok_or(PlatformError::MemberNotFound {
                guild: guild_id,
                user: user_id,
            })
    }

    async fn fetch_user(&self, user_id: Id) -> PlatformResult<User> {
        self.known_user(user_id)
            .ok_or(PlatformError::UserNotFound(user_id))
    }

    async fn send_message(&self, channel_id: Id, content: &str) -> PlatformResult<SentMessage> {
        let id = self.next_id();
        println!("[{}] bronze (#{id}): {content}", self.channel_label(channel_id));
        Ok(SentMessage { id, channel_id })
    }

    async fn send_embed(&self, channel_id: Id, embed: &Embed) -> PlatformResult<SentMessage> {
        let rendered = serde_json::to_string_pretty(embed).map_err(|e| PlatformError::SendFailed(e.to_string()))?;
        let id = self.next_id();
        println!("[{}] bronze (#{id}) embed:\n{rendered}", self.channel_label(channel_id));
        Ok(SentMessage { id, channel_id })
    }

    async fn delete_messages(&self, channel_id: Id, message_ids: &[Id]) -> PlatformResult<()> {
        println!("[{}] bronze deleted {message_ids:?}", self.channel_label(channel_id));
        Ok(())
    }
}
