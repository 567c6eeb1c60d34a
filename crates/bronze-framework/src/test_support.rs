//! In-memory platform shared by the unit tests.
//!
//! Guild `1` ("test guild") has channel `100` (#general) and the members
//! `alice` (10), `alice2` (12), `bob` (11) and `someone` (13), joined in that
//! order. Channel `200` is private. The bot user is `12345`. Messages come
//! from `carol` (20).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bronze_core::{
    Channel, Embed, GuildState, Id, Member, Message, Platform, PlatformError, PlatformResult, SentMessage,
    User,
};
use parking_lot::Mutex;

use crate::data::{Data, TriggerSource};

pub const BOT_ID: Id = 12345;
pub const GUILD_ID: Id = 1;
pub const GUILD_CHANNEL: Id = 100;
pub const DM_CHANNEL: Id = 200;
pub const AUTHOR_ID: Id = 20;

pub struct MockPlatform {
    bot: Option<User>,
    guild: Arc<GuildState>,
    users: Mutex<HashMap<Id, User>>,
    texts: Mutex<Vec<(Id, String)>>,
    embeds: Mutex<Vec<(Id, Embed)>>,
    deleted: Mutex<Vec<Id>>,
    next_id: AtomicU64,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        let guild = GuildState::new(GUILD_ID, "test guild");
        for (id, name) in [(10, "alice"), (12, "alice2"), (11, "bob"), (13, "someone")] {
            guild.upsert_member(Member::new(GUILD_ID, User::new(id, name)));
        }
        guild.upsert_channel(Channel::guild(GUILD_CHANNEL, GUILD_ID, "general"));

        Arc::new(Self {
            bot: Some(User::new(BOT_ID, "bronze").as_bot()),
            guild: Arc::new(guild),
            users: Mutex::new(HashMap::new()),
            texts: Mutex::new(Vec::new()),
            embeds: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1000),
        })
    }

    /// A user known to the platform but not a guild member.
    pub fn add_user(&self, user: User) {
        self.users.lock().insert(user.id, user);
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.texts.lock().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn sent_embeds(&self) -> Vec<Embed> {
        self.embeds.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn deleted(&self) -> Vec<Id> {
        self.deleted.lock().clone()
    }

    fn receipt(&self, channel_id: Id) -> SentMessage {
        SentMessage {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            channel_id,
        }
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn current_user(&self) -> Option<User> {
        self.bot.clone()
    }

    async fn channel(&self, channel_id: Id) -> PlatformResult<Channel> {
        match channel_id {
            DM_CHANNEL => Ok(Channel::private(DM_CHANNEL)),
            id => self.guild.channel(id).ok_or(PlatformError::ChannelNotFound(id)),
        }
    }

    async fn guild(&self, guild_id: Id) -> PlatformResult<Arc<GuildState>> {
        if guild_id == GUILD_ID {
            Ok(Arc::clone(&self.guild))
        } else {
            Err(PlatformError::GuildNotFound(guild_id))
        }
    }

    async fn fetch_member(&self, guild_id: Id, user_id: Id) -> PlatformResult<Member> {
        self.guild
            .member(user_id)
            .filter(|_| guild_id == GUILD_ID)
            .ok_or(PlatformError::MemberNotFound {
                guild: guild_id,
                user: user_id,
            })
    }

    async fn fetch_user(&self, user_id: Id) -> PlatformResult<User> {
        if let Some(user) = self.users.lock().get(&user_id) {
            return Ok(user.clone());
        }
        self.guild
            .member(user_id)
            .map(|m| m.user)
            .ok_or(PlatformError::UserNotFound(user_id))
    }

    async fn send_message(&self, channel_id: Id, content: &str) -> PlatformResult<SentMessage> {
        self.texts.lock().push((channel_id, content.to_string()));
        Ok(self.receipt(channel_id))
    }

    async fn send_embed(&self, channel_id: Id, embed: &Embed) -> PlatformResult<SentMessage> {
        self.embeds.lock().push((channel_id, embed.clone()));
        Ok(self.receipt(channel_id))
    }

    async fn delete_messages(&self, _channel_id: Id, message_ids: &[Id]) -> PlatformResult<()> {
        self.deleted.lock().extend_from_slice(message_ids);
        Ok(())
    }
}

pub fn author() -> User {
    User::new(AUTHOR_ID, "carol")
}

pub fn guild_message(content: &str) -> Message {
    Message::new(1, GUILD_CHANNEL, author(), content).with_member(Member::new(GUILD_ID, author()))
}

pub fn dm_message(content: &str) -> Message {
    Message::new(2, DM_CHANNEL, author(), content)
}

/// Data for a prefix invocation in the guild, with `content` as the
/// remaining command text.
pub fn guild_data(platform: Arc<MockPlatform>, content: &str) -> Data {
    let guild = Arc::clone(&platform.guild);
    let mut data = Data::new(
        platform,
        Arc::new(guild_message(content)),
        Channel::guild(GUILD_CHANNEL, GUILD_ID, "general"),
    );
    data.guild = Some(guild);
    data.member = Some(Member::new(GUILD_ID, author()));
    data.source = TriggerSource::Prefix;
    data.stripped = content.to_string();
    data
}

/// Data for a private channel invocation.
pub fn dm_data(platform: Arc<MockPlatform>, content: &str) -> Data {
    let mut data = Data::new(platform, Arc::new(dm_message(content)), Channel::private(DM_CHANNEL));
    data.source = TriggerSource::Dm;
    data.stripped = content.to_string();
    data
}
