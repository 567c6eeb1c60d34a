//! Plain data types describing what the framework sees of a chat platform.
//!
//! These are deliberately simple value types: adapters convert their own wire
//! objects into them once per event, and the framework clones them freely.

use serde::{Deserialize, Serialize};

/// Numeric identifier used for users, channels, guilds and messages.
pub type Id = u64;

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    /// Set for automated accounts.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    pub fn new(id: Id, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            bot: false,
        }
    }

    /// Marks this user as a bot account.
    pub fn as_bot(mut self) -> Self {
        self.bot = true;
        self
    }

    /// The plain mention syntax for this user, `<@id>`.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A user's guild-specific profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub guild_id: Id,
    pub user: User,
    #[serde(default)]
    pub nick: Option<String>,
}

impl Member {
    pub fn new(guild_id: Id, user: User) -> Self {
        Self {
            guild_id,
            user,
            nick: None,
        }
    }

    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    /// The nickname if one is set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.user.username)
    }
}

/// A text channel, either inside a guild or a private (direct message) channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Id,
    /// `None` for private channels.
    #[serde(default)]
    pub guild_id: Option<Id>,
    #[serde(default)]
    pub name: String,
}

impl Channel {
    pub fn guild(id: Id, guild_id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id: Some(guild_id),
            name: name.into(),
        }
    }

    pub fn private(id: Id) -> Self {
        Self {
            id,
            guild_id: None,
            name: String::new(),
        }
    }

    /// Returns `true` if this channel does not belong to a guild.
    pub fn is_private(&self) -> bool {
        self.guild_id.is_none()
    }
}

/// An incoming message as delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Id,
    pub channel_id: Id,
    pub author: User,
    /// The author's guild profile, when the gateway includes it.
    #[serde(default)]
    pub member: Option<Member>,
    pub content: String,
    /// Users explicitly mentioned in the content, in order of appearance.
    #[serde(default)]
    pub mentions: Vec<User>,
}

impl Message {
    pub fn new(id: Id, channel_id: Id, author: User, content: impl Into<String>) -> Self {
        Self {
            id,
            channel_id,
            author,
            member: None,
            content: content.into(),
            mentions: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.member = Some(member);
        self
    }

    pub fn with_mentions(mut self, mentions: Vec<User>) -> Self {
        self.mentions = mentions;
        self
    }
}

/// A rich message payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

/// Receipt for a message the platform accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: Id,
    pub channel_id: Id,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_display_name_prefers_nick() {
        let member = Member::new(1, User::new(2, "alice"));
        assert_eq!(member.display_name(), "alice");

        let member = member.with_nick("Al");
        assert_eq!(member.display_name(), "Al");
    }

    #[test]
    fn test_private_channel() {
        assert!(Channel::private(5).is_private());
        assert!(!Channel::guild(5, 1, "general").is_private());
    }

    #[test]
    fn test_user_mention() {
        assert_eq!(User::new(42, "bob").mention(), "<@42>");
    }
}
