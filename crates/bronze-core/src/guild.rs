//! Live guild directory.
//!
//! [`GuildState`] is owned and updated by the adapter as gateway events arrive,
//! and read by argument parsers while a command is being parsed. All access
//! goes through a reader/writer lock; readers either clone a single entry out
//! or run a closure over the member list via [`GuildState::with_members`], so
//! the lock is always released before control returns to the caller and can
//! never be held across a network call.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::model::{Channel, Id, Member};

#[derive(Debug, Default)]
struct GuildInner {
    name: String,
    /// Kept in join order so that name searches are deterministic.
    members: Vec<Member>,
    channels: HashMap<Id, Channel>,
}

/// Shared, lock-protected state of one guild.
#[derive(Debug)]
pub struct GuildState {
    id: Id,
    inner: RwLock<GuildInner>,
}

impl GuildState {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            inner: RwLock::new(GuildInner {
                name: name.into(),
                ..Default::default()
            }),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> String {
        self.inner.read().name.clone()
    }

    /// Inserts a member, replacing an existing entry for the same user in place.
    pub fn upsert_member(&self, member: Member) {
        let mut inner = self.inner.write();
        match inner
            .members
            .iter_mut()
            .find(|m| m.user.id == member.user.id)
        {
            Some(existing) => *existing = member,
            None => inner.members.push(member),
        }
    }

    /// Removes a member, returning it if it was present.
    pub fn remove_member(&self, user_id: Id) -> Option<Member> {
        let mut inner = self.inner.write();
        let pos = inner.members.iter().position(|m| m.user.id == user_id)?;
        Some(inner.members.remove(pos))
    }

    pub fn upsert_channel(&self, channel: Channel) {
        self.inner.write().channels.insert(channel.id, channel);
    }

    /// Looks up a cached member by user id.
    pub fn member(&self, user_id: Id) -> Option<Member> {
        self.inner
            .read()
            .members
            .iter()
            .find(|m| m.user.id == user_id)
            .cloned()
    }

    /// Looks up a channel of this guild by id.
    pub fn channel(&self, channel_id: Id) -> Option<Channel> {
        self.inner.read().channels.get(&channel_id).cloned()
    }

    pub fn member_count(&self) -> usize {
        self.inner.read().members.len()
    }

    /// Runs `f` over the current member list while holding the read lock.
    ///
    /// `f` must not block; the lock is released as soon as it returns.
    pub fn with_members<R>(&self, f: impl FnOnce(&[Member]) -> R) -> R {
        let inner = self.inner.read();
        f(&inner.members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;

    fn guild() -> GuildState {
        let guild = GuildState::new(1, "test guild");
        guild.upsert_member(Member::new(1, User::new(10, "alice")));
        guild.upsert_member(Member::new(1, User::new(11, "bob")));
        guild.upsert_channel(Channel::guild(100, 1, "general"));
        guild
    }

    #[test]
    fn test_member_lookup() {
        let guild = guild();
        assert_eq!(guild.member(10).map(|m| m.user.username), Some("alice".into()));
        assert!(guild.member(99).is_none());
    }

    #[test]
    fn test_upsert_keeps_join_order() {
        let guild = guild();
        guild.upsert_member(Member::new(1, User::new(10, "alice")).with_nick("Al"));

        let names: Vec<String> =
            guild.with_members(|members| members.iter().map(|m| m.display_name().to_string()).collect());
        assert_eq!(names, vec!["Al", "bob"]);
    }

    #[test]
    fn test_remove_member() {
        let guild = guild();
        assert!(guild.remove_member(11).is_some());
        assert!(guild.remove_member(11).is_none());
        assert_eq!(guild.member_count(), 1);
    }

    #[test]
    fn test_channel_lookup() {
        let guild = guild();
        assert_eq!(guild.channel(100).map(|c| c.name), Some("general".into()));
        assert!(guild.channel(101).is_none());
    }
}
