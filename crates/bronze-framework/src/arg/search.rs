//! Member search by name.
//!
//! Both searches walk the guild member list in join order under the
//! directory's read lock and clone the result out before returning.

use bronze_core::{GuildState, Member};

use crate::error::{ArgError, MAX_NAME_CANDIDATES};

/// Finds the first member whose username equals `name`, ignoring case.
pub fn find_member_by_username(guild: &GuildState, name: &str) -> Option<Member> {
    let name = name.to_lowercase();
    guild.with_members(|members| {
        members
            .iter()
            .find(|m| m.user.username.to_lowercase() == name)
            .cloned()
    })
}

/// Searches members by username and nickname.
///
/// Up to [`MAX_NAME_CANDIDATES`] exact (case-insensitive) matches on username
/// or nickname, and as many partial username matches, are collected:
///
/// - exactly one exact match is returned
/// - no match at all is [`ArgError::UserNotFound`]
/// - several exact matches are [`ArgError::AmbiguousUser`], listing exact
///   then partial candidates
/// - otherwise the partial matches are offered as [`ArgError::DidYouMean`]
pub fn find_members_by_name(guild: &GuildState, query: &str) -> Result<Member, ArgError> {
    let needle = query.to_lowercase();

    let (mut full, partial) = guild.with_members(|members| {
        let mut full: Vec<Member> = Vec::new();
        let mut partial: Vec<Member> = Vec::new();

        for m in members {
            if full.len() >= MAX_NAME_CANDIDATES && partial.len() >= MAX_NAME_CANDIDATES {
                break;
            }

            let username = m.user.username.to_lowercase();
            let nick_matches = m
                .nick
                .as_deref()
                .is_some_and(|n| n.to_lowercase() == needle);

            if username == needle || nick_matches {
                if full.len() < MAX_NAME_CANDIDATES {
                    full.push(m.clone());
                }
            } else if username.contains(&needle) && partial.len() < MAX_NAME_CANDIDATES {
                partial.push(m.clone());
            }
        }

        (full, partial)
    });

    if full.len() == 1 {
        return Ok(full.remove(0));
    }

    if full.is_empty() && partial.is_empty() {
        return Err(ArgError::UserNotFound(query.to_string()));
    }

    let names = |ms: &[Member]| -> Vec<String> { ms.iter().map(|m| m.user.username.clone()).collect() };

    if full.len() > 1 {
        let mut candidates = names(&full);
        candidates.extend(names(&partial));
        return Err(ArgError::AmbiguousUser(candidates));
    }

    Err(ArgError::DidYouMean(names(&partial)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bronze_core::User;

    fn guild(names: &[&str]) -> GuildState {
        let guild = GuildState::new(1, "g");
        for (i, name) in names.iter().enumerate() {
            guild.upsert_member(Member::new(1, User::new(i as u64 + 1, *name)));
        }
        guild
    }

    #[test]
    fn test_exact_match_wins_over_partial() {
        let guild = guild(&["alice", "alice2", "bob"]);
        let found = find_members_by_name(&guild, "alice").map(|m| m.user.username);
        assert_eq!(found, Ok("alice".to_string()));

        let found = find_members_by_name(&guild, "ALICE").map(|m| m.user.username);
        assert_eq!(found, Ok("alice".to_string()));
    }

    #[test]
    fn test_partial_matches_suggest() {
        let guild = guild(&["alice", "alice2", "bob"]);
        assert_eq!(
            find_members_by_name(&guild, "ali"),
            Err(ArgError::DidYouMean(vec!["alice".into(), "alice2".into()]))
        );
    }

    #[test]
    fn test_not_found() {
        let guild = guild(&["alice", "bob"]);
        assert_eq!(
            find_members_by_name(&guild, "carol"),
            Err(ArgError::UserNotFound("carol".into()))
        );
    }

    #[test]
    fn test_ambiguous_lists_exact_then_partial() {
        let guild = guild(&["sam", "Sam", "samuel"]);
        assert_eq!(
            find_members_by_name(&guild, "sam"),
            Err(ArgError::AmbiguousUser(vec![
                "sam".into(),
                "Sam".into(),
                "samuel".into()
            ]))
        );
    }

    #[test]
    fn test_nickname_counts_as_exact() {
        let guild = GuildState::new(1, "g");
        guild.upsert_member(Member::new(1, User::new(1, "xyz")).with_nick("Boss"));
        let found = find_members_by_name(&guild, "boss").map(|m| m.user.id);
        assert_eq!(found, Ok(1));
    }

    #[test]
    fn test_candidates_are_capped() {
        let names: Vec<String> = (0..8).map(|i| format!("user{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let guild = guild(&refs);

        match find_members_by_name(&guild, "user") {
            Err(ArgError::DidYouMean(c)) => {
                assert_eq!(c.len(), MAX_NAME_CANDIDATES);
                assert_eq!(c[0], "user0");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_find_by_username() {
        let guild = guild(&["alice", "bob"]);
        assert_eq!(
            find_member_by_username(&guild, "Bob").map(|m| m.user.id),
            Some(2)
        );
        assert!(find_member_by_username(&guild, "bo").is_none());
    }
}
