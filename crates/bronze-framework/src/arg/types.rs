//! The built-in argument types.
//!
//! Every type answers two questions about a token:
//!
//! - [`ArgType::matches`]: a cheap, side-effect free shape check used to pick
//!   a combo. It may accept tokens that later fail to parse (an integer out of
//!   range still *matches*).
//! - [`ArgType::parse`]: the real conversion, which may consult the guild
//!   directory or the platform.

use bronze_core::Id;
use tracing::debug;

use super::ArgValue;
use super::search::{find_member_by_username, find_members_by_name};
use super::ArgDef;
use crate::data::Data;
use crate::error::ArgError;

/// Integer bounds. The range is only enforced when `min != max`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntArg {
    pub min: i64,
    pub max: i64,
}

/// Float bounds. The range is only enforced when `min != max`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloatArg {
    pub min: f64,
    pub max: f64,
}

/// User reference by mention, or by exact username unless `require_mention`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserArg {
    pub require_mention: bool,
}

/// Multi-stage user lookup: mention, then id, then name search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvUserArg {
    pub enable_id_search: bool,
    pub enable_username_search: bool,
    /// Only accept users that are members of the current guild.
    pub require_membership: bool,
}

/// The type of an argument slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgType {
    Int(IntArg),
    Float(FloatArg),
    String,
    User(UserArg),
    UserId,
    Channel,
    AdvUser(AdvUserArg),
}

impl ArgType {
    pub const INT: ArgType = ArgType::Int(IntArg { min: 0, max: 0 });
    pub const FLOAT: ArgType = ArgType::Float(FloatArg { min: 0.0, max: 0.0 });
    pub const STRING: ArgType = ArgType::String;
    pub const USER: ArgType = ArgType::User(UserArg {
        require_mention: false,
    });
    pub const USER_REQ_MENTION: ArgType = ArgType::User(UserArg {
        require_mention: true,
    });
    pub const USER_ID: ArgType = ArgType::UserId;
    pub const CHANNEL: ArgType = ArgType::Channel;
    pub const ADV_USER: ArgType = ArgType::AdvUser(AdvUserArg {
        enable_id_search: true,
        enable_username_search: true,
        require_membership: false,
    });
    pub const ADV_USER_NO_NAME_SEARCH: ArgType = ArgType::AdvUser(AdvUserArg {
        enable_id_search: true,
        enable_username_search: false,
        require_membership: false,
    });

    /// An integer constrained to `min..=max`.
    pub const fn int_range(min: i64, max: i64) -> Self {
        ArgType::Int(IntArg { min, max })
    }

    /// A float constrained to `min..=max`.
    pub const fn float_range(min: f64, max: f64) -> Self {
        ArgType::Float(FloatArg { min, max })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ArgType::Int(_) => "Whole number",
            ArgType::Float(_) => "Decimal number",
            ArgType::String => "Text",
            ArgType::User(_) | ArgType::AdvUser(_) => "User",
            ArgType::UserId => "Mention/ID",
            ArgType::Channel => "Channel",
        }
    }

    /// Returns `true` if `part` looks like a value of this type.
    pub fn matches(&self, part: &str) -> bool {
        match self {
            ArgType::Int(_) => part.parse::<i64>().is_ok(),
            ArgType::Float(_) => part.parse::<f64>().is_ok_and(f64::is_finite),
            ArgType::String => true,
            ArgType::User(u) => !u.require_mention || is_user_mention(part),
            ArgType::UserId => is_user_mention(part) || part.parse::<Id>().is_ok(),
            ArgType::Channel => is_channel_mention(part) || part.parse::<Id>().is_ok(),
            ArgType::AdvUser(a) => {
                is_user_mention(part)
                    || a.enable_username_search
                    || (a.enable_id_search && part.parse::<Id>().is_ok())
            }
        }
    }

    /// Parses `part` into a value for `def`.
    pub async fn parse(&self, def: &ArgDef, part: &str, data: &Data) -> Result<ArgValue, ArgError> {
        match self {
            ArgType::Int(range) => parse_int(range, def, part),
            ArgType::Float(range) => parse_float(range, def, part),
            ArgType::String => Ok(ArgValue::Text(part.to_string())),
            ArgType::User(u) => parse_user(u, part, data),
            ArgType::UserId => parse_user_id(part),
            ArgType::Channel => parse_channel(part, data),
            ArgType::AdvUser(a) => parse_adv_user(a, part, data).await,
        }
    }
}

fn parse_int(range: &IntArg, def: &ArgDef, part: &str) -> Result<ArgValue, ArgError> {
    let v: i64 = part
        .parse()
        .map_err(|_| ArgError::InvalidInt(part.to_string()))?;

    if range.min != range.max && !(range.min..=range.max).contains(&v) {
        return Err(ArgError::IntOutOfRange {
            arg: def.name.clone(),
            got: v,
            min: range.min,
            max: range.max,
        });
    }
    Ok(ArgValue::Int(v))
}

fn parse_float(range: &FloatArg, def: &ArgDef, part: &str) -> Result<ArgValue, ArgError> {
    let v: f64 = part
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ArgError::InvalidFloat(part.to_string()))?;

    if range.min != range.max && !(range.min..=range.max).contains(&v) {
        return Err(ArgError::FloatOutOfRange {
            arg: def.name.clone(),
            got: v,
            min: range.min,
            max: range.max,
        });
    }
    Ok(ArgValue::Float(v))
}

fn parse_user(arg: &UserArg, part: &str, data: &Data) -> Result<ArgValue, ArgError> {
    if part.starts_with("<@") {
        let id = user_mention_id(part).ok_or_else(|| ArgError::ImproperMention(part.to_string()))?;
        return data
            .msg
            .mentions
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .map(ArgValue::User)
            .ok_or_else(|| ArgError::ImproperMention(part.to_string()));
    }

    if arg.require_mention {
        return Err(ArgError::ImproperMention(part.to_string()));
    }

    data.guild
        .as_deref()
        .and_then(|guild| find_member_by_username(guild, part))
        .map(|m| ArgValue::User(m.user))
        .ok_or_else(|| ArgError::UserNotFound(part.to_string()))
}

fn parse_user_id(part: &str) -> Result<ArgValue, ArgError> {
    let id = if part.starts_with("<@") {
        user_mention_id(part).ok_or_else(|| ArgError::ImproperMention(part.to_string()))?
    } else {
        part.parse::<Id>()
            .map_err(|_| ArgError::InvalidInt(part.to_string()))?
    };

    i64::try_from(id)
        .map(ArgValue::Int)
        .map_err(|_| ArgError::InvalidInt(part.to_string()))
}

fn parse_channel(part: &str, data: &Data) -> Result<ArgValue, ArgError> {
    let Some(guild) = data.guild.as_deref() else {
        return Ok(ArgValue::Absent);
    };

    let id = if part.starts_with("<#") {
        channel_mention_id(part).ok_or_else(|| ArgError::ImproperChannel(part.to_string()))?
    } else {
        part.parse::<Id>()
            .map_err(|_| ArgError::ImproperChannel(part.to_string()))?
    };

    guild
        .channel(id)
        .map(ArgValue::Channel)
        .ok_or(ArgError::ChannelNotFound(id))
}

async fn parse_adv_user(arg: &AdvUserArg, part: &str, data: &Data) -> Result<ArgValue, ArgError> {
    let mut found: Option<ArgValue> = None;

    if part.starts_with("<@") {
        let id = user_mention_id(part).ok_or_else(|| ArgError::ImproperMention(part.to_string()))?;
        let user = data
            .msg
            .mentions
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| ArgError::ImproperMention(part.to_string()))?;

        found = Some(match lookup_member(data, id).await {
            Some(member) => ArgValue::Member(member),
            None => ArgValue::User(user),
        });
    } else if arg.enable_id_search
        && let Ok(id) = part.parse::<Id>()
    {
        found = match lookup_member(data, id).await {
            Some(member) => Some(ArgValue::Member(member)),
            None if !arg.require_membership => match data.platform.fetch_user(id).await {
                Ok(user) => Some(ArgValue::User(user)),
                Err(e) => {
                    debug!(user_id = id, error = %e, "User lookup by id failed");
                    None
                }
            },
            None => None,
        };
    }

    if found.is_none()
        && arg.enable_username_search
        && let Some(guild) = data.guild.as_deref()
    {
        found = Some(ArgValue::Member(find_members_by_name(guild, part)?));
    }

    match found {
        Some(v @ ArgValue::Member(_)) => Ok(v),
        Some(v) if !arg.require_membership => Ok(v),
        _ => Err(ArgError::UserNotFound(part.to_string())),
    }
}

/// Resolves a guild member from the directory, falling back to a fetch.
async fn lookup_member(data: &Data, user_id: Id) -> Option<bronze_core::Member> {
    let guild = data.guild.as_ref()?;
    if let Some(member) = guild.member(user_id) {
        return Some(member);
    }

    match data.platform.fetch_member(guild.id(), user_id).await {
        Ok(member) => Some(member),
        Err(e) => {
            debug!(user_id, guild_id = guild.id(), error = %e, "Member fetch failed");
            None
        }
    }
}

fn is_user_mention(part: &str) -> bool {
    part.starts_with("<@") && part.ends_with('>')
}

fn is_channel_mention(part: &str) -> bool {
    part.starts_with("<#") && part.ends_with('>')
}

/// Extracts the id from `<@id>` or `<@!id>`.
fn user_mention_id(part: &str) -> Option<Id> {
    let inner = part.strip_prefix("<@")?.strip_suffix('>')?;
    inner.strip_prefix('!').unwrap_or(inner).parse().ok()
}

/// Extracts the id from `<#id>`.
fn channel_mention_id(part: &str) -> Option<Id> {
    part.strip_prefix("<#")?.strip_suffix('>')?.parse().ok()
}
