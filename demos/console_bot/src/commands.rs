//! The demo's command tree.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bronze::core::{Embed, Id};
use bronze::framework::{CommandNode, RegisteredCommand};
use bronze::prelude::*;
use parking_lot::RwLock;
use tracing::debug;

// ============================================================================
// Per-guild prefixes
// ============================================================================

/// A configured default prefix that guilds may override at runtime.
#[derive(Clone)]
pub struct GuildPrefixes {
    default: String,
    custom: Arc<RwLock<HashMap<Id, String>>>,
}

impl GuildPrefixes {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            custom: Arc::default(),
        }
    }

    pub fn get(&self, guild_id: Option<Id>) -> String {
        guild_id
            .and_then(|id| self.custom.read().get(&id).cloned())
            .unwrap_or_else(|| self.default.clone())
    }

    fn set(&self, guild_id: Id, prefix: String) {
        self.custom.write().insert(guild_id, prefix);
    }
}

#[async_trait]
impl PrefixProvider for GuildPrefixes {
    async fn prefix(&self, data: &Data) -> String {
        self.get(data.guild_id())
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn ping(_data: Data) -> CommandResult {
    Ok("Pong!".into())
}

async fn echo(data: Data) -> CommandResult {
    Ok(data.arg(0).str().into())
}

async fn add(data: Data) -> CommandResult {
    let sum = data.arg(0).int64().checked_add(data.arg(1).int64());
    match sum {
        Some(sum) => Ok(sum.to_string().into()),
        None => Err(UserError::new("That number is too big for me").into()),
    }
}

async fn repeat(data: Data) -> CommandResult {
    let times = data.switch("n").map_or(1, ParsedArg::int64);
    let upper = data.switch("upper").is_some_and(ParsedArg::bool);

    let text = data.arg(0).str();
    let text = if upper { text.to_uppercase() } else { text.to_string() };
    let times = usize::try_from(times).unwrap_or(1);
    Ok(vec![text; times].join("\n").into())
}

async fn give(data: Data) -> CommandResult {
    let Some(user) = data.arg(0).user() else {
        return Err(UserError::new("Who should get them?").into());
    };
    Ok(format!("Gave {} coins to {}", data.arg(1).int64(), user.username).into())
}

async fn whois(data: Data) -> CommandResult {
    let arg = data.arg(0);
    let Some(user) = arg.user() else {
        return Ok(Reply::None);
    };

    let mut embed = Embed::new(user.username.clone())
        .color(0xCD7F32)
        .field("ID", user.id.to_string())
        .field("Mention", user.mention())
        .field("Bot", user.bot.to_string());
    match arg.member() {
        Some(member) => embed = embed.field("Display name", member.display_name()),
        None => embed = embed.footer("Not a member of this server"),
    }
    Ok(embed.into())
}

async fn flash(data: Data) -> CommandResult {
    Ok(Reply::text(data.arg(0).str()).temporary(Duration::from_secs(5)))
}

async fn help(data: Data) -> CommandResult {
    let Some(root) = data.root().cloned() else {
        return Ok(Reply::None);
    };

    let path = data.arg(0).str();
    if path.is_empty() {
        return Ok(list_commands(Embed::new("Commands"), root.commands()).into());
    }

    let Some((cmd, holder)) = root.resolve(path) else {
        return Err(UserError::new(format!("There is no `{path}` command")).into());
    };

    let title = format!("{} {}", holder.full_name(false), cmd.format_names(false, "/"));
    let mut embed = Embed::new(title.trim()).description(cmd.description());
    if cmd.trigger.names.len() > 1 {
        embed = embed.field("Aliases", cmd.trigger.names[1..].join(", "));
    }

    match &cmd.node {
        CommandNode::Container(sub) => embed = list_commands(embed, sub.commands()),
        CommandNode::Leaf(_) => {
            for (i, def) in cmd.args.defs.iter().enumerate() {
                let name = if i < cmd.args.required {
                    format!("<{}>", def.name)
                } else {
                    format!("[{}]", def.name)
                };
                embed = embed.field(name, format!("{} {}", def.type_name(), def.help).trim());
            }
            for def in &cmd.args.switches {
                let about = format!("{} {}", def.type_name(), def.help);
                embed = embed.field(format!("-{}", def.switch_name().unwrap_or_default()), about.trim());
            }
        }
    }
    Ok(embed.into())
}

fn list_commands(mut embed: Embed, commands: &[Arc<RegisteredCommand>]) -> Embed {
    for cmd in commands.iter().filter(|c| !c.trigger.hide_from_help) {
        let description = match cmd.description() {
            "" => "-",
            d => d,
        };
        embed = embed.field(cmd.format_names(true, "/"), description);
    }
    embed
}

// ============================================================================
// Tree
// ============================================================================

/// Logs how long each command took.
fn timing() -> Hook {
    Hook::around(|data: Data, next: RunService| async move {
        let command = data.command_name();
        let started = Instant::now();
        let result = next.oneshot(data).await;
        debug!(command = %command, elapsed = ?started.elapsed(), ok = result.is_ok(), "Command finished");
        result
    })
}

pub fn build(prefixes: GuildPrefixes) -> ContainerBuilder {
    let show_prefixes = prefixes.clone();
    let show = handler(move |data: Data| {
        let prefixes = show_prefixes.clone();
        async move { Ok(format!("Prefix here is `{}`", prefixes.get(data.guild_id())).into()) }
    })
    .description("Shows this server's prefix");

    let set_prefix = handler(move |data: Data| {
        let prefixes = prefixes.clone();
        async move {
            let Some(guild_id) = data.guild_id() else {
                return Ok(Reply::None);
            };
            let prefix = data.arg(0).str().to_string();
            prefixes.set(guild_id, prefix.clone());
            Ok(format!("Prefix is now `{prefix}`").into())
        }
    })
    .description("Changes this server's prefix")
    .args(ArgSpec::new().arg(ArgDef::new("prefix", ArgType::STRING)).required(1));

    ContainerBuilder::standard()
        .hook(timing())
        .default_mention(handler(|_data: Data| async move {
            Ok("Hi! Try `help` to see what I can do.".into())
        }))
        .not_found(handler(|data: Data| async move {
            Ok(format!("I don't know `{}`. Try `help`.", data.stripped).into())
        }))
        .command(
            handler(help)
                .description("Lists commands, or describes one")
                .args(ArgSpec::new().arg(ArgDef::new("command", ArgType::STRING))),
            Trigger::new("help").alias("h"),
        )
        .command(handler(ping).description("Checks that I'm alive"), "ping")
        .command(
            handler(echo)
                .description("Says something back")
                .args(ArgSpec::new().arg(ArgDef::new("text", ArgType::STRING)).required(1)),
            Trigger::new("echo").alias("say"),
        )
        .command(
            handler(add).description("Adds two whole numbers").args(
                ArgSpec::new()
                    .arg(ArgDef::new("a", ArgType::INT))
                    .arg(ArgDef::new("b", ArgType::INT))
                    .required(2),
            ),
            "add",
        )
        .command(
            handler(repeat).description("Repeats text").args(
                ArgSpec::new()
                    .arg(ArgDef::new("text", ArgType::STRING))
                    .required(1)
                    .switch(
                        ArgDef::new("times", ArgType::int_range(1, 5))
                            .switch("n")
                            .default_value(1i64)
                            .help("how often, 1 to 5"),
                    )
                    .switch(ArgDef::flag("upper").help("shout it")),
            ),
            "repeat",
        )
        .command(
            handler(give).description("Gives someone coins").args(
                ArgSpec::new()
                    .arg(ArgDef::new("user", ArgType::ADV_USER))
                    .arg(ArgDef::new("amount", ArgType::int_range(1, 1000)))
                    .required(2)
                    .combo([0, 1])
                    .combo([1, 0]),
            ),
            Trigger::new("give").disable_in_dm(true),
        )
        .command(
            handler(whois)
                .description("Shows who someone is")
                .args(ArgSpec::new().arg(ArgDef::new("user", ArgType::ADV_USER)).required(1)),
            Trigger::new("whois").alias("who").disable_in_dm(true),
        )
        .command(
            handler(flash)
                .description("Says something for five seconds")
                .args(ArgSpec::new().arg(ArgDef::new("text", ArgType::STRING)).required(1)),
            Trigger::new("flash").hide_from_help(true),
        )
        .sub(Trigger::new("settings").alias("set"), |settings| {
            settings
                .description("Server settings")
                .hook(Hook::require(
                    |data| data.guild.is_some(),
                    "Settings only exist inside a server",
                ))
                .command(show, "show")
                .command(set_prefix, "prefix")
        })
}
