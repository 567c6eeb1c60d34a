//! Per-invocation context.
//!
//! A [`Data`] is created for every incoming message and threaded through
//! trigger resolution, routing, argument binding and finally the command.
//! Routing consumes [`Data::stripped`] one name at a time and records every
//! container it passes in [`Data::container_chain`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use bronze_core::{BoxedPlatform, Channel, GuildState, Id, Member, Message};
use tokio_util::sync::CancellationToken;

use crate::arg::{ArgDef, ArgType, ParsedArg};
use crate::container::{Container, RegisteredCommand};

/// How a message invoked a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TriggerSource {
    /// Sent in a private channel; the whole content is command text.
    #[default]
    Dm,
    /// Started with a mention of the bot.
    Mention,
    /// Started with the configured prefix.
    Prefix,
}

/// The context of one command invocation.
#[derive(Clone)]
pub struct Data {
    /// The matched command, once routing found one.
    pub cmd: Option<Arc<RegisteredCommand>>,
    /// Positional arguments, index-aligned with the command's definitions.
    pub args: Vec<ParsedArg>,
    /// Switch bindings keyed by switch name.
    pub switches: HashMap<String, ParsedArg>,

    pub msg: Arc<Message>,
    pub channel: Channel,
    /// `None` for private channels.
    pub guild: Option<Arc<GuildState>>,
    /// The author's guild profile, for guild messages.
    pub member: Option<Member>,
    pub platform: BoxedPlatform,

    pub source: TriggerSource,
    /// The prefix or mention that triggered the command.
    pub prefix_used: String,
    /// Command text not consumed yet.
    pub stripped: String,
    /// Containers traversed while routing; the first one is the root.
    pub container_chain: Vec<Arc<Container>>,

    /// Cancelled when the host shuts down. Long-running commands should
    /// select on it.
    pub cancel: CancellationToken,
}

impl Data {
    pub fn new(platform: BoxedPlatform, msg: Arc<Message>, channel: Channel) -> Self {
        Self {
            cmd: None,
            args: Vec::new(),
            switches: HashMap::new(),
            msg,
            channel,
            guild: None,
            member: None,
            platform,
            source: TriggerSource::default(),
            prefix_used: String::new(),
            stripped: String::new(),
            container_chain: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Positional argument `index`; an absent binding when out of range.
    pub fn arg(&self, index: usize) -> &ParsedArg {
        self.args.get(index).unwrap_or(&*ABSENT)
    }

    pub fn switch(&self, name: &str) -> Option<&ParsedArg> {
        self.switches.get(name)
    }

    /// The root container, once routing has started.
    pub fn root(&self) -> Option<&Arc<Container>> {
        self.container_chain.first()
    }

    pub fn channel_id(&self) -> Id {
        self.channel.id
    }

    pub fn guild_id(&self) -> Option<Id> {
        self.channel.guild_id
    }

    /// Display name of the matched command, `"unknown"` before routing.
    pub fn command_name(&self) -> String {
        self.cmd
            .as_ref()
            .map(|c| c.format_names(false, "/"))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

static ABSENT: LazyLock<ParsedArg> =
    LazyLock::new(|| ParsedArg::from_default(Arc::new(ArgDef::new("", ArgType::STRING))));

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("cmd", &self.cmd.as_ref().map(|c| c.format_names(false, "/")))
            .field("message_id", &self.msg.id)
            .field("channel_id", &self.channel.id)
            .field("source", &self.source)
            .field("stripped", &self.stripped)
            .field("depth", &self.container_chain.len())
            .finish_non_exhaustive()
    }
}
