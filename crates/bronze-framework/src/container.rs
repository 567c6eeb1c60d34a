//! The routing tree.
//!
//! Commands are registered on a [`ContainerBuilder`]. Containers nest: a
//! sub-container is just another named entry whose remaining text is routed
//! one level further down.
//!
//! ```text
//! root ──┬── ping
//!        ├── echo / say
//!        └── settings ──┬── show
//!                       └── set
//! ```
//!
//! Registration is a two-phase lifecycle. While building, commands, hooks and
//! sub-containers are added freely. [`ContainerBuilder::seal`] then freezes
//! the tree into [`Container`]s and composes the full hook chain of every
//! command once, so routing a message at runtime is a read-only walk:
//!
//! ```rust,ignore
//! let root = ContainerBuilder::standard()
//!     .hook(Hook::around(log_timing))
//!     .command(handler(ping), "ping")
//!     .command(handler(echo), Trigger::new("echo").alias("say"))
//!     .sub("settings", |sub| {
//!         sub.description("Server settings")
//!             .command(handler(show), "show")
//!             .command(handler(set), Trigger::new("set").disable_in_dm(true))
//!     })
//!     .seal();
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use tower::ServiceExt;
use tracing::debug;

use crate::command::{Command, CommandResult};
use crate::data::{Data, TriggerSource};
use crate::hook::{Hook, RunService, wrap_all};
use crate::parse::{ArgParserLayer, ArgSpec};
use crate::response::Reply;
use crate::trigger::Trigger;

/// Behaviour flags of a container, inherited by sub-containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Ignore messages authored by bots.
    pub ignore_bots: bool,
    /// Route messages from private channels.
    pub run_in_dm: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            ignore_bots: true,
            run_in_dm: true,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

enum Entry {
    Command(Arc<dyn Command>, Trigger),
    Container(ContainerBuilder, Trigger),
}

/// A container under construction.
pub struct ContainerBuilder {
    description: String,
    long_description: String,
    options: ContainerOptions,
    entries: Vec<Entry>,
    hooks: Vec<Hook>,
    default_mention: Option<Arc<dyn Command>>,
    not_found: Option<Arc<dyn Command>>,
    dm_not_found: Option<Arc<dyn Command>>,
}

impl ContainerBuilder {
    /// An empty root container with default options and no hooks.
    pub fn root() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// A root container with argument parsing installed as its first hook.
    pub fn standard() -> Self {
        Self::root().hook(Hook::layer(ArgParserLayer))
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            description: String::new(),
            long_description: String::new(),
            options,
            entries: Vec::new(),
            hooks: Vec::new(),
            default_mention: None,
            not_found: None,
            dm_not_found: None,
        }
    }

    /// A child inheriting this container's options and default handlers.
    fn child(&self) -> Self {
        Self {
            default_mention: self.default_mention.clone(),
            not_found: self.not_found.clone(),
            dm_not_found: self.dm_not_found.clone(),
            ..Self::with_options(self.options)
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn long_description(mut self, long_description: impl Into<String>) -> Self {
        self.long_description = long_description.into();
        self
    }

    pub fn ignore_bots(mut self, ignore: bool) -> Self {
        self.options.ignore_bots = ignore;
        self
    }

    pub fn run_in_dm(mut self, run: bool) -> Self {
        self.options.run_in_dm = run;
        self
    }

    /// Registers a command.
    pub fn command(self, cmd: impl Command, trigger: impl Into<Trigger>) -> Self {
        self.command_arc(Arc::new(cmd), trigger)
    }

    /// Registers a shared command.
    pub fn command_arc(mut self, cmd: Arc<dyn Command>, trigger: impl Into<Trigger>) -> Self {
        self.entries.push(Entry::Command(cmd, trigger.into()));
        self
    }

    /// Adds a sub-container built by `build`.
    ///
    /// The child starts with this container's options and default handlers,
    /// but no commands and no hooks of its own. Hooks on `trigger` wrap every
    /// command below the child, outside of the child's own hooks.
    pub fn sub<F>(mut self, trigger: impl Into<Trigger>, build: F) -> Self
    where
        F: FnOnce(ContainerBuilder) -> ContainerBuilder,
    {
        let child = build(self.child());
        self.entries.push(Entry::Container(child, trigger.into()));
        self
    }

    /// Adds an independently built sub-container.
    pub fn container(mut self, child: ContainerBuilder, trigger: impl Into<Trigger>) -> Self {
        self.entries.push(Entry::Container(child, trigger.into()));
        self
    }

    /// Adds a hook wrapping every command in this container and below.
    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn hooks(mut self, hooks: impl IntoIterator<Item = Hook>) -> Self {
        self.hooks.extend(hooks);
        self
    }

    /// Runs when the bot is mentioned with nothing after the mention.
    pub fn default_mention(mut self, cmd: impl Command) -> Self {
        self.default_mention = Some(Arc::new(cmd));
        self
    }

    /// Runs when no command matched a prefix or mention invocation.
    pub fn not_found(mut self, cmd: impl Command) -> Self {
        self.not_found = Some(Arc::new(cmd));
        self
    }

    /// Runs when no command matched in a private channel.
    pub fn dm_not_found(mut self, cmd: impl Command) -> Self {
        self.dm_not_found = Some(Arc::new(cmd));
        self
    }

    /// Freezes the tree and builds every command's hook chain.
    pub fn seal(self) -> Arc<Container> {
        self.seal_under(Trigger::default(), Weak::new(), &[])
    }

    fn seal_under(self, trigger: Trigger, parent: Weak<Container>, outer: &[Hook]) -> Arc<Container> {
        let mut hooks = outer.to_vec();
        hooks.extend(trigger.hooks.iter().cloned());
        hooks.extend(self.hooks);

        let default_handler = |cmd: Option<Arc<dyn Command>>| {
            cmd.map(|cmd| Arc::new(RegisteredCommand::leaf(cmd, Trigger::default(), &hooks)))
        };
        let default_mention = default_handler(self.default_mention);
        let not_found = default_handler(self.not_found);
        let dm_not_found = default_handler(self.dm_not_found);

        Arc::new_cyclic(|this: &Weak<Container>| {
            let commands = self
                .entries
                .into_iter()
                .map(|entry| match entry {
                    Entry::Command(cmd, trigger) => {
                        Arc::new(RegisteredCommand::leaf(cmd, trigger, &hooks))
                    }
                    Entry::Container(child, trigger) => {
                        let sub = child.seal_under(trigger.clone(), this.clone(), &hooks);
                        Arc::new(RegisteredCommand {
                            node: CommandNode::Container(sub),
                            trigger,
                            args: ArgSpec::default(),
                            chain: None,
                        })
                    }
                })
                .collect();

            Container {
                names: trigger.names,
                description: self.description,
                long_description: self.long_description,
                options: self.options,
                commands,
                default_mention,
                not_found,
                dm_not_found,
                parent,
            }
        })
    }
}

// ============================================================================
// Sealed tree
// ============================================================================

/// What a registered name points at.
#[derive(Clone)]
pub enum CommandNode {
    Leaf(Arc<dyn Command>),
    Container(Arc<Container>),
}

/// A command or sub-container registered under a [`Trigger`].
pub struct RegisteredCommand {
    pub node: CommandNode,
    pub trigger: Trigger,
    /// Arguments declared by the command, empty for containers.
    pub args: ArgSpec,
    /// The composed hook chain, for leaf commands.
    chain: Option<RunService>,
}

impl RegisteredCommand {
    fn leaf(cmd: Arc<dyn Command>, trigger: Trigger, container_hooks: &[Hook]) -> Self {
        let handler = Arc::clone(&cmd);
        let svc = RunService::new(tower::service_fn(move |data: Data| {
            let handler = Arc::clone(&handler);
            async move { handler.run(data).await }
        }));
        let chain = wrap_all(container_hooks, wrap_all(&trigger.hooks, svc));

        Self {
            args: cmd.arg_spec(),
            node: CommandNode::Leaf(cmd),
            trigger,
            chain: Some(chain),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.trigger.names
    }

    pub fn format_names(&self, aliases: bool, sep: &str) -> String {
        self.trigger.format_names(aliases, sep)
    }

    pub fn description(&self) -> &str {
        match &self.node {
            CommandNode::Leaf(cmd) => cmd.description(),
            CommandNode::Container(c) => &c.description,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.node, CommandNode::Container(_))
    }

    /// The full service chain, hooks included.
    pub fn chain(&self) -> Option<&RunService> {
        self.chain.as_ref()
    }
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("names", &self.trigger.names)
            .field("container", &self.is_container())
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// A sealed node of the routing tree.
pub struct Container {
    names: Vec<String>,
    description: String,
    long_description: String,
    options: ContainerOptions,
    commands: Vec<Arc<RegisteredCommand>>,
    default_mention: Option<Arc<RegisteredCommand>>,
    not_found: Option<Arc<RegisteredCommand>>,
    dm_not_found: Option<Arc<RegisteredCommand>>,
    parent: Weak<Container>,
}

impl Container {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    pub fn options(&self) -> ContainerOptions {
        self.options
    }

    /// Registered entries, in registration order.
    pub fn commands(&self) -> &[Arc<RegisteredCommand>] {
        &self.commands
    }

    pub fn parent(&self) -> Option<Arc<Container>> {
        self.parent.upgrade()
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Space separated path from the root; with `aliases`, every name of a
    /// level is listed, joined by `/`.
    pub fn full_name(&self, aliases: bool) -> String {
        let mut name = self.parent().map(|p| p.full_name(aliases)).unwrap_or_default();
        if self.names.is_empty() {
            return name;
        }

        if !name.is_empty() {
            name.push(' ');
        }
        if aliases {
            name.push_str(&self.names.join("/"));
        } else {
            name.push_str(&self.names[0]);
        }
        name
    }

    /// Matches the first word of `search` against the registered names.
    ///
    /// Returns the entry and the text after the matched name, trimmed.
    pub fn find_command(&self, search: &str) -> Option<(Arc<RegisteredCommand>, String)> {
        let first = search.split_once(' ').map_or(search, |(first, _)| first);
        let wanted = first.to_lowercase();

        self.commands
            .iter()
            .find(|cmd| cmd.trigger.names.iter().any(|n| n.to_lowercase() == wanted))
            .map(|cmd| (Arc::clone(cmd), search[first.len()..].trim().to_string()))
    }

    /// Looks up the command at a space separated `path`, without running it.
    ///
    /// Returns the entry together with the container holding it.
    pub fn resolve(self: &Arc<Self>, path: &str) -> Option<(Arc<RegisteredCommand>, Arc<Container>)> {
        let mut container = Arc::clone(self);
        let mut search = path.trim().to_string();

        loop {
            let (cmd, rest) = container.find_command(&search)?;
            match &cmd.node {
                CommandNode::Container(sub) if !rest.is_empty() => {
                    container = Arc::clone(sub);
                    search = rest;
                }
                _ => return Some((cmd, container)),
            }
        }
    }

    fn should_ignore(&self, data: &Data) -> bool {
        (self.options.ignore_bots && data.msg.author.bot)
            || (data.source == TriggerSource::Dm && !self.options.run_in_dm)
    }

    fn default_handler(&self, data: &Data) -> Option<&Arc<RegisteredCommand>> {
        match data.source {
            TriggerSource::Mention if data.stripped.is_empty() && self.default_mention.is_some() => {
                self.default_mention.as_ref()
            }
            TriggerSource::Mention | TriggerSource::Prefix => self.not_found.as_ref(),
            TriggerSource::Dm => self.dm_not_found.as_ref().or(self.not_found.as_ref()),
        }
    }

    /// Routes `data` down the tree.
    ///
    /// On success `data.cmd`, `data.stripped` and `data.container_chain`
    /// describe the match, and the returned service is the command's full
    /// chain. `None` means the message is silently ignored.
    pub fn route(self: &Arc<Self>, data: &mut Data) -> Option<RunService> {
        let mut container = Arc::clone(self);

        loop {
            if container.should_ignore(data) {
                return None;
            }
            data.container_chain.push(Arc::clone(&container));

            let Some((cmd, rest)) = container.find_command(&data.stripped) else {
                let handler = container.default_handler(data)?;
                data.cmd = Some(Arc::clone(handler));
                return handler.chain.clone();
            };

            data.stripped = rest;
            data.cmd = Some(Arc::clone(&cmd));

            match &cmd.node {
                CommandNode::Container(sub) => container = Arc::clone(sub),
                CommandNode::Leaf(_) => {
                    if !cmd.trigger.enabled_for(data.source) {
                        debug!(
                            command = %cmd.format_names(false, "/"),
                            source = ?data.source,
                            "Command disabled for this source"
                        );
                        return None;
                    }
                    return cmd.chain.clone();
                }
            }
        }
    }

    /// Routes and runs `data`. An ignored message yields [`Reply::None`].
    pub async fn run(self: &Arc<Self>, mut data: Data) -> CommandResult {
        match self.route(&mut data) {
            Some(chain) => chain.oneshot(data).await,
            None => Ok(Reply::None),
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("names", &self.names)
            .field("options", &self.options)
            .field("commands", &self.commands.len())
            .finish_non_exhaustive()
    }
}
