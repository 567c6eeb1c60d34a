//! The per-message entry point.
//!
//! [`System`] ties the pieces together. For every incoming message it:
//!
//! 1. establishes the context (channel, guild, author's member profile),
//! 2. decides how the message invokes a command, if at all,
//! 3. routes the remaining text through the container tree,
//! 4. runs the matched command's hook chain,
//! 5. hands the result to the [`ResponseSender`].
//!
//! ```text
//!            ┌──────────────┐   private channel   ┌───────────────┐
//! message ──▶│  find_prefix │──── <@bot> ────────▶│ root.route()  │──▶ chain ──▶ sender
//!            └──────────────┘     prefix          └───────────────┘
//!                   │ none
//!                   ▼
//!                ignored
//! ```
//!
//! Panics inside a command are caught at [`System::handle_message`] and
//! logged; they never reach the caller.

use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use bronze_core::{BoxedPlatform, Message};
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tracing::{Instrument, Level, debug, error, span};

use crate::container::Container;
use crate::data::{Data, TriggerSource};
use crate::error::{DispatchError, DispatchResult};
use crate::response::{ResponseSender, StdResponseSender};

// ============================================================================
// Prefix providers
// ============================================================================

/// Supplies the command prefix for a message, possibly per guild.
///
/// An empty prefix never matches.
#[async_trait]
pub trait PrefixProvider: Send + Sync + 'static {
    async fn prefix(&self, data: &Data) -> String;
}

/// The same prefix everywhere.
#[derive(Debug, Clone, Default)]
pub struct SimplePrefixProvider {
    prefix: String,
}

impl SimplePrefixProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl PrefixProvider for SimplePrefixProvider {
    async fn prefix(&self, _data: &Data) -> String {
        self.prefix.clone()
    }
}

// ============================================================================
// System
// ============================================================================

/// Dispatches incoming messages to a sealed container tree.
#[derive(Clone)]
pub struct System {
    root: Arc<Container>,
    prefix: Option<Arc<dyn PrefixProvider>>,
    response_sender: Arc<dyn ResponseSender>,
    shutdown: CancellationToken,
}

impl System {
    /// A system without prefix, answering only to mentions and private
    /// messages.
    pub fn new(root: Arc<Container>) -> Self {
        Self {
            root,
            prefix: None,
            response_sender: Arc::new(StdResponseSender::default()),
            shutdown: CancellationToken::new(),
        }
    }

    /// A system using a static prefix and the standard response sender.
    pub fn standard(root: Arc<Container>, prefix: impl Into<String>) -> Self {
        Self::new(root).with_prefix(SimplePrefixProvider::new(prefix))
    }

    pub fn with_prefix(mut self, provider: impl PrefixProvider) -> Self {
        self.prefix = Some(Arc::new(provider));
        self
    }

    pub fn with_response_sender(mut self, sender: impl ResponseSender) -> Self {
        self.response_sender = Arc::new(sender);
        self
    }

    /// Uses `token` as the parent of every invocation's cancellation token.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn root(&self) -> &Arc<Container> {
        &self.root
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Handles one incoming message end to end.
    ///
    /// Errors and panics are logged and swallowed, so this can be spawned
    /// directly as a task.
    pub async fn handle_message(&self, platform: BoxedPlatform, msg: Arc<Message>) {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            message_id = msg.id,
            channel_id = msg.channel_id,
            author = msg.author.id
        );

        let outcome = AssertUnwindSafe(self.check_message(platform, msg))
            .catch_unwind()
            .instrument(span)
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "Failed to handle message"),
            Err(payload) => error!(
                panic = %panic_message(payload.as_ref()),
                backtrace = %Backtrace::force_capture(),
                "Recovered from panic while handling message"
            ),
        }
    }

    /// Runs the pipeline for one message, returning dispatch errors.
    pub async fn check_message(&self, platform: BoxedPlatform, msg: Arc<Message>) -> DispatchResult<()> {
        let mut data = self.fill_data(platform, msg).await?;

        if !self.find_prefix(&mut data).await {
            return Ok(());
        }

        let Some(chain) = self.root.route(&mut data) else {
            return Ok(());
        };

        debug!(command = %data.command_name(), source = ?data.source, "Running command");
        let result = chain.oneshot(data.clone()).await;
        self.response_sender.send_response(&data, result).await
    }

    /// Builds the invocation context for `msg`.
    ///
    /// Guild messages need the author's member profile; it is taken from the
    /// message, the guild directory, or fetched, in that order.
    pub async fn fill_data(&self, platform: BoxedPlatform, msg: Arc<Message>) -> DispatchResult<Data> {
        let channel = platform
            .channel(msg.channel_id)
            .await
            .map_err(DispatchError::Context)?;

        let mut data = Data::new(Arc::clone(&platform), Arc::clone(&msg), channel);
        data.cancel = self.shutdown.child_token();

        let Some(guild_id) = data.guild_id() else {
            return Ok(data);
        };

        let guild = platform.guild(guild_id).await.map_err(DispatchError::Context)?;

        let member = match msg.member.clone().or_else(|| guild.member(msg.author.id)) {
            Some(member) => member,
            None => platform
                .fetch_member(guild_id, msg.author.id)
                .await
                .map_err(|e| {
                    debug!(error = %e, "Member lookup failed");
                    DispatchError::MissingMember {
                        guild: guild_id,
                        user: msg.author.id,
                    }
                })?,
        };

        data.guild = Some(guild);
        data.member = Some(member);
        Ok(data)
    }

    /// Classifies how `data.msg` invokes a command and strips the trigger.
    ///
    /// Returns `false` if the message is not an invocation at all.
    pub async fn find_prefix(&self, data: &mut Data) -> bool {
        if data.channel.is_private() {
            data.source = TriggerSource::Dm;
            data.stripped = data.msg.content.clone();
            return true;
        }

        if self.find_mention_prefix(data) {
            return true;
        }

        let Some(provider) = &self.prefix else {
            return false;
        };
        let prefix = provider.prefix(data).await;
        if prefix.is_empty() {
            return false;
        }

        match data.msg.content.strip_prefix(prefix.as_str()) {
            Some(rest) => {
                data.stripped = rest.trim().to_string();
                data.source = TriggerSource::Prefix;
                data.prefix_used = prefix;
                true
            }
            None => false,
        }
    }

    /// Checks for a leading `<@id>` or `<@!id>` mention of the bot.
    pub fn find_mention_prefix(&self, data: &mut Data) -> bool {
        let Some(bot) = data.platform.current_user() else {
            return false;
        };

        let content = data.msg.content.as_str();
        let matched = [format!("<@{}>", bot.id), format!("<@!{}>", bot.id)]
            .into_iter()
            .find(|mention| content.starts_with(mention.as_str()));

        let Some(mention) = matched else {
            return false;
        };

        data.stripped = content[mention.len()..].trim().to_string();
        data.source = TriggerSource::Mention;
        data.prefix_used = mention;
        true
    }
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("root", &self.root)
            .field("has_prefix", &self.prefix.is_some())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handler;
    use crate::container::ContainerBuilder;
    use crate::response::Reply;
    use crate::test_support::{AUTHOR_ID, GUILD_CHANNEL, MockPlatform, author, dm_message, guild_message};
    use crate::command::CommandResult;
    use bronze_core::Platform;

    async fn explode(_data: Data) -> CommandResult {
        panic!("boom")
    }

    fn system() -> System {
        let root = ContainerBuilder::standard()
            .command(
                handler(|data: Data| async move { Ok(Reply::text(format!("pong {}", data.stripped))) }),
                "ping",
            )
            .command(handler(explode), "explode")
            .seal();
        System::standard(root, "!")
    }

    async fn prefix_of(system: &System, platform: Arc<MockPlatform>, msg: Message) -> Option<Data> {
        let channel = platform.channel(msg.channel_id).await.unwrap();
        let mut data = Data::new(platform, Arc::new(msg), channel);
        system.find_prefix(&mut data).await.then_some(data)
    }

    #[tokio::test]
    async fn test_mention_prefix() {
        let system = system();
        let platform = MockPlatform::new();

        let data = prefix_of(&system, platform.clone(), guild_message("<@12345>cmd"))
            .await
            .unwrap();
        assert_eq!(data.source, TriggerSource::Mention);
        assert_eq!(data.stripped, "cmd");
        assert_eq!(data.prefix_used, "<@12345>");

        let data = prefix_of(&system, platform.clone(), guild_message("<@!12345>   ping  x "))
            .await
            .unwrap();
        assert_eq!(data.source, TriggerSource::Mention);
        assert_eq!(data.stripped, "ping  x");
    }

    #[tokio::test]
    async fn test_malformed_mention_is_not_a_trigger() {
        let system = system();
        let platform = MockPlatform::new();

        assert!(prefix_of(&system, platform.clone(), guild_message("<@12345 cmd")).await.is_none());
        assert!(prefix_of(&system, platform.clone(), guild_message(" <@12345> cmd")).await.is_none());
        assert!(prefix_of(&system, platform, guild_message("hey <@12345>")).await.is_none());
    }

    #[tokio::test]
    async fn test_dm_uses_whole_content() {
        let system = system();
        let data = prefix_of(&system, MockPlatform::new(), dm_message("  ping  "))
            .await
            .unwrap();
        assert_eq!(data.source, TriggerSource::Dm);
        assert_eq!(data.stripped, "  ping  ");
    }

    #[tokio::test]
    async fn test_text_prefix() {
        let system = system();
        let platform = MockPlatform::new();

        let data = prefix_of(&system, platform.clone(), guild_message("!  ping"))
            .await
            .unwrap();
        assert_eq!(data.source, TriggerSource::Prefix);
        assert_eq!(data.stripped, "ping");
        assert_eq!(data.prefix_used, "!");

        assert!(prefix_of(&system, platform.clone(), guild_message("ping")).await.is_none());

        let no_prefix = System::standard(system.root().clone(), "");
        assert!(prefix_of(&no_prefix, platform, guild_message("ping")).await.is_none());
    }

    #[tokio::test]
    async fn test_end_to_end_reply() {
        let system = system();
        let platform = MockPlatform::new();

        system
            .check_message(platform.clone(), Arc::new(guild_message("!ping a")))
            .await
            .unwrap();
        system
            .check_message(platform.clone(), Arc::new(guild_message("ignored")))
            .await
            .unwrap();
        assert_eq!(platform.sent_texts(), vec!["pong a"]);
    }

    #[tokio::test]
    async fn test_fill_data_looks_up_member() {
        let system = system();
        let platform = MockPlatform::new();

        // The author is not in the guild directory and carries no profile.
        let msg = Message::new(5, GUILD_CHANNEL, author(), "!ping");
        let err = system.fill_data(platform.clone(), Arc::new(msg)).await.unwrap_err();
        assert!(matches!(err, DispatchError::MissingMember { user: AUTHOR_ID, .. }));

        let data = system
            .fill_data(platform.clone(), Arc::new(guild_message("!ping")))
            .await
            .unwrap();
        assert!(data.guild.is_some());
        assert_eq!(data.member.as_ref().map(|m| m.user.id), Some(AUTHOR_ID));

        let data = system
            .fill_data(platform, Arc::new(dm_message("ping")))
            .await
            .unwrap();
        assert!(data.guild.is_none());
        assert!(data.member.is_none());
    }

    #[tokio::test]
    async fn test_unknown_channel_aborts() {
        let system = system();
        let platform = MockPlatform::new();

        let msg = Message::new(6, 999, author(), "!ping");
        let err = system.check_message(platform.clone(), Arc::new(msg)).await.unwrap_err();
        assert!(matches!(err, DispatchError::Context(_)));
        assert!(platform.sent_texts().is_empty());
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let system = system();
        let platform = MockPlatform::new();

        system
            .handle_message(platform.clone(), Arc::new(guild_message("!explode")))
            .await;
        system
            .handle_message(platform.clone(), Arc::new(guild_message("!ping after")))
            .await;
        assert_eq!(platform.sent_texts(), vec!["pong after"]);
    }

    #[tokio::test]
    async fn test_invocations_inherit_shutdown() {
        let shutdown = CancellationToken::new();
        let system = system().with_shutdown(shutdown.clone());

        let data = system
            .fill_data(MockPlatform::new(), Arc::new(guild_message("!ping")))
            .await
            .unwrap();
        assert!(!data.cancel.is_cancelled());
        shutdown.cancel();
        assert!(data.cancel.is_cancelled());
    }
}
