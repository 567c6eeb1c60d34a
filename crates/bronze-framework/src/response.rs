//! Turning command results into messages.
//!
//! A command returns a [`Reply`] or an error. After the chain returns, the
//! system hands the result to its [`ResponseSender`]:
//!
//! | Result | [`StdResponseSender`] |
//! |--------|----------------------|
//! | `Ok(Reply::None)` | nothing is sent |
//! | `Ok(Reply::Text)` | sent in chunks of at most [`MESSAGE_LIMIT`] characters |
//! | `Ok(Reply::Embed(s))` | one message per embed |
//! | `Ok(Reply::Temporary)` | inner reply, deleted after the delay |
//! | `Err(user error)` | the error text, logged at debug |
//! | `Err(other)` | logged at error; a notice is sent if `send_errors` |

use std::time::Duration;

use async_trait::async_trait;
use bronze_core::{BoxedPlatform, Embed, Id, PlatformResult, SentMessage};
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, error, warn};

use crate::command::CommandResult;
use crate::data::Data;
use crate::error::{DispatchError, DispatchResult, is_user_error};

/// Maximum length of one text message, in characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// What a command wants to send back.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Reply {
    #[default]
    None,
    Text(String),
    Embed(Embed),
    Embeds(Vec<Embed>),
    /// Sends `reply`, then deletes the sent messages after `after`.
    Temporary { reply: Box<Reply>, after: Duration },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Makes this reply delete itself after `after`.
    pub fn temporary(self, after: Duration) -> Self {
        Self::Temporary {
            reply: Box::new(self),
            after,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Reply::None)
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::None
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<Embed> for Reply {
    fn from(embed: Embed) -> Self {
        Reply::Embed(embed)
    }
}

impl From<Vec<Embed>> for Reply {
    fn from(embeds: Vec<Embed>) -> Self {
        Reply::Embeds(embeds)
    }
}

/// Sends `reply` to `channel_id`, returning every message sent.
///
/// Text is split with [`split_message`] and, if `escape_everyone` is set,
/// passed through [`escape_everyone_mention`] first.
pub fn send_reply(
    platform: BoxedPlatform,
    channel_id: Id,
    reply: Reply,
    escape_everyone: bool,
) -> BoxFuture<'static, PlatformResult<Vec<SentMessage>>> {
    async move {
        let mut sent = Vec::new();
        match reply {
            Reply::None => {}
            Reply::Text(text) => {
                let text = if escape_everyone {
                    escape_everyone_mention(&text)
                } else {
                    text
                };
                for chunk in split_message(&text, MESSAGE_LIMIT) {
                    sent.push(platform.send_message(channel_id, &chunk).await?);
                }
            }
            Reply::Embed(embed) => {
                sent.push(platform.send_embed(channel_id, &embed).await?);
            }
            Reply::Embeds(embeds) => {
                for embed in &embeds {
                    sent.push(platform.send_embed(channel_id, embed).await?);
                }
            }
            Reply::Temporary { reply, after } => {
                sent = send_reply(platform.clone(), channel_id, *reply, escape_everyone).await?;
                let ids: Vec<Id> = sent.iter().map(|m| m.id).collect();
                if !ids.is_empty() {
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        if let Err(e) = platform.delete_messages(channel_id, &ids).await {
                            warn!(channel_id, error = %e, "Failed to delete temporary response");
                        }
                    });
                }
            }
        }
        Ok(sent)
    }
    .boxed()
}

/// Splits `text` into chunks of at most `limit` characters.
///
/// Cuts prefer the last newline inside the window, then the last whitespace;
/// the separator at a cut is dropped. Words longer than `limit` are cut hard.
/// A `limit` of zero is treated as one.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        let end = rest
            .char_indices()
            .nth(limit)
            .map_or(rest.len(), |(i, _)| i);
        let window = &rest[..end];

        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(char::is_whitespace))
            .filter(|&i| i > 0);

        match cut {
            Some(i) => {
                chunks.push(window[..i].to_string());
                let sep_len = rest[i..].chars().next().map_or(1, char::len_utf8);
                rest = &rest[i + sep_len..];
            }
            None => {
                chunks.push(window.to_string());
                rest = &rest[end..];
            }
        }
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

/// Defuses `@everyone` and `@here` by inserting a zero-width space.
pub fn escape_everyone_mention(text: &str) -> String {
    text.replace("@everyone", "@\u{200B}everyone")
        .replace("@here", "@\u{200B}here")
}

/// Delivers the outcome of a command invocation.
#[async_trait]
pub trait ResponseSender: Send + Sync + 'static {
    async fn send_response(&self, data: &Data, result: CommandResult) -> DispatchResult<()>;
}

/// The default [`ResponseSender`].
#[derive(Debug, Clone, Copy)]
pub struct StdResponseSender {
    /// Tell the user when a command failed with a non-user error.
    pub send_errors: bool,
    /// Escape `@everyone`/`@here` in error text.
    pub escape_everyone: bool,
}

impl Default for StdResponseSender {
    fn default() -> Self {
        Self {
            send_errors: true,
            escape_everyone: true,
        }
    }
}

#[async_trait]
impl ResponseSender for StdResponseSender {
    async fn send_response(&self, data: &Data, result: CommandResult) -> DispatchResult<()> {
        let command = data.command_name();

        let (reply, escape) = match result {
            Ok(reply) => (reply, false),
            Err(e) if is_user_error(e.as_ref()) => {
                debug!(command = %command, error = %e, "Command returned a user error");
                (Reply::Text(e.to_string()), self.escape_everyone)
            }
            Err(e) => {
                error!(command = %command, error = %e, "Command returned an error");
                if !self.send_errors {
                    return Ok(());
                }
                let notice = format!("{command:?} command returned an error: {e}");
                (Reply::Text(notice), self.escape_everyone)
            }
        };

        if reply.is_none() {
            return Ok(());
        }

        send_reply(data.platform.clone(), data.channel_id(), reply, escape)
            .await
            .map(|_| ())
            .map_err(DispatchError::Send)
    }
}
