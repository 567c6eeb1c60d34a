//! Hooks: middleware around command execution.
//!
//! Every command runs as a tower service, [`RunService`], taking the
//! per-invocation [`Data`] and returning a [`Reply`]. A [`Hook`] wraps the
//! next service in the chain and returns a new one, so it can inspect or
//! modify `Data` before the call, skip the call entirely, or post-process the
//! result.
//!
//! Hooks can be written three ways:
//!
//! ```rust,ignore
//! // Any tower layer.
//! Hook::layer(ArgParserLayer);
//!
//! // An async closure receiving the next service.
//! Hook::around(|data, next| async move {
//!     let started = Instant::now();
//!     let result = next.oneshot(data).await;
//!     debug!(elapsed = ?started.elapsed(), "command finished");
//!     result
//! });
//!
//! // A guard that answers with a user error when the predicate fails.
//! Hook::require(|data| data.guild.is_some(), "This command only works in servers");
//! ```
//!
//! # Composition order
//!
//! For a command reached through containers `root → sub`, the chain is:
//!
//! ```text
//! root hooks ─▶ sub hooks ─▶ trigger hooks ─▶ handler
//! (outermost)                (innermost)
//! ```
//!
//! Within each list, hooks run in the order they were added.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tower::filter::{Filter, Predicate};
use tower::util::BoxCloneSyncService;
use tower::{BoxError, Layer, Service, service_fn};

use crate::command::CommandResult;
use crate::data::Data;
use crate::error::UserError;
use crate::response::Reply;

/// A type-erased, cloneable command service.
pub type RunService = BoxCloneSyncService<Data, Reply, BoxError>;

/// Wraps a [`RunService`] into another one.
#[derive(Clone)]
pub struct Hook(Arc<dyn Fn(RunService) -> RunService + Send + Sync>);

impl Hook {
    /// Creates a hook from a function that wraps the next service.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(RunService) -> RunService + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Creates a hook from a tower [`Layer`].
    pub fn layer<L>(layer: L) -> Self
    where
        L: Layer<RunService> + Send + Sync + 'static,
        L::Service: Service<Data, Response = Reply, Error = BoxError> + Clone + Send + Sync + 'static,
        <L::Service as Service<Data>>::Future: Send + 'static,
    {
        Self::new(move |next| BoxCloneSyncService::new(layer.layer(next)))
    }

    /// Creates a hook from an async function receiving the data and the next
    /// service in the chain.
    pub fn around<F, Fut>(f: F) -> Self
    where
        F: Fn(Data, RunService) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |next| {
            let f = Arc::clone(&f);
            BoxCloneSyncService::new(service_fn(move |data: Data| (*f)(data, next.clone())))
        })
    }

    /// Creates a guard hook.
    ///
    /// When `predicate` returns `false` the chain is cut short with a
    /// [`UserError`] carrying `message`.
    pub fn require<P>(predicate: P, message: impl Into<String>) -> Self
    where
        P: Fn(&Data) -> bool + Send + Sync + 'static,
    {
        let check = Require {
            predicate: Arc::new(predicate),
            message: Arc::from(message.into()),
        };
        Self::new(move |next| BoxCloneSyncService::new(Filter::new(next, check.clone())))
    }

    /// Wraps `next` with this hook.
    pub fn apply(&self, next: RunService) -> RunService {
        (self.0)(next)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").finish_non_exhaustive()
    }
}

/// Wraps `inner` with `hooks` so that the first hook ends up outermost.
pub(crate) fn wrap_all(hooks: &[Hook], inner: RunService) -> RunService {
    hooks.iter().rev().fold(inner, |svc, hook| hook.apply(svc))
}

// ============================================================================
// Require predicate
// ============================================================================

#[derive(Clone)]
struct Require {
    predicate: Arc<dyn Fn(&Data) -> bool + Send + Sync>,
    message: Arc<str>,
}

impl Predicate<Data> for Require {
    type Request = Data;

    fn check(&mut self, data: Data) -> Result<Data, BoxError> {
        if (self.predicate)(&data) {
            Ok(data)
        } else {
            Err(Box::new(UserError::new(self.message.as_ref())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_user_error;
    use crate::test_support::{MockPlatform, guild_data};
    use tower::ServiceExt;

    fn echo() -> RunService {
        BoxCloneSyncService::new(service_fn(|data: Data| async move {
            Ok::<_, BoxError>(Reply::Text(data.stripped))
        }))
    }

    #[tokio::test]
    async fn test_around_can_modify_and_post_process() {
        let hook = Hook::around(|mut data: Data, next: RunService| async move {
            data.stripped = format!("<{}>", data.stripped);
            let reply = next.oneshot(data).await?;
            Ok::<_, BoxError>(match reply {
                Reply::Text(t) => Reply::Text(t.to_uppercase()),
                other => other,
            })
        });

        let svc = hook.apply(echo());
        let mut data = guild_data(MockPlatform::new(), "");
        data.stripped = "hi".into();
        assert_eq!(svc.oneshot(data).await.unwrap(), Reply::Text("<HI>".into()));
    }

    #[tokio::test]
    async fn test_require_short_circuits_with_user_error() {
        let svc = Hook::require(|data| data.stripped == "ok", "not allowed").apply(echo());

        let mut data = guild_data(MockPlatform::new(), "");
        data.stripped = "ok".into();
        assert!(svc.clone().oneshot(data.clone()).await.is_ok());

        data.stripped = "no".into();
        let err = svc.oneshot(data).await.unwrap_err();
        assert!(is_user_error(err.as_ref()));
        assert_eq!(err.to_string(), "not allowed");
    }

    #[tokio::test]
    async fn test_wrap_all_first_is_outermost() {
        let tag = |s: &'static str| {
            Hook::around(move |mut data: Data, next: RunService| async move {
                data.stripped.push_str(s);
                next.oneshot(data).await
            })
        };

        let svc = wrap_all(&[tag("a"), tag("b"), tag("c")], echo());
        let data = guild_data(MockPlatform::new(), "");
        assert_eq!(svc.oneshot(data).await.unwrap(), Reply::Text("abc".into()));
    }
}
