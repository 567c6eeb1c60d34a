//! Per-command registration metadata.

use crate::data::TriggerSource;
use crate::hook::Hook;

/// The names a command answers to, plus per-command hooks and flags.
///
/// The first name is canonical, the rest are aliases.
///
/// ```rust,ignore
/// Trigger::new("remove")
///     .alias("rm")
///     .disable_in_dm(true)
///     .hook(Hook::require(is_admin, "Admins only"))
/// ```
#[derive(Debug, Clone, Default)]
pub struct Trigger {
    pub names: Vec<String>,
    /// Hooks that wrap only this command, inside all container hooks.
    pub hooks: Vec<Hook>,
    pub hide_from_help: bool,
    pub disable_in_dm: bool,
    pub disable_outside_dm: bool,
}

impl Trigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ..Default::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.names.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn hide_from_help(mut self, hide: bool) -> Self {
        self.hide_from_help = hide;
        self
    }

    pub fn disable_in_dm(mut self, disable: bool) -> Self {
        self.disable_in_dm = disable;
        self
    }

    pub fn disable_outside_dm(mut self, disable: bool) -> Self {
        self.disable_outside_dm = disable;
        self
    }

    /// Returns `true` if the command may run for a message from `source`.
    pub fn enabled_for(&self, source: TriggerSource) -> bool {
        if source == TriggerSource::Dm {
            !self.disable_in_dm
        } else {
            !self.disable_outside_dm
        }
    }

    /// The canonical name, or every name joined by `sep` when `aliases` is set.
    pub fn format_names(&self, aliases: bool, sep: &str) -> String {
        if aliases {
            self.names.join(sep)
        } else {
            self.names.first().cloned().unwrap_or_default()
        }
    }
}

impl From<&str> for Trigger {
    fn from(name: &str) -> Self {
        Trigger::new(name)
    }
}

impl From<String> for Trigger {
    fn from(name: String) -> Self {
        Trigger::new(name)
    }
}
