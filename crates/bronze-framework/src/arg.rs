//! Argument definitions and parsed values.
//!
//! A command declares its positional arguments and switches as [`ArgDef`]s.
//! Each invocation binds them into a fresh `Vec<ParsedArg>` created by
//! [`new_parsed_args`], index-aligned with the definitions, so a handler reads
//! argument `i` of its declaration as `data.args[i]` regardless of which combo
//! matched the input.
//!
//! Values are stored as an [`ArgValue`]. The accessors on [`ParsedArg`] never
//! fail: a mismatched or absent value reads as the zero value.
//!
//! # Example
//!
//! ```rust,ignore
//! use bronze_framework::arg::{ArgDef, ArgType};
//!
//! let defs = vec![
//!     ArgDef::new("sides", ArgType::int_range(2, 100)).help("Number of sides"),
//!     ArgDef::new("reason", ArgType::STRING),
//! ];
//! let switches = vec![ArgDef::flag("v").help("Show every roll")];
//! ```

use std::sync::Arc;

use bronze_core::{Channel, Id, Member, User};

use crate::split::RawArg;

mod search;
mod types;

pub use search::{find_member_by_username, find_members_by_name};
pub use types::{AdvUserArg, ArgType, FloatArg, IntArg, UserArg};

/// Declares one argument slot, either positional or a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgDef {
    /// Identifier used in error messages and help.
    pub name: String,
    /// Flag name when used as a switch (`-switch`).
    pub switch: Option<String>,
    /// `None` marks a boolean switch that takes no value.
    pub ty: Option<ArgType>,
    pub help: String,
    /// Value bound when the argument is not supplied.
    pub default: ArgValue,
}

impl ArgDef {
    /// A typed argument.
    pub fn new(name: impl Into<String>, ty: ArgType) -> Self {
        Self {
            name: name.into(),
            switch: None,
            ty: Some(ty),
            help: String::new(),
            default: ArgValue::Absent,
        }
    }

    /// A boolean switch, `-name`, that consumes no value.
    ///
    /// `name` doubles as the switch name; flags never bind positionally.
    pub fn flag(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            switch: Some(name.clone()),
            name,
            ty: None,
            help: String::new(),
            default: ArgValue::Bool(false),
        }
    }

    /// Sets the switch name this definition answers to.
    pub fn switch(mut self, switch: impl Into<String>) -> Self {
        self.switch = Some(switch.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = value.into();
        self
    }

    /// The name matched against `-name` tokens.
    ///
    /// Never derived from `name`: a definition without a switch name is not
    /// a switch, even when registered as one.
    pub fn switch_name(&self) -> Option<&str> {
        self.switch.as_deref()
    }

    /// Human readable type name for help output.
    pub fn type_name(&self) -> &'static str {
        self.ty.as_ref().map_or("Switch", ArgType::type_name)
    }
}

/// A parsed argument value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ArgValue {
    #[default]
    Absent,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    User(User),
    Member(Member),
    Channel(Channel),
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<User> for ArgValue {
    fn from(v: User) -> Self {
        Self::User(v)
    }
}

impl From<Member> for ArgValue {
    fn from(v: Member) -> Self {
        Self::Member(v)
    }
}

impl From<Channel> for ArgValue {
    fn from(v: Channel) -> Self {
        Self::Channel(v)
    }
}

/// The binding of one [`ArgDef`] for a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArg {
    pub def: Arc<ArgDef>,
    pub value: ArgValue,
    /// The token the value came from; `None` when the default is in effect.
    pub raw: Option<RawArg>,
}

impl ParsedArg {
    /// A binding holding the definition's default.
    pub fn from_default(def: Arc<ArgDef>) -> Self {
        Self {
            value: def.default.clone(),
            def,
            raw: None,
        }
    }

    /// Returns `true` if the argument was supplied in the input.
    pub fn is_present(&self) -> bool {
        self.raw.is_some()
    }

    pub fn str(&self) -> &str {
        match &self.value {
            ArgValue::Text(s) => s,
            _ => "",
        }
    }

    pub fn int64(&self) -> i64 {
        match self.value {
            ArgValue::Int(v) => v,
            _ => 0,
        }
    }

    /// The integer value if it fits in an `i32`, otherwise `0`.
    pub fn int(&self) -> i32 {
        i32::try_from(self.int64()).unwrap_or(0)
    }

    /// Float value, widening integers.
    pub fn float64(&self) -> f64 {
        match self.value {
            ArgValue::Float(v) => v,
            ArgValue::Int(v) => v as f64,
            _ => 0.0,
        }
    }

    pub fn bool(&self) -> bool {
        matches!(self.value, ArgValue::Bool(true))
    }

    /// The user, from either a user or a member value.
    pub fn user(&self) -> Option<&User> {
        match &self.value {
            ArgValue::User(u) => Some(u),
            ArgValue::Member(m) => Some(&m.user),
            _ => None,
        }
    }

    pub fn member(&self) -> Option<&Member> {
        match &self.value {
            ArgValue::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn channel(&self) -> Option<&Channel> {
        match &self.value {
            ArgValue::Channel(c) => Some(c),
            _ => None,
        }
    }

    /// The id carried by the value, for id, user and channel arguments.
    pub fn id(&self) -> Option<Id> {
        match &self.value {
            ArgValue::Int(v) => Id::try_from(*v).ok(),
            ArgValue::User(u) => Some(u.id),
            ArgValue::Member(m) => Some(m.user.id),
            ArgValue::Channel(c) => Some(c.id),
            _ => None,
        }
    }
}

/// Creates one default binding per definition, in declaration order.
pub fn new_parsed_args(defs: &[Arc<ArgDef>]) -> Vec<ParsedArg> {
    defs.iter()
        .map(|def| ParsedArg::from_default(Arc::clone(def)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parsed_args_aligned_with_defs() {
        let defs = vec![
            Arc::new(ArgDef::new("a", ArgType::INT).default_value(7i64)),
            Arc::new(ArgDef::new("b", ArgType::STRING)),
            Arc::new(ArgDef::flag("c")),
        ];
        let parsed = new_parsed_args(&defs);

        assert_eq!(parsed.len(), defs.len());
        for (p, d) in parsed.iter().zip(&defs) {
            assert!(Arc::ptr_eq(&p.def, d));
            assert!(!p.is_present());
        }
        assert_eq!(parsed[0].int64(), 7);
        assert_eq!(parsed[1].value, ArgValue::Absent);
        assert!(!parsed[2].bool());
    }

    #[test]
    fn test_accessors_are_total() {
        let def = Arc::new(ArgDef::new("x", ArgType::STRING));
        let text = ParsedArg {
            def: Arc::clone(&def),
            value: "hi".into(),
            raw: None,
        };
        assert_eq!(text.str(), "hi");
        assert_eq!(text.int64(), 0);
        assert_eq!(text.float64(), 0.0);
        assert!(text.user().is_none());

        let big = ParsedArg {
            def,
            value: ArgValue::Int(i64::MAX),
            raw: None,
        };
        assert_eq!(big.int(), 0);
        assert_eq!(big.int64(), i64::MAX);
        assert_eq!(big.float64(), i64::MAX as f64);
        assert_eq!(big.id(), Some(i64::MAX as u64));
    }

    #[test]
    fn test_member_reads_as_user() {
        let member = Member::new(1, User::new(5, "eve"));
        let parsed = ParsedArg {
            def: Arc::new(ArgDef::new("who", ArgType::ADV_USER)),
            value: member.into(),
            raw: None,
        };
        assert_eq!(parsed.user().map(|u| u.id), Some(5));
        assert!(parsed.member().is_some());
        assert_eq!(parsed.id(), Some(5));
    }

    #[test]
    fn test_switch_name() {
        assert_eq!(ArgDef::flag("v").switch_name(), Some("v"));
        let def = ArgDef::new("target", ArgType::USER).switch("u");
        assert_eq!(def.switch_name(), Some("u"));
        assert_eq!(ArgDef::new("target", ArgType::USER).switch_name(), None);
        assert_eq!(def.type_name(), "User");
        assert_eq!(ArgDef::flag("v").type_name(), "Switch");
    }
}
