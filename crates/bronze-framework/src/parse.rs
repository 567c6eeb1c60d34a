//! Argument binding.
//!
//! Binding a command's input runs in three steps over the tokens produced by
//! [`split_args`]:
//!
//! ```text
//!  "-v 5 hello world"
//!        │ split_args
//!        ▼
//!  [-v] [5] [hello] [world]
//!        │ parse_switches        switches: { v: true }
//!        ▼
//!  [5] [hello] [world]
//!        │ find_combo            combo: [0, 1]
//!        ▼
//!  args[0] = 5, args[1] = "hello world"   (last slot slurps the rest)
//! ```
//!
//! The whole procedure is available as [`parse_cmd_args`] and, as a hook, as
//! [`ArgParserLayer`], which [`ContainerBuilder::standard`] installs at the
//! root.
//!
//! [`ContainerBuilder::standard`]: crate::container::ContainerBuilder::standard

use std::collections::HashMap;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::{BoxError, Layer, Service, ServiceExt};
use tracing::debug;

use crate::arg::{ArgDef, ArgValue, ParsedArg, new_parsed_args};
use crate::command::CommandResult;
use crate::data::Data;
use crate::error::ArgError;
use crate::response::Reply;
use crate::split::{RawArg, split_args};

/// The argument declaration of a command.
#[derive(Debug, Clone, Default)]
pub struct ArgSpec {
    /// Positional argument definitions.
    pub defs: Vec<Arc<ArgDef>>,
    /// Number of leading positional arguments that must be supplied when no
    /// combos are declared.
    pub required: usize,
    /// Accepted argument shapes, as indices into `defs`.
    pub combos: Vec<Vec<usize>>,
    pub switches: Vec<Arc<ArgDef>>,
}

impl ArgSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, def: ArgDef) -> Self {
        self.defs.push(Arc::new(def));
        self
    }

    /// Appends a shared positional argument definition.
    pub fn arg_shared(mut self, def: Arc<ArgDef>) -> Self {
        self.defs.push(def);
        self
    }

    pub fn required(mut self, required: usize) -> Self {
        self.required = required;
        self
    }

    /// Declares an accepted argument shape.
    pub fn combo(mut self, indices: impl Into<Vec<usize>>) -> Self {
        self.combos.push(indices.into());
        self
    }

    /// Appends a switch. `def` must carry a switch name, see
    /// [`ArgDef::switch`] and [`ArgDef::flag`].
    pub fn switch(mut self, def: ArgDef) -> Self {
        self.switches.push(Arc::new(def));
        self
    }

    /// Returns `true` if the command takes neither arguments nor switches.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty() && self.switches.is_empty()
    }
}

/// Picks the argument shape that best fits `args`.
///
/// Without declared combos every definition is taken in order. Otherwise the
/// longest combo whose every slot matches its token wins; on a tie the one
/// declared first is kept.
pub fn find_combo(defs: &[Arc<ArgDef>], combos: &[Vec<usize>], args: &[RawArg]) -> Option<Vec<usize>> {
    if combos.is_empty() {
        return Some((0..defs.len()).collect());
    }

    let mut selected: Option<&Vec<usize>> = None;
    for combo in combos {
        if combo.len() > args.len() {
            continue;
        }

        let viable = combo.iter().zip(args).all(|(&idx, arg)| {
            defs.get(idx)
                .is_some_and(|def| def.ty.is_none_or(|ty| ty.matches(&arg.text)))
        });
        if !viable {
            continue;
        }

        if selected.is_none_or(|s| combo.len() > s.len()) {
            selected = Some(combo);
        }
    }

    selected.cloned()
}

/// Extracts `-switch [value]` tokens.
///
/// Returns the remaining tokens and a binding for every declared switch,
/// keyed by switch name. Quoted tokens and unknown `-names` are passed
/// through untouched. Definitions without a switch name are never matched.
pub async fn parse_switches(
    switches: &[Arc<ArgDef>],
    args: Vec<RawArg>,
    data: &Data,
) -> Result<(Vec<RawArg>, HashMap<String, ParsedArg>), ArgError> {
    let mut parsed: HashMap<String, ParsedArg> = switches
        .iter()
        .filter_map(|def| {
            let name = def.switch_name()?;
            Some((name.to_string(), ParsedArg::from_default(Arc::clone(def))))
        })
        .collect();

    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();

    while let Some(raw) = iter.next() {
        let matched = match raw.text.strip_prefix('-') {
            Some(name) if raw.container.is_none() => {
                switches.iter().find(|def| def.switch_name() == Some(name))
            }
            _ => None,
        };
        let Some(def) = matched else {
            rest.push(raw);
            continue;
        };

        let Some(ty) = def.ty else {
            if let Some(slot) = def.switch_name().and_then(|n| parsed.get_mut(n)) {
                slot.value = ArgValue::Bool(true);
                slot.raw = Some(raw);
            }
            continue;
        };

        let Some(value_raw) = iter.next() else {
            debug!(switch = def.switch_name().unwrap_or_default(), "Switch given without a value, keeping default");
            break;
        };

        let value = ty.parse(def, &value_raw.text, data).await?;
        if let Some(slot) = def.switch_name().and_then(|n| parsed.get_mut(n)) {
            slot.value = value;
            slot.raw = Some(value_raw);
        }
    }

    Ok((rest, parsed))
}

/// Binds positional arguments.
///
/// Returns one binding per definition, index-aligned with `defs`.
pub async fn parse_arg_defs(
    defs: &[Arc<ArgDef>],
    required: usize,
    combos: &[Vec<usize>],
    args: &[RawArg],
    data: &Data,
) -> Result<Vec<ParsedArg>, ArgError> {
    let combo = find_combo(defs, combos, args).ok_or(ArgError::NoComboFound)?;
    let mut parsed = new_parsed_args(defs);

    for (i, &def_idx) in combo.iter().enumerate() {
        if i >= args.len() {
            if i >= required && combos.is_empty() {
                break;
            }
            return Err(ArgError::NotEnoughArguments);
        }

        let raw = if i == combo.len() - 1 && args.len() > i + 1 {
            let joined = args[i..]
                .iter()
                .map(RawArg::requoted)
                .collect::<Vec<_>>()
                .join(" ");
            RawArg::new(joined)
        } else {
            args[i].clone()
        };

        let def = &defs[def_idx];
        let value = match def.ty {
            Some(ty) => ty.parse(def, &raw.text, data).await?,
            None => ArgValue::Text(raw.text.clone()),
        };

        let slot = &mut parsed[def_idx];
        slot.value = value;
        slot.raw = Some(raw);
    }

    Ok(parsed)
}

/// Parses switches and positional arguments of the matched command into
/// `data`.
///
/// Commands that declare neither are left untouched.
pub async fn parse_cmd_args(data: &mut Data) -> Result<(), ArgError> {
    let Some(cmd) = data.cmd.clone() else {
        return Ok(());
    };
    let spec = &cmd.args;
    if spec.is_empty() {
        return Ok(());
    }

    let mut split = split_args(&data.stripped);

    if !spec.switches.is_empty() {
        let (rest, switches) = parse_switches(&spec.switches, split, data).await?;
        split = rest;
        data.switches = switches;
    }

    if !spec.defs.is_empty() {
        data.args = parse_arg_defs(&spec.defs, spec.required, &spec.combos, &split, data).await?;
    }

    Ok(())
}

// ============================================================================
// ArgParserLayer
// ============================================================================

/// A hook that binds the matched command's arguments before calling the inner
/// service. Binding errors are returned without calling it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgParserLayer;

impl<S> Layer<S> for ArgParserLayer {
    type Service = ArgParserService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ArgParserService { inner }
    }
}

/// The [`Service`] produced by [`ArgParserLayer`].
#[derive(Clone)]
pub struct ArgParserService<S> {
    inner: S,
}

impl<S> Service<Data> for ArgParserService<S>
where
    S: Service<Data, Response = Reply, Error = BoxError> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Reply;
    type Error = BoxError;
    type Future = BoxFuture<'static, CommandResult>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut data: Data) -> Self::Future {
        let inner = self.inner.clone();
        async move {
            parse_cmd_args(&mut data).await?;
            inner.oneshot(data).await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::ArgType;
    use crate::test_support::{MockPlatform, guild_data};

    fn defs(types: &[ArgType]) -> Vec<Arc<ArgDef>> {
        types
            .iter()
            .enumerate()
            .map(|(i, ty)| Arc::new(ArgDef::new(format!("arg{i}"), *ty)))
            .collect()
    }

    #[test]
    fn test_find_combo_identity_without_combos() {
        let defs = defs(&[ArgType::INT, ArgType::STRING]);
        assert_eq!(find_combo(&defs, &[], &[]), Some(vec![0, 1]));
    }

    #[test]
    fn test_find_combo_longest_viable() {
        let defs = defs(&[ArgType::INT, ArgType::STRING]);
        let combos = vec![vec![1], vec![0, 1], vec![0]];

        assert_eq!(find_combo(&defs, &combos, &split_args("5 text")), Some(vec![0, 1]));
        assert_eq!(find_combo(&defs, &combos, &split_args("text")), Some(vec![1]));
        assert_eq!(find_combo(&defs, &combos, &split_args("")), None);
    }

    #[test]
    fn test_find_combo_tie_keeps_first_declared() {
        let defs = defs(&[ArgType::INT, ArgType::STRING]);
        let combos = vec![vec![1], vec![0]];
        assert_eq!(find_combo(&defs, &combos, &split_args("5")), Some(vec![1]));

        let combos = vec![vec![0], vec![1]];
        assert_eq!(find_combo(&defs, &combos, &split_args("5")), Some(vec![0]));
    }

    #[test]
    fn test_find_combo_is_deterministic() {
        let defs = defs(&[ArgType::INT, ArgType::FLOAT, ArgType::STRING]);
        let combos = vec![vec![0, 2], vec![1, 2], vec![2]];
        let args = split_args("1 rest");
        let first = find_combo(&defs, &combos, &args);
        for _ in 0..10 {
            assert_eq!(find_combo(&defs, &combos, &args), first);
        }
    }

    #[tokio::test]
    async fn test_int_float_binding() {
        let data = guild_data(MockPlatform::new(), "");
        let defs = defs(&[ArgType::INT, ArgType::FLOAT]);
        let parsed = parse_arg_defs(&defs, 0, &[], &split_args("15 30.5"), &data)
            .await
            .unwrap();

        assert_eq!(parsed[0].value, ArgValue::Int(15));
        assert_eq!(parsed[1].value, ArgValue::Float(30.5));
    }

    #[tokio::test]
    async fn test_last_slot_slurps_remaining_tokens() {
        let data = guild_data(MockPlatform::new(), "");
        let defs = defs(&[ArgType::INT, ArgType::STRING]);

        let parsed = parse_arg_defs(&defs, 0, &[], &split_args("5 hello world"), &data)
            .await
            .unwrap();
        assert_eq!(parsed[0].int64(), 5);
        assert_eq!(parsed[1].str(), "hello world");

        let parsed = parse_arg_defs(&defs, 0, &[], &split_args(r#"5 hello "big world""#), &data)
            .await
            .unwrap();
        assert_eq!(parsed[1].str(), r#"hello "big world""#);
    }

    #[tokio::test]
    async fn test_combo_binds_by_definition_index() {
        let data = guild_data(MockPlatform::new(), "");
        let defs = defs(&[ArgType::INT, ArgType::STRING]);
        let combos = vec![vec![0, 1], vec![1]];

        let parsed = parse_arg_defs(&defs, 0, &combos, &split_args("words only"), &data)
            .await
            .unwrap();
        assert!(!parsed[0].is_present());
        assert_eq!(parsed[1].str(), "words only");
    }

    #[tokio::test]
    async fn test_missing_arguments() {
        let data = guild_data(MockPlatform::new(), "");
        let defs = vec![
            Arc::new(ArgDef::new("a", ArgType::INT)),
            Arc::new(ArgDef::new("b", ArgType::INT).default_value(3i64)),
        ];
        let args = split_args("1");

        let err = parse_arg_defs(&defs, 2, &[], &args, &data).await.unwrap_err();
        assert_eq!(err, ArgError::NotEnoughArguments);

        let parsed = parse_arg_defs(&defs, 1, &[], &args, &data).await.unwrap();
        assert_eq!(parsed[0].int64(), 1);
        assert_eq!(parsed[1].int64(), 3);
        assert!(!parsed[1].is_present());
    }

    #[tokio::test]
    async fn test_parse_error_aborts() {
        let data = guild_data(MockPlatform::new(), "");
        let defs = defs(&[ArgType::INT]);
        let err = parse_arg_defs(&defs, 0, &[], &split_args("nope"), &data)
            .await
            .unwrap_err();
        assert_eq!(err, ArgError::InvalidInt("nope".into()));

        let err = parse_arg_defs(&defs, 0, &[vec![0]], &split_args("nope"), &data)
            .await
            .unwrap_err();
        assert_eq!(err, ArgError::NoComboFound);
    }

    #[tokio::test]
    async fn test_value_switch_before_positional() {
        let data = guild_data(MockPlatform::new(), "");
        let switches = vec![Arc::new(ArgDef::new("target", ArgType::USER).switch("u"))];

        let (rest, parsed) = parse_switches(&switches, split_args("-u someone 5"), &data)
            .await
            .unwrap();
        assert_eq!(rest, vec![RawArg::new("5")]);
        assert_eq!(parsed["u"].user().map(|u| u.username.as_str()), Some("someone"));

        let bound = parse_arg_defs(&defs(&[ArgType::INT]), 0, &[], &rest, &data)
            .await
            .unwrap();
        assert_eq!(bound[0].value, ArgValue::Int(5));
    }

    #[tokio::test]
    async fn test_switch_pass_through() {
        let data = guild_data(MockPlatform::new(), "");
        let switches = vec![Arc::new(ArgDef::flag("v"))];

        let (rest, parsed) = parse_switches(&switches, split_args(r#"-x "-v" -v"#), &data)
            .await
            .unwrap();
        assert_eq!(rest, vec![RawArg::new("-x"), RawArg::contained("-v", '"')]);
        assert!(parsed["v"].bool());
        assert!(parsed["v"].is_present());
    }

    #[tokio::test]
    async fn test_undeclared_and_trailing_value_switch_keep_defaults() {
        let data = guild_data(MockPlatform::new(), "");
        let switches = vec![
            Arc::new(ArgDef::new("count", ArgType::INT).switch("n").default_value(1i64)),
            Arc::new(ArgDef::flag("v")),
        ];

        let (rest, parsed) = parse_switches(&switches, split_args("a -n"), &data)
            .await
            .unwrap();
        assert_eq!(rest, vec![RawArg::new("a")]);
        assert_eq!(parsed["n"].int64(), 1);
        assert!(!parsed["n"].is_present());
        assert!(!parsed["v"].bool());
    }

    #[tokio::test]
    async fn test_switch_needs_switch_name() {
        let data = guild_data(MockPlatform::new(), "");
        let switches = vec![Arc::new(ArgDef::new("count", ArgType::INT))];

        let (rest, parsed) = parse_switches(&switches, split_args("-count 5"), &data)
            .await
            .unwrap();
        assert_eq!(rest, vec![RawArg::new("-count"), RawArg::new("5")]);
        assert!(parsed.is_empty());
    }

    #[tokio::test]
    async fn test_switch_value_error_aborts() {
        let data = guild_data(MockPlatform::new(), "");
        let switches = vec![Arc::new(ArgDef::new("count", ArgType::INT).switch("n"))];

        let err = parse_switches(&switches, split_args("-n many"), &data)
            .await
            .unwrap_err();
        assert_eq!(err, ArgError::InvalidInt("many".into()));
    }

    #[test]
    fn test_parser_service_is_always_ready() {
        let inner = tower::service_fn(|_data: Data| async { Ok::<_, BoxError>(Reply::None) });
        let mut svc = ArgParserLayer.layer(inner);

        let mut task = tokio_test::task::spawn(());
        tokio_test::assert_ready_ok!(task.enter(|cx, _| svc.poll_ready(cx)));
    }
}
