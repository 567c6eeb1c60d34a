//! Quote and escape aware argument tokenizer.
//!
//! Splits command text into [`RawArg`]s:
//!
//! - tokens are separated by unescaped spaces
//! - a token that *starts* with `"` or `` ` `` runs, spaces included, until the
//!   same character appears again; the quote is recorded in
//!   [`RawArg::container`] and stripped from the text
//! - `\` makes the next character literal (`\\`, `\ `, `\"`)
//! - a quote in the middle of a token is an ordinary character
//!
//! Tokenizing never fails. An unterminated quote is glued back onto the front
//! of the final token, leaving it to argument matching to reject.
//!
//! ```rust,ignore
//! let args = split_args(r#"say "hello world" \"hi\""#);
//! // ["say", "hello world" (container '"'), "\"hi\""]
//! ```

/// Characters that open and close a contained token.
pub const ARG_CONTAINERS: [char; 2] = ['"', '`'];

/// A single token produced by [`split_args`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArg {
    pub text: String,
    /// The quote character that delimited this token, if any.
    pub container: Option<char>,
}

impl RawArg {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            container: None,
        }
    }

    pub fn contained(text: impl Into<String>, container: char) -> Self {
        Self {
            text: text.into(),
            container: Some(container),
        }
    }

    /// Rebuilds the token as it was typed, quotes included.
    pub fn requoted(&self) -> String {
        match self.container {
            Some(c) => format!("{c}{}{c}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Splits `input` into raw argument tokens.
pub fn split_args(input: &str) -> Vec<RawArg> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut container: Option<char> = None;
    let mut escape = false;

    for c in input.chars() {
        if escape {
            buf.push(c);
            escape = false;
            continue;
        }

        match c {
            '\\' => escape = true,
            ' ' if container.is_none() => {
                if !buf.is_empty() {
                    out.push(RawArg::new(std::mem::take(&mut buf)));
                }
            }
            c if Some(c) == container => {
                out.push(RawArg::contained(std::mem::take(&mut buf), c));
                container = None;
            }
            c if container.is_none() && buf.is_empty() && ARG_CONTAINERS.contains(&c) => {
                container = Some(c);
            }
            c => buf.push(c),
        }
    }

    if !buf.is_empty() {
        if let Some(c) = container {
            buf.insert(0, c);
        }
        out.push(RawArg::new(buf));
    }

    out
}
