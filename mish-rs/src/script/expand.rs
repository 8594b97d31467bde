//! Line expansion.
//!
//! | Sequence   | Meaning                                                   |
//! |------------|-----------------------------------------------------------|
//! | `\c`       | Literal `c` (any character); a trailing `\` is dropped    |
//! | `${…}`     | Block: expand the contents, then evaluate as a statement  |
//! | `$`        | Literal `$` when not followed by `{`                      |
//! | `}`        | Closes the innermost open block                           |
//!
//! Blocks nest.  The innermost block is evaluated first and its result is
//! appended to the enclosing buffer, so evaluation order is inside-out and
//! left to right among siblings.  Open blocks live on an explicit stack of
//! buffers; there is no recursion.

use std::fmt;
use std::str::FromStr;

use super::error::SyntaxError;
use super::stmt::{evaluate, Scope};
use crate::var::Environment;

const ESCAPE: char = '\\';
const SIGIL: char = '$';
const OPEN: char = '{';
const CLOSE: char = '}';

/// What to do with blocks still open at the end of a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnclosedBlock {
    /// Fail with [`SyntaxError::UnmatchedOpen`].
    #[default]
    Reject,
    /// Re-emit each unclosed block literally (`${` plus its expanded
    /// content) into its parent.
    Flatten,
    /// Keep only the innermost unclosed buffer; everything before it is
    /// dropped.
    Truncate,
}

impl FromStr for UnclosedBlock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(UnclosedBlock::Reject),
            "flatten" => Ok(UnclosedBlock::Flatten),
            "truncate" => Ok(UnclosedBlock::Truncate),
            other => Err(format!(
                "unknown unclosed-block policy '{other}' (expected reject, flatten or truncate)"
            )),
        }
    }
}

impl fmt::Display for UnclosedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnclosedBlock::Reject => "reject",
            UnclosedBlock::Flatten => "flatten",
            UnclosedBlock::Truncate => "truncate",
        })
    }
}

/// Knobs for [`expand_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    pub unclosed: UnclosedBlock,
}

/// Expand `line` against `env` with default options.
pub fn expand(line: &str, env: &mut Environment) -> Result<String, SyntaxError> {
    expand_with(line, env, ExpandOptions::default())
}

/// Expand `line` against `env`.
///
/// On error `env` is left exactly as it was before the call: assignments
/// made by blocks that closed earlier in the line are undone.
pub fn expand_with(
    line: &str,
    env: &mut Environment,
    opts: ExpandOptions,
) -> Result<String, SyntaxError> {
    let mut journal = Journal::new(env);
    let result = scan(line, &mut journal, opts);
    if result.is_err() {
        journal.rollback();
    }
    result
}

/// A saved parent buffer plus the column of the `${` that opened the child.
struct Frame {
    parent: String,
    column: usize,
}

fn scan(line: &str, scope: &mut dyn Scope, opts: ExpandOptions) -> Result<String, SyntaxError> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut current = String::with_capacity(line.len());
    let mut chars = line.chars().enumerate().peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            ESCAPE => {
                if let Some((_, escaped)) = chars.next() {
                    current.push(escaped);
                }
            }
            SIGIL if matches!(chars.peek(), Some(&(_, OPEN))) => {
                chars.next(); // consume '{'
                stack.push(Frame { parent: std::mem::take(&mut current), column: i + 1 });
            }
            CLOSE => {
                let Some(frame) = stack.pop() else {
                    return Err(SyntaxError::UnmatchedClose { column: i + 1 });
                };
                let value = evaluate(&current, &mut *scope);
                current = frame.parent;
                current.push_str(&value);
            }
            other => current.push(other),
        }
    }

    if stack.is_empty() {
        return Ok(current);
    }

    match opts.unclosed {
        UnclosedBlock::Reject => Err(SyntaxError::UnmatchedOpen {
            column: stack[0].column,
            depth: stack.len(),
        }),
        UnclosedBlock::Flatten => {
            while let Some(frame) = stack.pop() {
                let inner = std::mem::replace(&mut current, frame.parent);
                current.push(SIGIL);
                current.push(OPEN);
                current.push_str(&inner);
            }
            Ok(current)
        }
        UnclosedBlock::Truncate => Ok(current),
    }
}

// ── Journal ───────────────────────────────────────────────────────────────────

/// Records every binding made during one line so it can be undone.
struct Journal<'a> {
    env: &'a mut Environment,
    undo: Vec<(String, Option<String>)>,
}

impl<'a> Journal<'a> {
    fn new(env: &'a mut Environment) -> Self {
        Journal { env, undo: Vec::new() }
    }

    fn rollback(self) {
        for (name, previous) in self.undo.into_iter().rev() {
            match previous {
                Some(value) => {
                    self.env.set(name, value);
                }
                None => {
                    self.env.unset(&name);
                }
            }
        }
    }
}

impl Scope for Journal<'_> {
    fn get_var(&self, name: &str) -> Option<&str> {
        self.env.get(name)
    }

    fn set_var(&mut self, name: &str, value: &str) {
        let previous = self.env.set(name, value);
        self.undo.push((name.to_owned(), previous));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
