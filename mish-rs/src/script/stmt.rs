//! Block statements: the text inside one `${…}` once its inner blocks have
//! been resolved.
//!
//! | Content          | Meaning                                               |
//! |------------------|-------------------------------------------------------|
//! | `name`           | Value of `name`, or empty text if unbound             |
//! | `name=value`     | Bind `name` to `value`; contributes empty text        |
//! | `a=b=…=value`    | Bind every listed name to the final `value`           |
//!
//! Splitting happens on every `=` in the already-expanded text, so a value
//! substituted into a name position can itself introduce more targets.

use crate::var::Environment;

/// Variable access used while evaluating statements.
///
/// [`Environment`] implements this directly; the expander wraps it in a
/// journal so that a failing line can undo its assignments.
pub trait Scope {
    fn get_var(&self, name: &str) -> Option<&str>;
    fn set_var(&mut self, name: &str, value: &str);
}

impl Scope for Environment {
    fn get_var(&self, name: &str) -> Option<&str> {
        self.get(name)
    }

    fn set_var(&mut self, name: &str, value: &str) {
        self.set(name, value);
    }
}

/// A parsed block statement borrowing from the block content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'a> {
    /// `a=b=…=value`
    Assign { names: Vec<&'a str>, value: &'a str },
    /// `name`
    Lookup(&'a str),
}

impl<'a> Statement<'a> {
    pub fn parse(content: &'a str) -> Self {
        let mut pieces: Vec<&'a str> = content.split('=').collect();
        match pieces.pop() {
            Some(value) if !pieces.is_empty() => Statement::Assign { names: pieces, value },
            _ => Statement::Lookup(content),
        }
    }

    /// Apply the statement and return the text it contributes.
    pub fn eval<S: Scope + ?Sized>(&self, scope: &mut S) -> String {
        match self {
            Statement::Assign { names, value } => {
                for name in names {
                    scope.set_var(name, value);
                }
                String::new()
            }
            Statement::Lookup(name) => scope.get_var(name).unwrap_or_default().to_owned(),
        }
    }
}

/// Parse and evaluate `content` in one step.  Never fails.
pub fn evaluate<S: Scope + ?Sized>(content: &str, scope: &mut S) -> String {
    Statement::parse(content).eval(scope)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
