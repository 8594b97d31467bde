//! The mish templating language.
//!
//! A script line may contain:
//!
//! - `${name}` — substitute the value of `name` (empty if unbound)
//! - `${name=value}` / `${a=b=value}` — bind one or more names, substitute nothing
//! - `\c` — a literal `c`
//!
//! Blocks nest and are evaluated innermost first, so `${${ptr}}` looks up the
//! variable whose name is stored in `ptr`.
//!
//! # Quick start
//!
//! ```rust
//! use mish::script::expand;
//! use mish::var::Environment;
//!
//! let mut env = Environment::new();
//! let line = expand("${who=bob}/tell ${who} hi", &mut env).unwrap();
//! assert_eq!(line, "/tell bob hi");
//! assert_eq!(env.get("who"), Some("bob"));
//! ```

pub mod error;
pub mod expand;
pub mod stmt;

// Re-exports for convenience.
pub use error::SyntaxError;
pub use expand::{expand, expand_with, ExpandOptions, UnclosedBlock};
pub use stmt::{evaluate, Scope, Statement};
