//! mish: replay command scripts with inline `${variable}` templating.
//!
//! - [`script`] — the templating language: expansion and block statements
//! - [`var`] — the variable environment shared across a script run
//! - [`runner`] — line filtering, expansion and dispatch
//! - [`dispatch`] — command sinks
//! - [`library`] — locating scripts on disk
//! - [`config`] — the `mishrc` file
//! - [`cli`] — argument parsing and environment seeding

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod library;
pub mod runner;
pub mod script;
pub mod var;
