//! Command-line front end.
//!
//! Usage:
//!   mish [--raw] [-L <dir>] [--rc <file>] [--unclosed <policy>] [-v] <script> [args…]
//!   mish --list [-L <dir>]
//!
//! Everything after the script name seeds the environment: the arguments are
//! joined with spaces and expanded once, so `mish greet ${who=bob}` runs
//! `greet.mish` with `who` bound to `bob`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use thiserror::Error;

use crate::script::{expand_with, ExpandOptions, SyntaxError, UnclosedBlock};
use crate::var::Environment;

pub const RAW_FLAG: &str = "--raw";

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "mish", version, about = "Replay command scripts with ${variable} templating")]
pub struct Cli {
    /// Dispatch lines verbatim: no expansion, no comment skipping.
    #[arg(long)]
    pub raw: bool,

    /// Scripts directory (overrides MISH_SCRIPTS_DIR and the rc file).
    #[arg(short = 'L', long = "scripts-dir", value_name = "DIR")]
    pub scripts_dir: Option<PathBuf>,

    /// rc file to load instead of the default `mishrc`.
    #[arg(long, value_name = "FILE")]
    pub rc: Option<PathBuf>,

    /// What to do with `${` blocks left open at end of line.
    #[arg(long, value_name = "reject|flatten|truncate")]
    pub unclosed: Option<UnclosedBlock>,

    /// List available scripts and exit.
    #[arg(long)]
    pub list: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Script name followed by environment arguments.
    #[arg(value_name = "SCRIPT [ARGS]", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

// ── Invocation ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Usage: mish [--raw] <script> [args...]")]
pub struct UsageError;

/// A script invocation split out of a raw argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub raw: bool,
    pub script: String,
    /// Arguments after the script name.
    pub seed: Vec<String>,
}

impl Invocation {
    /// Strip every `--raw`, take the first remaining argument as the script
    /// name and keep the rest as seed arguments.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, UsageError> {
        let mut raw = false;
        let mut rest = Vec::with_capacity(args.len());
        for arg in args {
            match arg.as_ref() {
                RAW_FLAG => raw = true,
                other => rest.push(other.to_owned()),
            }
        }
        if rest.is_empty() {
            return Err(UsageError);
        }
        let script = rest.remove(0);
        Ok(Invocation { raw, script, seed: rest })
    }
}

/// Expand the seed arguments (joined with single spaces) against `env`.
///
/// The expanded text is discarded; only the bindings matter.
pub fn seed_environment(
    env: &mut Environment,
    seed: &[String],
    opts: ExpandOptions,
) -> Result<(), SyntaxError> {
    if seed.is_empty() {
        return Ok(());
    }
    expand_with(&seed.join(" "), env, opts).map(drop)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn invocation_script_only() {
        let inv = Invocation::from_args(&argv(&["build"])).unwrap();
        assert_eq!(inv, Invocation { raw: false, script: "build".into(), seed: vec![] });
    }

    #[test]
    fn invocation_raw_anywhere() {
        let inv = Invocation::from_args(&argv(&["build", "x", "--raw", "y"])).unwrap();
        assert!(inv.raw);
        assert_eq!(inv.script, "build");
        assert_eq!(inv.seed, ["x", "y"]);

        let inv = Invocation::from_args(&argv(&["--raw", "build"])).unwrap();
        assert!(inv.raw);
        assert_eq!(inv.script, "build");
    }

    #[test]
    fn invocation_requires_script() {
        assert_eq!(Invocation::from_args::<&str>(&[]), Err(UsageError));
        assert_eq!(Invocation::from_args(&argv(&["--raw"])), Err(UsageError));
    }

    #[test]
    fn seed_binds_variables() {
        let mut env = Environment::new();
        let seed = argv(&["${who=bob}", "${n=3}"]);
        seed_environment(&mut env, &seed, ExpandOptions::default()).unwrap();
        assert_eq!(env.get("who"), Some("bob"));
        assert_eq!(env.get("n"), Some("3"));
    }

    #[test]
    fn seed_arguments_are_joined_with_spaces() {
        // The block spans two arguments, so the space becomes part of the value.
        let mut env = Environment::new();
        let seed = argv(&["${msg=hello", "world}"]);
        seed_environment(&mut env, &seed, ExpandOptions::default()).unwrap();
        assert_eq!(env.get("msg"), Some("hello world"));
    }

    #[test]
    fn seed_overrides_existing() {
        let mut env: Environment = [("who", "alice")].into_iter().collect();
        seed_environment(&mut env, &argv(&["${who=bob}"]), ExpandOptions::default()).unwrap();
        assert_eq!(env.get("who"), Some("bob"));
    }

    #[test]
    fn seed_syntax_error() {
        let mut env = Environment::new();
        let err = seed_environment(&mut env, &argv(&["oops}"]), ExpandOptions::default());
        assert!(matches!(err, Err(SyntaxError::UnmatchedClose { column: 5 })));
        assert!(env.is_empty());
    }

    #[test]
    fn cli_parses_flags_and_trailing_args() {
        let cli = Cli::try_parse_from([
            "mish", "--raw", "-L", "/srv/scripts", "--unclosed", "flatten", "-vv", "build",
            "${x=1}", "--raw",
        ])
        .unwrap();
        assert!(cli.raw);
        assert_eq!(cli.scripts_dir, Some(PathBuf::from("/srv/scripts")));
        assert_eq!(cli.unclosed, Some(UnclosedBlock::Flatten));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.args, ["build", "${x=1}", "--raw"]);
    }

    #[test]
    fn cli_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["mish", "--unclosed", "sometimes", "x"]).is_err());
    }

    #[test]
    fn cli_list_without_script() {
        let cli = Cli::try_parse_from(["mish", "--list"]).unwrap();
        assert!(cli.list);
        assert!(cli.args.is_empty());
    }
}
