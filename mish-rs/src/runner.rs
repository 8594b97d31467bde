//! Script execution.
//!
//! A script is a sequence of lines.  In [`Mode::Expand`] each line that is
//! neither blank nor a `#` comment is expanded against the run's shared
//! [`Environment`], prefixed with `/` if needed, and handed to the
//! [`Dispatcher`].  In [`Mode::Raw`] every non-blank line is dispatched as-is
//! (still `/`-prefixed); there is no comment filtering and no expansion.
//!
//! A bad line never aborts the run: its error is collected in the
//! [`RunReport`] and the next line is processed with whatever bindings were
//! in place before the bad one.

use std::io::{self, BufRead};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dispatch::{DispatchError, Dispatcher};
use crate::script::{expand_with, ExpandOptions, SyntaxError};
use crate::var::Environment;

pub const COMMAND_MARKER: char = '/';
pub const COMMENT_MARKER: char = '#';

// ── Errors & report ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LineErrorKind {
    #[error("Syntax Error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Dispatch Error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// A per-line failure.  `line` is 1-based.
#[derive(Debug, Error)]
#[error("line {line}: {kind}")]
pub struct LineError {
    pub line: usize,
    pub kind: LineErrorKind,
}

/// Fatal failure that stops a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("reading line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// Summary of one run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Commands handed to the dispatcher successfully.
    pub dispatched: usize,
    /// Blank lines, comments, and lines that expanded to nothing.
    pub skipped: usize,
    pub errors: Vec<LineError>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// How lines are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Expand,
    Raw,
}

/// What happened to a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    Dispatched(String),
}

// ── Runner ────────────────────────────────────────────────────────────────────

/// Feeds script lines to a dispatcher.
pub struct Runner<D> {
    dispatcher: D,
    options: ExpandOptions,
}

impl<D: Dispatcher> Runner<D> {
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher, options: ExpandOptions::default() }
    }

    pub fn with_options(mut self, options: ExpandOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn into_dispatcher(self) -> D {
        self.dispatcher
    }

    /// Process one line in expand mode.
    pub fn run_line(&mut self, line: &str, env: &mut Environment) -> Result<Outcome, LineErrorKind> {
        if is_skippable(line) {
            return Ok(Outcome::Skipped);
        }
        let expanded = expand_with(line, env, self.options)?;
        if expanded.is_empty() {
            // assignments only, or lookups of unbound names
            return Ok(Outcome::Skipped);
        }
        self.send(expanded)
    }

    /// Process one line in raw mode.
    pub fn run_raw_line(&mut self, line: &str) -> Result<Outcome, LineErrorKind> {
        if line.is_empty() {
            return Ok(Outcome::Skipped);
        }
        self.send(line.to_owned())
    }

    /// Expand and dispatch every line against `env`.
    pub fn run_lines<I, S>(&mut self, lines: I, env: &mut Environment) -> RunReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = RunReport::default();
        for (i, line) in lines.into_iter().enumerate() {
            let outcome = self.run_line(line.as_ref(), env);
            record(&mut report, i + 1, outcome);
        }
        summarize(&report);
        report
    }

    /// Dispatch every non-blank line verbatim.
    pub fn run_raw<I, S>(&mut self, lines: I) -> RunReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = RunReport::default();
        for (i, line) in lines.into_iter().enumerate() {
            let outcome = self.run_raw_line(line.as_ref());
            record(&mut report, i + 1, outcome);
        }
        summarize(&report);
        report
    }

    /// Read lines lazily from `reader`.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD and the line
    /// is processed as usual.  Only a failing read stops the run.
    pub fn run_reader<R: BufRead>(
        &mut self,
        mut reader: R,
        mode: Mode,
        env: &mut Environment,
    ) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();
        let mut buf = Vec::new();
        let mut lineno = 0;
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| RunError::Io { line: lineno + 1, source })?;
            if n == 0 {
                break;
            }
            lineno += 1;
            let line = String::from_utf8_lossy(trim_newline(&buf));
            let outcome = match mode {
                Mode::Expand => self.run_line(&line, env),
                Mode::Raw => self.run_raw_line(&line),
            };
            record(&mut report, lineno, outcome);
        }
        summarize(&report);
        Ok(report)
    }

    fn send(&mut self, command: String) -> Result<Outcome, LineErrorKind> {
        let command = with_command_marker(command);
        self.dispatcher.dispatch(&command)?;
        Ok(Outcome::Dispatched(command))
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Strip one trailing `\n` or `\r\n`.
fn trim_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with(COMMENT_MARKER)
}

/// Prefix `/` unless the command already starts with it.
pub fn with_command_marker(command: String) -> String {
    if command.starts_with(COMMAND_MARKER) {
        command
    } else {
        let mut prefixed = String::with_capacity(command.len() + 1);
        prefixed.push(COMMAND_MARKER);
        prefixed.push_str(&command);
        prefixed
    }
}

fn record(report: &mut RunReport, line: usize, outcome: Result<Outcome, LineErrorKind>) {
    match outcome {
        Ok(Outcome::Dispatched(command)) => {
            debug!(line, %command, "dispatched");
            report.dispatched += 1;
        }
        Ok(Outcome::Skipped) => {
            debug!(line, "skipped");
            report.skipped += 1;
        }
        Err(kind) => {
            warn!(line, error = %kind, "line failed");
            report.errors.push(LineError { line, kind });
        }
    }
}

fn summarize(report: &RunReport) {
    info!(
        dispatched = report.dispatched,
        skipped = report.skipped,
        errors = report.errors.len(),
        "run finished"
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
