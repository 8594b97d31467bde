//! Command sinks.
//!
//! A [`Dispatcher`] receives each fully expanded command (always starting
//! with `/`).  What "executing" a command means is up to the implementation;
//! the runner only sees success or a [`DispatchError`].

use std::io::{self, Write};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
    #[error("command rejected: {0}")]
    Rejected(String),
}

/// Something that executes expanded commands.
pub trait Dispatcher {
    fn dispatch(&mut self, command: &str) -> Result<(), DispatchError>;
}

impl<D: Dispatcher + ?Sized> Dispatcher for &mut D {
    fn dispatch(&mut self, command: &str) -> Result<(), DispatchError> {
        (**self).dispatch(command)
    }
}

// ── WriterDispatcher ──────────────────────────────────────────────────────────

/// Writes one command per line to any [`Write`] sink and flushes after each.
#[derive(Debug)]
pub struct WriterDispatcher<W> {
    out: W,
}

impl WriterDispatcher<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> WriterDispatcher<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Dispatcher for WriterDispatcher<W> {
    fn dispatch(&mut self, command: &str) -> Result<(), DispatchError> {
        writeln!(self.out, "{command}")?;
        self.out.flush()?;
        Ok(())
    }
}

// ── Recorder ──────────────────────────────────────────────────────────────────

/// Keeps every dispatched command in memory.
#[derive(Debug, Default)]
pub struct Recorder {
    pub commands: Vec<String>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Dispatcher for Recorder {
    fn dispatch(&mut self, command: &str) -> Result<(), DispatchError> {
        self.commands.push(command.to_owned());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
