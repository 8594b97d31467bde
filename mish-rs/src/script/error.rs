//! Errors raised while expanding a line.

use thiserror::Error;

/// A line that cannot be expanded.
///
/// Columns are 1-based character positions in the raw line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// A `}` with no open `${` to close.
    #[error("lonely '}}' at column {column}")]
    UnmatchedClose { column: usize },
    /// End of line reached with `depth` blocks still open; `column` is the
    /// outermost unclosed `${`.
    #[error("unclosed '${{' at column {column} ({depth} open at end of line)")]
    UnmatchedOpen { column: usize, depth: usize },
}

impl SyntaxError {
    pub fn column(&self) -> usize {
        match self {
            SyntaxError::UnmatchedClose { column } | SyntaxError::UnmatchedOpen { column, .. } => {
                *column
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
