//! Error types for value access, path navigation, and parsing.

use crate::node::Kind;
use crate::parser::State;
use crate::path::Path;
use thiserror::Error;

/// Errors raised by the value core and the path engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A typed accessor was called for a variant that is not active.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Kind, found: Kind },

    /// A mutating path operation could not resolve the path structurally.
    /// `path` is the path as requested by the caller (wildcards unexpanded).
    #[error("path error at `{path}`: {reason}")]
    Path { path: Path, reason: String },

    /// Direct array access past the end.
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The input text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors raised by the incremental parser.
///
/// Positions are 0-based; `column` counts characters since the last newline,
/// including the offending one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected character (`found = Some(c)`), unexpected end of input
    /// (`found = None`), or a malformed literal/escape.
    #[error("syntax error at line {line}, column {column} (state {state}): {message}")]
    Syntax {
        line: usize,
        column: usize,
        state: State,
        found: Option<char>,
        message: String,
    },

    /// A numeric literal does not fit into i64 / f64.
    #[error("numeric literal `{literal}` out of range at line {line}, column {column}")]
    NumericRange {
        line: usize,
        column: usize,
        literal: String,
    },
}

impl ParseError {
    /// Line and column at which the error was detected.
    pub fn position(&self) -> (usize, usize) {
        match self {
            ParseError::Syntax { line, column, .. } | ParseError::NumericRange { line, column, .. } => {
                (*line, *column)
            }
        }
    }
}

impl Error {
    pub(crate) fn path(path: &Path, reason: impl Into<String>) -> Self {
        Error::Path {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout jsontree.
pub type Result<T, E = Error> = std::result::Result<T, E>;
