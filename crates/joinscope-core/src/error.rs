//! Error types for the statement-to-graph pipeline.
//!
//! # Error Handling Strategy
//!
//! Only one error ever reaches a caller of [`crate::generate_graph`]:
//!
//! - [`InputError`]: the raw input cannot be processed at all (blank text).
//!   Returned before any parsing is attempted.
//!
//! Everything downstream degrades instead of failing:
//!
//! - [`ParseError`]: a grammar parser rejected the statement. The pipeline
//!   swallows it and runs the fallback parser, which cannot fail.
//! - [`RecognitionError`]: a raw AST matched none of the known shapes. The
//!   pipeline re-runs the fallback parser and normalizes its output instead.
//! - [`GraphConstructionError`]: the builder hit an inconsistency. It is turned
//!   into a diagnostic graph (see [`crate::Graph::is_diagnostic`]).

use crate::types::Dialect;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
#[cfg(feature = "tracing")]
use tracing::trace;

/// The pipeline could not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Input was empty or whitespace only.
    #[error("SQL input is empty")]
    Empty,
}

/// A raw AST did not match any statement shape the normalizer understands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized statement shape: {message}")]
pub struct RecognitionError {
    pub message: String,
}

impl RecognitionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An inconsistency found while assembling the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphConstructionError {
    #[error("table reference at position {0} has an empty name")]
    EmptyTableName(usize),

    #[error("join relation {condition} references table `{table}` which has no node")]
    UnanchoredJoin { table: String, condition: String },

    #[error("{kind} link {source_id} -> {target_id} points at a missing node")]
    DanglingLink {
        kind: String,
        source_id: String,
        target_id: String,
    },

    #[error("field node `{field}` is owned by missing table `{table}`")]
    OrphanField { field: String, table: String },

    #[error("graph construction panicked: {0}")]
    Panicked(String),
}

/// Error reported by a grammar parser.
///
/// Preserves structured information from the underlying parser, including
/// position information when available.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
    /// Location of the error, if the parser reported one.
    pub position: Option<Position>,
    /// The SQL dialect being parsed when the error occurred.
    pub dialect: Option<Dialect>,
    /// The specific category of parse error.
    pub kind: ParseErrorKind,
}

/// Position information for a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

/// Category of parse error for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorKind {
    /// Unexpected token or character in input.
    #[default]
    SyntaxError,
    /// Invalid or unexpected end of input.
    UnexpectedEof,
    /// The statement parsed but is not a single SELECT.
    UnsupportedStatement,
    /// An injected parser failed in a way it could not describe (e.g. panicked).
    ParserFailure,
}

impl ParseError {
    /// Creates a new parse error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    /// Adds dialect context to the error.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Sets the error kind.
    pub fn with_kind(mut self, kind: ParseErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Extracts `Line: X, Column: Y` from a sqlparser error message.
    fn parse_position_from_message(message: &str) -> Option<Position> {
        static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = POSITION_REGEX.get_or_init(|| {
            Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("Invalid regex pattern")
        });

        let result = re.captures(message).and_then(|caps| {
            let line: usize = caps.get(1)?.as_str().parse().ok()?;
            let column: usize = caps.get(2)?.as_str().parse().ok()?;
            Some(Position { line, column })
        });

        #[cfg(feature = "tracing")]
        if result.is_none() && message.contains("Line") {
            trace!("no position recognized in parser message: {}", message);
        }

        result
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;

        if let Some(dialect) = self.dialect {
            write!(f, " ({dialect:?})")?;
        }

        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }

        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        let message = err.to_string();
        let position = Self::parse_position_from_message(&message);
        let lower = message.to_lowercase();
        let kind = if lower.contains("eof") || lower.contains("unexpected end") {
            ParseErrorKind::UnexpectedEof
        } else {
            ParseErrorKind::SyntaxError
        };

        Self {
            message,
            position,
            dialect: None,
            kind,
        }
    }
}
