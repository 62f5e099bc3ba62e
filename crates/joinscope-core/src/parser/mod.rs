//! Statement parsing: raw SQL text to a raw AST.
//!
//! [`StatementParser`] tries up to three parser slots in order:
//!
//! 1. an injected parser function ([`StatementParser::with_grammar_fn`]),
//! 2. an injected [`GrammarParser`] object ([`StatementParser::with_grammar`]),
//!    which is where the built-in [`SqlparserGrammar`] plugs in,
//! 3. the pattern-matching fallback ([`parse_fallback`]).
//!
//! An error or a panic in slot 1 or 2 moves on to the next slot. The fallback
//! cannot fail, so [`StatementParser::parse`] always returns an AST.

mod fallback;
mod grammar;

pub use fallback::parse_fallback;
pub use grammar::SqlparserGrammar;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::ast::RawAst;
use crate::error::{panic_message, ParseError, ParseErrorKind};
use crate::types::{Dialect, ParserKind};

/// A full-grammar SQL parser.
pub trait GrammarParser: Send + Sync {
    fn parse(&self, sql: &str) -> Result<RawAst, ParseError>;
}

type GrammarFn = dyn Fn(&str) -> Result<RawAst, ParseError> + Send + Sync;

/// Raw AST plus the slot that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub ast: RawAst,
    pub parser: ParserKind,
}

/// Ordered set of parser slots.
///
/// `StatementParser::default()` has no grammar slots and always uses the
/// fallback; [`StatementParser::for_dialect`] registers the built-in grammar.
#[derive(Default)]
pub struct StatementParser {
    grammar_fn: Option<Box<GrammarFn>>,
    grammar: Option<Box<dyn GrammarParser>>,
}

impl StatementParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser with the built-in sqlparser grammar for `dialect`.
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self::new().with_grammar(SqlparserGrammar::new(dialect))
    }

    /// Registers a parser function, tried before anything else.
    pub fn with_grammar_fn<F>(mut self, parse: F) -> Self
    where
        F: Fn(&str) -> Result<RawAst, ParseError> + Send + Sync + 'static,
    {
        self.grammar_fn = Some(Box::new(parse));
        self
    }

    /// Registers a parser object, replacing any earlier one.
    pub fn with_grammar<P>(mut self, parser: P) -> Self
    where
        P: GrammarParser + 'static,
    {
        self.grammar = Some(Box::new(parser));
        self
    }

    pub fn has_grammar(&self) -> bool {
        self.grammar_fn.is_some() || self.grammar.is_some()
    }

    /// Parses `sql` with the first slot that succeeds.
    pub fn parse(&self, sql: &str) -> ParseOutcome {
        if let Some(parse) = &self.grammar_fn {
            match guarded(|| parse(sql)) {
                Ok(ast) => {
                    return ParseOutcome {
                        ast,
                        parser: ParserKind::GrammarFn,
                    }
                }
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    debug!(error = %_err, "injected parser function failed, trying next parser");
                }
            }
        }

        if let Some(parser) = &self.grammar {
            match guarded(|| parser.parse(sql)) {
                Ok(ast) => {
                    return ParseOutcome {
                        ast,
                        parser: ParserKind::Grammar,
                    }
                }
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    debug!(error = %_err, "grammar parser failed, using fallback parser");
                }
            }
        }

        self.parse_fallback(sql)
    }

    /// Runs only the fallback slot.
    pub fn parse_fallback(&self, sql: &str) -> ParseOutcome {
        ParseOutcome {
            ast: parse_fallback(sql).into(),
            parser: ParserKind::Fallback,
        }
    }
}

impl fmt::Debug for StatementParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementParser")
            .field("grammar_fn", &self.grammar_fn.is_some())
            .field("grammar", &self.grammar.is_some())
            .finish()
    }
}

/// Parses `sql` with the built-in grammar (generic dialect), falling back to
/// pattern matching.
pub fn parse(sql: &str) -> RawAst {
    StatementParser::for_dialect(Dialect::Generic).parse(sql).ast
}

fn guarded<F>(call: F) -> Result<RawAst, ParseError>
where
    F: FnOnce() -> Result<RawAst, ParseError>,
{
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|payload| {
        Err(ParseError::new(panic_message(payload.as_ref())).with_kind(ParseErrorKind::ParserFailure))
    })
}
