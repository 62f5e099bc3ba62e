//! Raw statement shapes produced by parsers.
//!
//! Parsers disagree on how a SELECT looks. The three conventions this crate
//! understands are modelled as [`AstShape`]. Typed parsers hand over a shape
//! directly; parsers that speak JSON hand over [`RawAst::Json`], and the shape
//! is decided once, by [`RawAst::recognize`], in a fixed priority order:
//! full-grammar, then structured, then fallback.

mod fallback;
mod full_grammar;
mod structured;

pub use fallback::{FallbackAst, FallbackColumn, FallbackJoin, FallbackPredicate, FallbackTable};
pub use full_grammar::{FullGrammarAst, GrammarColumn, GrammarColumns, GrammarExpr, GrammarFrom, GrammarSelect};
pub use structured::{
    StructuredAst, StructuredColumn, StructuredJoin, StructuredOn, StructuredOperand,
    StructuredSelect, StructuredTable,
};

use crate::error::RecognitionError;
use serde_json::Value;

/// One of the recognized statement conventions.
#[derive(Debug, Clone, PartialEq)]
pub enum AstShape {
    /// `{"ast": {"type": "select", ...}}`
    FullGrammar(FullGrammarAst),
    /// `{"SELECT": {...}}`
    Structured(StructuredAst),
    /// Output of the built-in pattern-matching parser
    Fallback(FallbackAst),
}

impl AstShape {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FullGrammar(_) => "full-grammar",
            Self::Structured(_) => "structured",
            Self::Fallback(_) => "fallback",
        }
    }
}

/// Whatever a parser returned.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAst {
    Shaped(AstShape),
    /// Parser output whose shape is not known yet
    Json(Value),
}

impl RawAst {
    /// Decides the shape of the AST.
    pub fn recognize(self) -> Result<AstShape, RecognitionError> {
        match self {
            Self::Shaped(shape) => Ok(shape),
            Self::Json(value) => recognize_json(value),
        }
    }
}

impl From<FullGrammarAst> for RawAst {
    fn from(ast: FullGrammarAst) -> Self {
        Self::Shaped(AstShape::FullGrammar(ast))
    }
}

impl From<StructuredAst> for RawAst {
    fn from(ast: StructuredAst) -> Self {
        Self::Shaped(AstShape::Structured(ast))
    }
}

impl From<FallbackAst> for RawAst {
    fn from(ast: FallbackAst) -> Self {
        Self::Shaped(AstShape::Fallback(ast))
    }
}

impl From<Value> for RawAst {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

fn recognize_json(value: Value) -> Result<AstShape, RecognitionError> {
    let is_full_grammar = value
        .get("ast")
        .and_then(|ast| ast.get("type"))
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.eq_ignore_ascii_case("select"));

    if is_full_grammar {
        return serde_json::from_value(value)
            .map(AstShape::FullGrammar)
            .map_err(|e| RecognitionError::new(format!("malformed full-grammar AST: {e}")));
    }

    if value.get("SELECT").is_some_and(Value::is_object) {
        return serde_json::from_value(value)
            .map(AstShape::Structured)
            .map_err(|e| RecognitionError::new(format!("malformed structured AST: {e}")));
    }

    if value.get("select").is_some() || value.get("from").is_some() {
        return serde_json::from_value(value)
            .map(AstShape::Fallback)
            .map_err(|e| RecognitionError::new(format!("malformed fallback AST: {e}")));
    }

    Err(RecognitionError::new(describe(&value)))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Object(map) if map.is_empty() => "empty object".to_string(),
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(items) => format!("array of {} items", items.len()),
        Value::Null => "null".to_string(),
        other => format!("scalar {other}"),
    }
}
