//! Output shape of the built-in pattern-matching parser.
//!
//! Flat, lower-case keys (`select`, `from`, `join`, `where`). Identifiers are
//! already stripped of delimiters and split into qualifier and column.

use serde::{Deserialize, Serialize};

use crate::types::{ColumnRef, ComparisonOp};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackAst {
    #[serde(default)]
    pub select: Vec<FallbackColumn>,

    #[serde(default)]
    pub from: Vec<FallbackTable>,

    #[serde(default)]
    pub join: Vec<FallbackJoin>,

    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub predicate: Option<FallbackPredicate>,
}

impl FallbackAst {
    pub fn is_empty(&self) -> bool {
        self.select.is_empty() && self.from.is_empty() && self.join.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackColumn {
    #[serde(flatten)]
    pub column: ColumnRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackTable {
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// A matched JOIN clause; either half of the ON equality may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackJoin {
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<ColumnRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<ColumnRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPredicate {
    pub left: ColumnRef,
    pub operator: ComparisonOp,
    pub literal: String,
}
