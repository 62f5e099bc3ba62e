//! The canonical statement model.
//!
//! Every recognized parser output is mapped onto [`CanonicalStatement`] before
//! graph construction, so the builder never sees which parser produced it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized description of one SELECT statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalStatement {
    /// Tables from FROM and JOIN clauses, first FROM table first
    pub tables: Vec<TableRef>,

    /// One entry per JOIN clause
    pub joins: Vec<JoinClause>,

    /// Columns of the SELECT list, in order
    pub projected_columns: Vec<ProjectedColumn>,

    /// The first comparison of the WHERE clause, if one could be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_condition: Option<WhereCondition>,
}

impl CanonicalStatement {
    /// Appends a table reference.
    ///
    /// Blank names are ignored. An alias that repeats the table name or an
    /// alias already bound earlier in the statement is dropped, keeping alias
    /// strings unique within `tables`.
    pub fn push_table(&mut self, name: impl Into<String>, alias: Option<String>) {
        let name = name.into();
        if name.trim().is_empty() {
            return;
        }
        let alias = alias.filter(|alias| {
            !alias.is_empty()
                && *alias != name
                && !self
                    .tables
                    .iter()
                    .any(|t| t.alias.as_deref() == Some(alias.as_str()))
        });
        self.tables.push(TableRef { name, alias });
    }

    /// True when nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.joins.is_empty()
            && self.projected_columns.is_empty()
            && self.where_condition.is_none()
    }
}

/// A table named in FROM or JOIN, with its optional alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

/// A possibly table-qualified column reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRef {
    /// Table name or alias as written; `None` when unqualified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: Option<&str>, column: impl Into<String>) -> Self {
        Self {
            table: table.map(str::to_string),
            column: column.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    pub fn unqualified(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// One JOIN clause.
///
/// Either side of the ON equality may be missing when it could not be read;
/// the graph builder discards such joins as relations but still registers the
/// joined table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinClause {
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_left: Option<ColumnRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_right: Option<ColumnRef>,
}

/// A column from the SELECT list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ProjectedColumn {
    pub fn column_ref(&self) -> ColumnRef {
        ColumnRef {
            table: self.table.clone(),
            column: self.column.clone(),
        }
    }
}

/// `<column> <op> <literal>`, the only WHERE form the graph cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhereCondition {
    pub left: ColumnRef,
    pub operator: ComparisonOp,
    /// Right-hand side with surrounding quotes removed
    pub literal: String,
}

/// Comparison operators recognized in WHERE predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ComparisonOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">=")]
    GtEq,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
        }
    }
}

impl FromStr for ComparisonOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(Self::Eq),
            "!=" | "<>" => Ok(Self::NotEq),
            "<" => Ok(Self::Lt),
            ">" => Ok(Self::Gt),
            "<=" => Ok(Self::LtEq),
            ">=" => Ok(Self::GtEq),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
