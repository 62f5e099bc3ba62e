//! Structured AST shape: `{"SELECT": {"FROM": [...], "JOIN": [...], ...}}`.
//!
//! Clause keys are upper case; aliases use `as` with an empty string meaning
//! "no alias". Join conditions are already split into `left`/`right`
//! operands.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredAst {
    #[serde(rename = "SELECT")]
    pub select: StructuredSelect,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredSelect {
    #[serde(default)]
    pub result_columns: Vec<StructuredColumn>,

    #[serde(default, rename = "FROM")]
    pub from: Vec<StructuredTable>,

    #[serde(default, rename = "JOIN")]
    pub join: Vec<StructuredJoin>,

    /// Kept untyped: predicates may nest arbitrarily under `left`/`right`
    #[serde(default, rename = "WHERE")]
    pub where_clause: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredColumn {
    pub expr: StructuredOperand,
    #[serde(default, rename = "as")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredTable {
    pub table: String,
    #[serde(default, rename = "as")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredJoin {
    pub table: String,
    #[serde(default, rename = "as")]
    pub alias: Option<String>,
    #[serde(default, rename = "ON")]
    pub on: Option<StructuredOn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredOn {
    #[serde(default)]
    pub left: Option<StructuredOperand>,
    #[serde(default)]
    pub right: Option<StructuredOperand>,
}

/// A column operand; `column` may itself hold `table.column`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredOperand {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub column: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_structured_output() {
        let ast: StructuredAst = serde_json::from_value(json!({
            "SELECT": {
                "result_columns": [
                    {"expr": {"type": "column", "table": "o", "column": "total"}, "as": "amount"}
                ],
                "FROM": [{"table": "users", "as": ""}],
                "JOIN": [{"table": "orders", "as": "o",
                          "ON": {"left": {"table": "users", "column": "id"},
                                 "right": {"table": "o", "column": "user_id"}}}],
                "WHERE": {"left": {"table": "o", "column": "status"}, "operator": "=",
                          "right": {"type": "literal", "literal": "completed"}}
            }
        }))
        .unwrap();

        assert_eq!(ast.select.from[0].alias.as_deref(), Some(""));
        assert_eq!(ast.select.join[0].alias.as_deref(), Some("o"));
        let on = ast.select.join[0].on.as_ref().unwrap();
        assert_eq!(on.right.as_ref().unwrap().column.as_deref(), Some("user_id"));
        assert!(ast.select.where_clause.is_some());
    }

    #[test]
    fn test_missing_clauses_default_to_empty() {
        let ast: StructuredAst = serde_json::from_value(json!({"SELECT": {}})).unwrap();
        assert!(ast.select.result_columns.is_empty());
        assert!(ast.select.join.is_empty());
        assert!(ast.select.where_clause.is_none());
    }
}
