//! Full-grammar AST shape: `{"ast": {"type": "select", ...}}`.
//!
//! This is the output convention of grammar-based SQL parsers. Joined tables
//! live in the `from` list and carry `join` and `on` keys. The built-in
//! sqlparser-backed parser emits this shape too, so JSON from an external
//! parser and the native parser take the same normalization path.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullGrammarAst {
    pub ast: GrammarSelect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarSelect {
    /// Statement kind, `"select"` for everything this crate handles
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub columns: GrammarColumns,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub from: Vec<GrammarFrom>,

    #[serde(default, rename = "where")]
    pub selection: Option<GrammarExpr>,
}

/// Either an explicit column list or the bare `"*"` marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GrammarColumns {
    List(Vec<GrammarColumn>),
    All(String),
}

impl Default for GrammarColumns {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarColumn {
    pub expr: GrammarExpr,
    #[serde(default, rename = "as")]
    pub alias: Option<String>,
}

/// A FROM entry. Entries with `join` set are joined tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarFrom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
    /// Empty for derived tables, which are skipped
    #[serde(default)]
    pub table: String,
    #[serde(default, rename = "as")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<GrammarExpr>,
}

/// Expression node. Only `column_ref` and `binary_expr` are interpreted;
/// every other `type` is carried as a literal via `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarExpr {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<GrammarExpr>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<GrammarExpr>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl GrammarExpr {
    pub const COLUMN_REF: &'static str = "column_ref";
    pub const BINARY_EXPR: &'static str = "binary_expr";

    pub fn column_ref(table: Option<String>, column: impl Into<String>) -> Self {
        Self {
            kind: Self::COLUMN_REF.to_string(),
            table,
            column: Some(Value::String(column.into())),
            operator: None,
            left: None,
            right: None,
            value: None,
        }
    }

    pub fn binary(operator: impl Into<String>, left: GrammarExpr, right: GrammarExpr) -> Self {
        Self {
            kind: Self::BINARY_EXPR.to_string(),
            table: None,
            column: None,
            operator: Some(operator.into()),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            value: None,
        }
    }

    pub fn literal(kind: impl Into<String>, value: Value) -> Self {
        Self {
            kind: kind.into(),
            table: None,
            column: None,
            operator: None,
            left: None,
            right: None,
            value: Some(value),
        }
    }

    pub fn is_column_ref(&self) -> bool {
        self.kind == Self::COLUMN_REF
    }

    pub fn is_binary(&self) -> bool {
        self.kind == Self::BINARY_EXPR
    }

    /// Column name of a `column_ref`. Newer grammar parsers wrap the name as
    /// `{"expr": {"type": "default", "value": "id"}}`; both forms are read.
    pub fn column_name(&self) -> Option<String> {
        match self.column.as_ref()? {
            Value::String(name) => Some(name.clone()),
            Value::Object(wrapper) => wrapper
                .get("expr")
                .and_then(|e| e.get("value"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }

    /// Literal text of a non-column expression.
    pub fn literal_text(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::String(text) => Some(text.clone()),
            Value::Null => Some("NULL".to_string()),
            other => Some(other.to_string()),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_grammar_parser_output() {
        let value = json!({
            "ast": {
                "type": "select",
                "columns": [
                    {"expr": {"type": "column_ref", "table": "u", "column": "id"}, "as": null},
                    {"expr": {"type": "aggr_func", "name": "COUNT"}, "as": "n"}
                ],
                "from": [
                    {"db": null, "table": "users", "as": "u"},
                    {"db": null, "table": "orders", "as": "o", "join": "INNER JOIN",
                     "on": {"type": "binary_expr", "operator": "=",
                            "left": {"type": "column_ref", "table": "u", "column": "id"},
                            "right": {"type": "column_ref", "table": "o", "column": "user_id"}}}
                ],
                "where": null
            }
        });
        let ast: FullGrammarAst = serde_json::from_value(value).unwrap();
        assert_eq!(ast.ast.from.len(), 2);
        assert_eq!(ast.ast.from[1].join.as_deref(), Some("INNER JOIN"));
        let GrammarColumns::List(columns) = &ast.ast.columns else {
            panic!("expected a column list");
        };
        assert_eq!(columns[0].expr.column_name().as_deref(), Some("id"));
        assert_eq!(columns[1].expr.kind, "aggr_func");
    }

    #[test]
    fn test_star_columns_and_null_from() {
        let ast: FullGrammarAst =
            serde_json::from_value(json!({"ast": {"type": "select", "columns": "*", "from": null}}))
                .unwrap();
        assert_eq!(ast.ast.columns, GrammarColumns::All("*".to_string()));
        assert!(ast.ast.from.is_empty());
    }

    #[test]
    fn test_wrapped_column_name() {
        let expr: GrammarExpr = serde_json::from_value(json!({
            "type": "column_ref", "table": null,
            "column": {"expr": {"type": "default", "value": "status"}}
        }))
        .unwrap();
        assert_eq!(expr.column_name().as_deref(), Some("status"));
    }
}
