//! Shape normalization: raw AST to [`CanonicalStatement`].
//!
//! The shape is decided once by [`RawAst::recognize`]; each shape then has
//! exactly one mapping function. Sub-shapes a mapping does not understand
//! (computed projections, non-equality join conditions, ...) are skipped.

mod fallback;
mod full_grammar;
mod structured;

use crate::ast::{AstShape, RawAst};
use crate::error::RecognitionError;
use crate::types::{CanonicalStatement, ColumnRef, JoinClause};
#[cfg(feature = "tracing")]
use tracing::{debug, info_span};

/// Recognizes and normalizes a raw AST.
pub fn normalize(raw: RawAst) -> Result<CanonicalStatement, RecognitionError> {
    let shape = raw.recognize()?;
    Ok(normalize_shape(&shape))
}

/// Normalizes an already recognized shape.
pub fn normalize_shape(shape: &AstShape) -> CanonicalStatement {
    #[cfg(feature = "tracing")]
    let _span = info_span!("normalize", shape = shape.name()).entered();

    let statement = match shape {
        AstShape::FullGrammar(ast) => full_grammar::from_full_grammar(ast),
        AstShape::Structured(ast) => structured::from_structured(ast),
        AstShape::Fallback(ast) => fallback::from_fallback(ast),
    };

    #[cfg(feature = "tracing")]
    debug!(
        tables = statement.tables.len(),
        joins = statement.joins.len(),
        columns = statement.projected_columns.len(),
        has_where = statement.where_condition.is_some(),
        "normalized statement"
    );

    statement
}

/// Registers a joined table and records the join with the alias that
/// survived registration.
fn push_join(
    statement: &mut CanonicalStatement,
    table: String,
    alias: Option<String>,
    on_left: Option<ColumnRef>,
    on_right: Option<ColumnRef>,
) {
    if table.trim().is_empty() {
        return;
    }
    statement.push_table(table.clone(), alias);
    let alias = statement
        .tables
        .last()
        .filter(|t| t.name == table)
        .and_then(|t| t.alias.clone());

    statement.joins.push(JoinClause {
        table,
        alias,
        on_left,
        on_right,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComparisonOp, TableRef};
    use serde_json::json;

    #[test]
    fn test_all_shapes_agree_on_reference_statement() {
        let full_grammar = json!({"ast": {
            "type": "select",
            "columns": [
                {"expr": {"type": "column_ref", "table": "users", "column": "id"}, "as": null},
                {"expr": {"type": "column_ref", "table": "orders", "column": "total"}, "as": null}
            ],
            "from": [
                {"db": null, "table": "users", "as": null},
                {"db": null, "table": "orders", "as": null, "join": "INNER JOIN",
                 "on": {"type": "binary_expr", "operator": "=",
                        "left": {"type": "column_ref", "table": "users", "column": "id"},
                        "right": {"type": "column_ref", "table": "orders", "column": "user_id"}}}
            ],
            "where": {"type": "binary_expr", "operator": "=",
                      "left": {"type": "column_ref", "table": "orders", "column": "status"},
                      "right": {"type": "single_quote_string", "value": "completed"}}
        }});
        let structured = json!({"SELECT": {
            "result_columns": [
                {"expr": {"type": "column", "table": "users", "column": "id"}},
                {"expr": {"type": "column", "table": "orders", "column": "total"}}
            ],
            "FROM": [{"table": "users", "as": ""}],
            "JOIN": [{"table": "orders", "as": "",
                      "ON": {"left": {"table": "users", "column": "id"},
                             "right": {"table": "orders", "column": "user_id"}}}],
            "WHERE": {"left": {"table": "orders", "column": "status"}, "operator": "=",
                      "right": {"type": "literal", "literal": "completed"}}
        }});
        let fallback = json!({
            "select": [{"table": "users", "column": "id"}, {"table": "orders", "column": "total"}],
            "from": [{"table": "users"}],
            "join": [{"table": "orders",
                      "left": {"table": "users", "column": "id"},
                      "right": {"table": "orders", "column": "user_id"}}],
            "where": {"left": {"table": "orders", "column": "status"}, "operator": "=",
                      "literal": "completed"}
        });

        let statements: Vec<CanonicalStatement> = [full_grammar, structured, fallback]
            .into_iter()
            .map(|value| normalize(RawAst::from(value)).unwrap())
            .collect();

        for statement in &statements {
            assert_eq!(
                statement.tables,
                vec![TableRef::new("users"), TableRef::new("orders")]
            );
            assert_eq!(statement.joins.len(), 1);
            assert_eq!(
                statement.joins[0].on_right,
                Some(ColumnRef::qualified("orders", "user_id"))
            );
            assert_eq!(statement.projected_columns.len(), 2);
            let condition = statement.where_condition.as_ref().unwrap();
            assert_eq!(condition.operator, ComparisonOp::Eq);
            assert_eq!(condition.literal, "completed");
        }
        assert_eq!(statements[0], statements[1]);
        assert_eq!(statements[1], statements[2]);
    }

    #[test]
    fn test_unrecognized_shape_is_an_error() {
        let err = normalize(RawAst::from(json!({"rows": []}))).unwrap_err();
        assert!(err.to_string().contains("rows"));
    }

    #[test]
    fn test_push_join_keeps_surviving_alias() {
        let mut statement = CanonicalStatement::default();
        statement.push_table("users", Some("u".to_string()));
        push_join(&mut statement, "orders".into(), Some("u".into()), None, None);
        push_join(&mut statement, " ".into(), None, None, None);

        assert_eq!(statement.tables.len(), 2);
        assert_eq!(statement.joins.len(), 1);
        assert_eq!(statement.joins[0].alias, None);
    }
}
