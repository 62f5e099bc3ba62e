use super::push_join;
use crate::ast::{FullGrammarAst, GrammarColumns, GrammarExpr};
use crate::naming::{non_empty, split_qualified, strip_delimiters, strip_quotes};
use crate::types::{CanonicalStatement, ColumnRef, ComparisonOp, ProjectedColumn, WhereCondition};

pub(super) fn from_full_grammar(ast: &FullGrammarAst) -> CanonicalStatement {
    let select = &ast.ast;
    let mut statement = CanonicalStatement::default();

    for entry in &select.from {
        let table = strip_delimiters(&entry.table);
        if table.is_empty() {
            continue;
        }
        let alias = non_empty(entry.alias.clone()).map(|a| strip_delimiters(&a));

        if entry.join.is_some() || entry.on.is_some() {
            let (on_left, on_right) = entry
                .on
                .as_ref()
                .and_then(join_equality)
                .map_or((None, None), |(l, r)| (Some(l), Some(r)));
            push_join(&mut statement, table, alias, on_left, on_right);
        } else {
            statement.push_table(table, alias);
        }
    }

    if let GrammarColumns::List(columns) = &select.columns {
        statement.projected_columns = columns
            .iter()
            .filter_map(|column| {
                let reference = column_ref(&column.expr)?;
                (reference.column != "*").then(|| ProjectedColumn {
                    table: reference.table,
                    column: reference.column,
                    alias: non_empty(column.alias.clone()),
                })
            })
            .collect();
    }

    statement.where_condition = select.selection.as_ref().and_then(first_comparison);
    statement
}

fn column_ref(expr: &GrammarExpr) -> Option<ColumnRef> {
    if !expr.is_column_ref() {
        return None;
    }
    let column = expr.column_name()?;
    match non_empty(expr.table.clone()) {
        Some(table) => {
            let column = strip_delimiters(&column);
            (!column.is_empty()).then(|| ColumnRef::qualified(strip_delimiters(&table), column))
        }
        None => split_qualified(&column),
    }
}

fn is_logical(expr: &GrammarExpr, operators: &[&str]) -> bool {
    expr.is_binary()
        && expr
            .operator
            .as_deref()
            .is_some_and(|op| operators.iter().any(|o| o.eq_ignore_ascii_case(op.trim())))
}

/// First `<column> = <column>` found left to right through `AND`.
fn join_equality(expr: &GrammarExpr) -> Option<(ColumnRef, ColumnRef)> {
    if is_logical(expr, &["AND"]) {
        return expr
            .left
            .as_deref()
            .and_then(join_equality)
            .or_else(|| expr.right.as_deref().and_then(join_equality));
    }
    if !is_logical(expr, &["="]) {
        return None;
    }
    let left = column_ref(expr.left.as_deref()?)?;
    let right = column_ref(expr.right.as_deref()?)?;
    Some((left, right))
}

/// The leftmost comparison leaf under `AND`/`OR`.
fn first_comparison(expr: &GrammarExpr) -> Option<WhereCondition> {
    if is_logical(expr, &["AND", "OR"]) {
        return first_comparison(expr.left.as_deref()?);
    }
    if !expr.is_binary() {
        return None;
    }

    let operator: ComparisonOp = expr.operator.as_deref()?.parse().ok()?;
    let left = column_ref(expr.left.as_deref()?)?;
    let right = expr.right.as_deref()?;
    let literal = match column_ref(right) {
        Some(reference) => reference.to_string(),
        None => strip_quotes(&right.literal_text()?),
    };

    Some(WhereCondition {
        left,
        operator,
        literal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JoinClause, TableRef};
    use serde_json::json;

    fn normalize_json(value: serde_json::Value) -> CanonicalStatement {
        from_full_grammar(&serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_aliases_and_join_conditions() {
        let statement = normalize_json(json!({"ast": {
            "type": "select",
            "columns": [
                {"expr": {"type": "column_ref", "table": "o", "column": "total"}, "as": "amount"},
                {"expr": {"type": "aggr_func", "name": "COUNT"}, "as": "n"},
                {"expr": {"type": "column_ref", "table": null, "column": "u.name"}, "as": ""}
            ],
            "from": [
                {"db": null, "table": "users", "as": "u"},
                {"db": null, "table": "orders", "as": "o", "join": "LEFT JOIN",
                 "on": {"type": "binary_expr", "operator": "AND",
                        "left": {"type": "binary_expr", "operator": ">",
                                 "left": {"type": "column_ref", "table": "o", "column": "total"},
                                 "right": {"type": "number", "value": 0}},
                        "right": {"type": "binary_expr", "operator": "=",
                                  "left": {"type": "column_ref", "table": "u", "column": "id"},
                                  "right": {"type": "column_ref", "table": "o", "column": "user_id"}}}}
            ]
        }}));

        assert_eq!(
            statement.tables,
            vec![TableRef::aliased("users", "u"), TableRef::aliased("orders", "o")]
        );
        assert_eq!(
            statement.joins,
            vec![JoinClause {
                table: "orders".to_string(),
                alias: Some("o".to_string()),
                on_left: Some(ColumnRef::qualified("u", "id")),
                on_right: Some(ColumnRef::qualified("o", "user_id")),
            }]
        );
        assert_eq!(statement.projected_columns.len(), 2);
        assert_eq!(statement.projected_columns[0].alias.as_deref(), Some("amount"));
        assert_eq!(statement.projected_columns[1].table.as_deref(), Some("u"));
        assert_eq!(statement.projected_columns[1].alias, None);
        assert!(statement.where_condition.is_none());
    }

    #[test]
    fn test_join_without_equality_keeps_table() {
        let statement = normalize_json(json!({"ast": {
            "type": "select", "columns": "*",
            "from": [
                {"table": "a"},
                {"table": "b", "join": "CROSS JOIN", "on": null}
            ]
        }}));

        assert_eq!(statement.tables.len(), 2);
        assert_eq!(statement.joins[0].on_left, None);
        assert!(statement.projected_columns.is_empty());
    }

    #[test]
    fn test_where_uses_leftmost_comparison() {
        let statement = normalize_json(json!({"ast": {
            "type": "select", "columns": "*",
            "from": [{"table": "t"}],
            "where": {"type": "binary_expr", "operator": "OR",
                      "left": {"type": "binary_expr", "operator": "<>",
                               "left": {"type": "column_ref", "table": null, "column": "kind"},
                               "right": {"type": "single_quote_string", "value": "x"}},
                      "right": {"type": "binary_expr", "operator": "=",
                                "left": {"type": "column_ref", "table": "t", "column": "id"},
                                "right": {"type": "number", "value": 1}}}
        }}));

        let condition = statement.where_condition.unwrap();
        assert_eq!(condition.left, ColumnRef::unqualified("kind"));
        assert_eq!(condition.operator, ComparisonOp::NotEq);
        assert_eq!(condition.literal, "x");
    }

    #[test]
    fn test_unsupported_where_operator_is_dropped() {
        let statement = normalize_json(json!({"ast": {
            "type": "select", "columns": "*",
            "from": [{"table": "t"}],
            "where": {"type": "binary_expr", "operator": "LIKE",
                      "left": {"type": "column_ref", "table": "t", "column": "name"},
                      "right": {"type": "single_quote_string", "value": "a%"}}
        }}));
        assert!(statement.where_condition.is_none());
    }
}
