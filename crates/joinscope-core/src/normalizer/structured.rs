use serde_json::Value;

use super::push_join;
use crate::ast::{StructuredAst, StructuredOperand};
use crate::naming::{non_empty, split_qualified, strip_delimiters, strip_quotes};
use crate::types::{CanonicalStatement, ColumnRef, ComparisonOp, ProjectedColumn, WhereCondition};

pub(super) fn from_structured(ast: &StructuredAst) -> CanonicalStatement {
    let select = &ast.select;
    let mut statement = CanonicalStatement::default();

    for table in &select.from {
        statement.push_table(strip_delimiters(&table.table), alias(&table.alias));
    }

    for join in &select.join {
        let (on_left, on_right) = match &join.on {
            Some(on) => (
                on.left.as_ref().and_then(operand_ref),
                on.right.as_ref().and_then(operand_ref),
            ),
            None => (None, None),
        };
        push_join(
            &mut statement,
            strip_delimiters(&join.table),
            alias(&join.alias),
            on_left,
            on_right,
        );
    }

    statement.projected_columns = select
        .result_columns
        .iter()
        .filter_map(|column| {
            let reference = operand_ref(&column.expr)?;
            (reference.column != "*").then(|| ProjectedColumn {
                table: reference.table,
                column: reference.column,
                alias: non_empty(column.alias.clone()),
            })
        })
        .collect();

    statement.where_condition = select.where_clause.as_ref().and_then(first_predicate);
    statement
}

fn alias(alias: &Option<String>) -> Option<String> {
    non_empty(alias.clone()).map(|a| strip_delimiters(&a))
}

fn operand_ref(operand: &StructuredOperand) -> Option<ColumnRef> {
    let column = non_empty(operand.column.clone())?;
    match non_empty(operand.table.clone()) {
        Some(table) => Some(ColumnRef::qualified(
            strip_delimiters(&table),
            strip_delimiters(&column),
        )),
        None => split_qualified(&column),
    }
}

/// Walks down `left` until a node with a column on its left side and an
/// operator is found.
fn first_predicate(node: &Value) -> Option<WhereCondition> {
    let left = node.get("left")?;
    let Some(column) = value_ref(left) else {
        return first_predicate(left);
    };

    let operator: ComparisonOp = node.get("operator")?.as_str()?.parse().ok()?;
    let literal = literal_text(node.get("right")?)?;

    Some(WhereCondition {
        left: column,
        operator,
        literal,
    })
}

fn value_ref(value: &Value) -> Option<ColumnRef> {
    let operand: StructuredOperand = serde_json::from_value(value.clone()).ok()?;
    operand_ref(&operand)
}

fn literal_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "NULL".to_string(),
        Value::Object(map) => {
            if let Some(inner) = map.get("literal").or_else(|| map.get("value")) {
                return literal_text(inner);
            }
            return value_ref(value).map(|reference| reference.to_string());
        }
        Value::Array(_) => return None,
    };
    Some(strip_quotes(&text))
}
