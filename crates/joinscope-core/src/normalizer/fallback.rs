use super::push_join;
use crate::ast::FallbackAst;
use crate::naming::non_empty;
use crate::types::{CanonicalStatement, ProjectedColumn, WhereCondition};

pub(super) fn from_fallback(ast: &FallbackAst) -> CanonicalStatement {
    let mut statement = CanonicalStatement::default();

    for table in &ast.from {
        statement.push_table(table.table.trim(), non_empty(table.alias.clone()));
    }
    for join in &ast.join {
        push_join(
            &mut statement,
            join.table.trim().to_string(),
            non_empty(join.alias.clone()),
            join.left.clone(),
            join.right.clone(),
        );
    }

    statement.projected_columns = ast
        .select
        .iter()
        .map(|item| ProjectedColumn {
            table: non_empty(item.column.table.clone()),
            column: item.column.column.clone(),
            alias: non_empty(item.alias.clone()),
        })
        .collect();

    statement.where_condition = ast.predicate.as_ref().map(|predicate| WhereCondition {
        left: predicate.left.clone(),
        operator: predicate.operator,
        literal: predicate.literal.clone(),
    });

    statement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fallback;
    use crate::types::{ColumnRef, TableRef};

    #[test]
    fn test_from_tables_precede_join_tables() {
        let statement = from_fallback(&parse_fallback(
            "SELECT o.id AS order_id FROM orders o, items JOIN users u ON u.id = o.user_id",
        ));

        assert_eq!(
            statement.tables,
            vec![
                TableRef::aliased("orders", "o"),
                TableRef::new("items"),
                TableRef::aliased("users", "u"),
            ]
        );
        assert_eq!(statement.joins[0].alias.as_deref(), Some("u"));
        assert_eq!(statement.projected_columns[0].column_ref(), ColumnRef::qualified("o", "id"));
        assert_eq!(statement.projected_columns[0].alias.as_deref(), Some("order_id"));
    }

    #[test]
    fn test_empty_fallback_ast_gives_empty_statement() {
        assert!(from_fallback(&FallbackAst::default()).is_empty());
    }
}
