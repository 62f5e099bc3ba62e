//! Built-in grammar parser backed by `sqlparser`.
//!
//! The parsed statement is rendered into the full-grammar shape, the same
//! convention external grammar parsers hand over, so both take one
//! normalization path.

use serde_json::Value as JsonValue;
use sqlparser::ast::{
    Expr, JoinConstraint, JoinOperator, ObjectName, Select, SelectItem, SetExpr, Statement,
    TableFactor, Value,
};
use sqlparser::parser::Parser;

use super::GrammarParser;
use crate::ast::{FullGrammarAst, GrammarColumn, GrammarColumns, GrammarExpr, GrammarFrom, GrammarSelect, RawAst};
use crate::error::{ParseError, ParseErrorKind};
use crate::naming::{is_clause_keyword, strip_delimiters};
use crate::types::Dialect;

/// Grammar parser for one SQL dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlparserGrammar {
    dialect: Dialect,
}

impl SqlparserGrammar {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn unsupported(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message)
            .with_dialect(self.dialect)
            .with_kind(ParseErrorKind::UnsupportedStatement)
    }
}

impl GrammarParser for SqlparserGrammar {
    fn parse(&self, sql: &str) -> Result<RawAst, ParseError> {
        let dialect = self.dialect.to_sqlparser_dialect();
        let statements = Parser::parse_sql(dialect.as_ref(), sql)
            .map_err(|e| ParseError::from(e).with_dialect(self.dialect))?;

        let [statement] = statements.as_slice() else {
            return Err(self.unsupported(format!(
                "expected exactly one statement, found {}",
                statements.len()
            )));
        };
        let Statement::Query(query) = statement else {
            return Err(self.unsupported("statement is not a query"));
        };
        let SetExpr::Select(select) = query.body.as_ref() else {
            return Err(self.unsupported("query body is not a plain SELECT"));
        };

        Ok(FullGrammarAst {
            ast: convert_select(select),
        }
        .into())
    }
}

fn convert_select(select: &Select) -> GrammarSelect {
    let columns = match select.projection.as_slice() {
        [SelectItem::Wildcard(_)] => GrammarColumns::All("*".to_string()),
        items => GrammarColumns::List(items.iter().filter_map(convert_item).collect()),
    };

    let mut from = Vec::new();
    for table in &select.from {
        from.extend(convert_factor(&table.relation, None, None));
        for join in &table.joins {
            let on = join_on_expr(&join.join_operator).map(convert_expr);
            from.extend(convert_factor(
                &join.relation,
                Some(join_label(&join.join_operator)),
                on,
            ));
        }
    }

    GrammarSelect {
        kind: "select".to_string(),
        columns,
        from,
        selection: select.selection.as_ref().map(convert_expr),
    }
}

fn convert_item(item: &SelectItem) -> Option<GrammarColumn> {
    match item {
        SelectItem::UnnamedExpr(expr) => Some(GrammarColumn {
            expr: convert_expr(expr),
            alias: None,
        }),
        SelectItem::ExprWithAlias { expr, alias } => Some(GrammarColumn {
            expr: convert_expr(expr),
            alias: Some(alias.value.clone()),
        }),
        _ => None,
    }
}

/// Named tables only; derived tables, table functions and the like have no
/// name to draw.
fn convert_factor(
    factor: &TableFactor,
    join: Option<&str>,
    on: Option<GrammarExpr>,
) -> Option<GrammarFrom> {
    let TableFactor::Table { name, alias, .. } = factor else {
        return None;
    };
    if is_bare_keyword(name) {
        return None;
    }
    let mut parts = name_parts(name);
    let table = parts.pop()?;

    Some(GrammarFrom {
        db: parts.pop(),
        table,
        alias: alias.as_ref().map(|a| a.name.value.clone()),
        join: join.map(str::to_string),
        on,
    })
}

/// `FROM where` parses as a table named `where`, which is not a table.
fn is_bare_keyword(name: &ObjectName) -> bool {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .is_some_and(|ident| ident.quote_style.is_none() && is_clause_keyword(&ident.value))
}

fn name_parts(name: &ObjectName) -> Vec<String> {
    name.0
        .iter()
        .map(|part| {
            part.as_ident()
                .map(|ident| ident.value.clone())
                .unwrap_or_else(|| strip_delimiters(&part.to_string()))
        })
        .collect()
}

fn convert_expr(expr: &Expr) -> GrammarExpr {
    match expr {
        Expr::Identifier(ident) => GrammarExpr::column_ref(None, ident.value.clone()),
        Expr::CompoundIdentifier(parts) => match parts.as_slice() {
            [.., table, column] => {
                GrammarExpr::column_ref(Some(table.value.clone()), column.value.clone())
            }
            [column] => GrammarExpr::column_ref(None, column.value.clone()),
            [] => GrammarExpr::literal("expr", JsonValue::String(expr.to_string())),
        },
        Expr::BinaryOp { left, op, right } => {
            GrammarExpr::binary(op.to_string(), convert_expr(left), convert_expr(right))
        }
        Expr::Nested(inner) => convert_expr(inner),
        Expr::Value(value) => match &value.value {
            Value::SingleQuotedString(text) | Value::DoubleQuotedString(text) => {
                GrammarExpr::literal("single_quote_string", JsonValue::String(text.clone()))
            }
            Value::Number(number, _) => GrammarExpr::literal(
                "number",
                number
                    .parse::<serde_json::Number>()
                    .map(JsonValue::Number)
                    .unwrap_or_else(|_| JsonValue::String(number.to_string())),
            ),
            Value::Boolean(flag) => GrammarExpr::literal("bool", JsonValue::Bool(*flag)),
            Value::Null => GrammarExpr::literal("null", JsonValue::Null),
            other => GrammarExpr::literal("expr", JsonValue::String(other.to_string())),
        },
        other => GrammarExpr::literal("expr", JsonValue::String(other.to_string())),
    }
}

fn join_label(operator: &JoinOperator) -> &'static str {
    match operator {
        JoinOperator::Inner(_) => "INNER JOIN",
        JoinOperator::Left(_) | JoinOperator::LeftOuter(_) => "LEFT JOIN",
        JoinOperator::Right(_) | JoinOperator::RightOuter(_) => "RIGHT JOIN",
        JoinOperator::FullOuter(_) => "FULL JOIN",
        JoinOperator::CrossJoin(_) => "CROSS JOIN",
        _ => "JOIN",
    }
}

fn join_on_expr(operator: &JoinOperator) -> Option<&Expr> {
    let constraint = match operator {
        JoinOperator::Join(constraint)
        | JoinOperator::Inner(constraint)
        | JoinOperator::Left(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::Right(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::CrossJoin(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint)
        | JoinOperator::StraightJoin(constraint) => constraint,
        JoinOperator::AsOf { constraint, .. } => constraint,
        JoinOperator::CrossApply | JoinOperator::OuterApply => return None,
    };

    match constraint {
        JoinConstraint::On(expr) => Some(expr),
        _ => None,
    }
}
