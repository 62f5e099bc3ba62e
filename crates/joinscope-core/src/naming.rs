//! Identifier helpers shared by the parsers and the normalizer.

use crate::types::ColumnRef;

/// Words that end a table reference instead of naming or aliasing it.
const CLAUSE_KEYWORDS: &[&str] = &[
    "as", "on", "using", "where", "join", "inner", "left", "right", "full", "cross", "outer",
    "natural", "group", "order", "limit", "having", "union", "window", "qualify", "lateral",
    "select", "from", "and", "or",
];

pub(crate) fn is_clause_keyword(word: &str) -> bool {
    CLAUSE_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

/// Removes `[`, `]`, `"` and backtick delimiters and surrounding whitespace.
pub(crate) fn strip_delimiters(ident: &str) -> String {
    ident
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '"' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Splits `table.column` (or `schema.table.column`) into a column reference.
///
/// The last segment is the column and the one before it the qualifier. Text
/// without a `.` is an unqualified column. Returns `None` for blank input.
pub(crate) fn split_qualified(expr: &str) -> Option<ColumnRef> {
    let parts: Vec<String> = expr.trim().split('.').map(strip_delimiters).collect();
    let (column, qualifier) = match parts.as_slice() {
        [] => return None,
        [column] => (column.clone(), None),
        [.., table, column] => (column.clone(), Some(table.clone())),
    };
    if column.is_empty() {
        return None;
    }
    Some(ColumnRef {
        table: qualifier.filter(|t| !t.is_empty()),
        column,
    })
}

/// Treats empty strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Removes one pair of matching single or double quotes around a literal.
pub(crate) fn strip_quotes(literal: &str) -> String {
    let trimmed = literal.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}
