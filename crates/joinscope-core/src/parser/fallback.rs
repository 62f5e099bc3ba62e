//! Pattern-matching parser used when no grammar parser is available or the
//! grammar parser rejected the statement.
//!
//! This is not a grammar. It looks for `SELECT ... FROM`, `FROM <table>`,
//! `JOIN <table> ON <a> = <b>` and the first `WHERE` comparison, case
//! insensitively, and ignores everything it does not understand. Keywords
//! inside parentheses, string literals or comments are skipped, so derived
//! tables and function arguments do not produce phantom tables.
//!
//! The parser never fails and never panics: on input it cannot make sense of
//! it returns an empty [`FallbackAst`].

use regex::{Match, Regex};
use std::sync::OnceLock;
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::ast::{FallbackAst, FallbackColumn, FallbackJoin, FallbackPredicate, FallbackTable};
use crate::naming::{is_clause_keyword, split_qualified, strip_delimiters, strip_quotes};
use crate::types::ColumnRef;

static SELECT_KEYWORD: OnceLock<Regex> = OnceLock::new();
static FROM_KEYWORD: OnceLock<Regex> = OnceLock::new();
static JOIN_KEYWORD: OnceLock<Regex> = OnceLock::new();
static ON_KEYWORD: OnceLock<Regex> = OnceLock::new();
static WHERE_KEYWORD: OnceLock<Regex> = OnceLock::new();
static FROM_END: OnceLock<Regex> = OnceLock::new();
static JOIN_END: OnceLock<Regex> = OnceLock::new();
static WHERE_END: OnceLock<Regex> = OnceLock::new();
static SELECT_MODIFIER: OnceLock<Regex> = OnceLock::new();
static COLUMN_ALIAS: OnceLock<Regex> = OnceLock::new();
static CONJUNCTION: OnceLock<Regex> = OnceLock::new();
static COMPARISON: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("Invalid regex pattern"))
}

/// Parses `sql` by pattern matching.
pub fn parse_fallback(sql: &str) -> FallbackAst {
    let sql = strip_comments(sql);
    let text = sql.trim().trim_end_matches(';').trim_end();

    let ast = FallbackAst {
        select: select_list(text),
        from: from_tables(text),
        join: join_clauses(text),
        predicate: where_predicate(text),
    };

    #[cfg(feature = "tracing")]
    debug!(
        columns = ast.select.len(),
        tables = ast.from.len(),
        joins = ast.join.len(),
        has_where = ast.predicate.is_some(),
        "fallback parser finished"
    );

    ast
}

fn select_list(text: &str) -> Vec<FallbackColumn> {
    let Some(select) = top_level(pattern(&SELECT_KEYWORD, r"(?i)\bselect\s+"), text)
        .into_iter()
        .next()
    else {
        return Vec::new();
    };
    let Some(from) = top_level(pattern(&FROM_KEYWORD, r"(?i)\bfrom\b"), text)
        .into_iter()
        .find(|m| m.start() >= select.end())
    else {
        return Vec::new();
    };

    let list = &text[select.end()..from.start()];
    let list = pattern(&SELECT_MODIFIER, r"(?i)^\s*(?:distinct|all)\s+").replace(list, "");

    split_top_level(&list, ',')
        .into_iter()
        .filter_map(select_item)
        .collect()
}

/// One SELECT list entry. Only plain (optionally qualified) column
/// references are kept; wildcards and computed expressions are skipped.
fn select_item(item: &str) -> Option<FallbackColumn> {
    let item = item.trim();
    if item.is_empty() {
        return None;
    }

    let column_alias = pattern(
        &COLUMN_ALIAS,
        r#"(?is)^(.*?)\s+as\s+(\S+|"[^"]*"|`[^`]*`|\[[^\]]*\])$"#,
    );
    let (expr, alias) = match column_alias.captures(item) {
        Some(caps) => (
            caps.get(1)?.as_str().trim(),
            Some(strip_delimiters(caps.get(2)?.as_str())),
        ),
        None => match item.split_whitespace().collect::<Vec<_>>().as_slice() {
            [expr, alias] if is_identifier(alias) => (*expr, Some(strip_delimiters(alias))),
            _ => (item, None),
        },
    };

    if !is_column_path(expr) {
        return None;
    }
    let column = split_qualified(expr)?;
    if column.column == "*" {
        return None;
    }

    Some(FallbackColumn {
        column,
        alias: alias.filter(|a| !a.is_empty()),
    })
}

fn from_tables(text: &str) -> Vec<FallbackTable> {
    let end_of_list = pattern(
        &FROM_END,
        r"(?i)\b(?:inner|left|right|full|cross|outer|natural|join|where|group|order|limit|having|union|window|qualify)\b|\)",
    );

    top_level(pattern(&FROM_KEYWORD, r"(?i)\bfrom\b"), text)
        .into_iter()
        .flat_map(|keyword| {
            let rest = &text[keyword.end()..];
            let end = first_top_level(end_of_list, rest).map_or(rest.len(), |m| m.start());
            split_top_level(&rest[..end], ',')
                .into_iter()
                .filter_map(table_item)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// `name [[AS] alias]`. Derived tables (leading parenthesis) are skipped.
fn table_item(item: &str) -> Option<FallbackTable> {
    let item = item.trim();
    if item.starts_with('(') {
        return None;
    }

    let mut tokens = item.split_whitespace();
    let name = strip_delimiters(tokens.next()?);
    if !is_table_name(&name) {
        return None;
    }
    // `schema.table` names the table by its last segment.
    let table = name.rsplit('.').next().unwrap_or_default().to_string();
    if table.is_empty() {
        return None;
    }

    let alias = match tokens.next() {
        Some(token) if token.eq_ignore_ascii_case("as") => tokens.next(),
        other => other,
    }
    .map(strip_delimiters)
    .filter(|alias| is_identifier(alias));

    Some(FallbackTable { table, alias })
}

fn join_clauses(text: &str) -> Vec<FallbackJoin> {
    let end_of_clause = pattern(
        &JOIN_END,
        r"(?i)\b(?:inner|left|right|full|cross|outer|natural|join|where|group|order|limit|having|union|window|qualify)\b",
    );
    let on_keyword = pattern(&ON_KEYWORD, r"(?i)\bon\b");

    top_level(pattern(&JOIN_KEYWORD, r"(?i)\bjoin\s+"), text)
        .into_iter()
        .filter_map(|keyword| {
            let rest = &text[keyword.end()..];
            let end = first_top_level(end_of_clause, rest).map_or(rest.len(), |m| m.start());
            let clause = &rest[..end];

            let (head, condition) = match first_top_level(on_keyword, clause) {
                Some(on) => (&clause[..on.start()], Some(&clause[on.end()..])),
                None => (clause, None),
            };

            let FallbackTable { table, alias } = table_item(head)?;
            let (left, right) = condition.map(join_condition).unwrap_or_default();

            Some(FallbackJoin {
                table,
                alias,
                left,
                right,
            })
        })
        .collect()
}

/// Reads `<a> = <b>` from the first conjunct of an ON condition. Each side is
/// kept only if it is a plain column reference.
fn join_condition(condition: &str) -> (Option<ColumnRef>, Option<ColumnRef>) {
    let cleaned: String = condition
        .chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .collect();
    let first = conjunction().split(&cleaned).next().unwrap_or_default();

    match first.split_once('=') {
        Some((left, right)) => (join_side(left), join_side(right)),
        None => (None, None),
    }
}

fn join_side(side: &str) -> Option<ColumnRef> {
    let side = side.trim();
    if side.contains(['<', '>', '!']) || !is_column_path(side) {
        return None;
    }
    split_qualified(side)
}

fn where_predicate(text: &str) -> Option<FallbackPredicate> {
    let keyword = top_level(pattern(&WHERE_KEYWORD, r"(?i)\bwhere\b"), text)
        .into_iter()
        .next()?;
    let rest = &text[keyword.end()..];
    let end = first_top_level(
        pattern(
            &WHERE_END,
            r"(?i)\b(?:group|order|limit|having|union|window|qualify)\b",
        ),
        rest,
    )
    .map_or(rest.len(), |m| m.start());

    // Only the first AND/OR fragment is read.
    let first = conjunction().split(rest[..end].trim()).next()?;
    let first = first.trim().trim_start_matches('(').trim_end_matches(')');

    let caps = pattern(
        &COMPARISON,
        r"^\s*([^<>=!]+?)\s*(<=|>=|!=|<>|=|<|>)\s*([^<>=!]+?)\s*$",
    )
    .captures(first)?;

    let left = caps.get(1)?.as_str().trim();
    if !is_column_path(left) {
        return None;
    }

    Some(FallbackPredicate {
        left: split_qualified(left)?,
        operator: caps.get(2)?.as_str().parse().ok()?,
        literal: strip_quotes(caps.get(3)?.as_str()),
    })
}

fn conjunction() -> &'static Regex {
    pattern(&CONJUNCTION, r"(?i)\s+(?:and|or)\s+")
}

/// Matches of `re` that are outside parentheses and string literals.
fn top_level<'t>(re: &Regex, text: &'t str) -> Vec<Match<'t>> {
    re.find_iter(text)
        .filter(|m| is_top_level(&text[..m.start()]))
        .collect()
}

fn first_top_level<'t>(re: &Regex, text: &'t str) -> Option<Match<'t>> {
    re.find_iter(text).find(|m| is_top_level(&text[..m.start()]))
}

/// Replaces `-- ...` and `/* ... */` comments outside string literals with a
/// single space. Line breaks ending a `--` comment are kept.
fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(open), c) if c == open => {
                quote = None;
                out.push(c);
            }
            (Some(_), c) => out.push(c),
            (None, '\'' | '"' | '`') => {
                quote = Some(c);
                out.push(c);
            }
            (None, '-') if chars.peek() == Some(&'-') => {
                while chars.next_if(|&next| next != '\n').is_some() {}
                out.push(' ');
            }
            (None, '/') if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
                out.push(' ');
            }
            (None, c) => out.push(c),
        }
    }
    out
}

fn is_top_level(prefix: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in prefix.chars() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, _) => {}
        }
    }
    depth == 0 && quote.is_none()
}

/// Splits on `separator` where it is not nested in parentheses or quotes.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            (None, _) => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn is_identifier(word: &str) -> bool {
    let word = strip_delimiters(word);
    !word.is_empty()
        && !is_clause_keyword(&word)
        && word.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '$'))
}

fn is_table_name(name: &str) -> bool {
    !name.is_empty()
        && !is_clause_keyword(name)
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

/// `col`, `t.col`, `schema.t.col`, `t.*`, with optional delimiters.
fn is_column_path(expr: &str) -> bool {
    !expr.is_empty()
        && !is_clause_keyword(expr)
        && !expr.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && expr.chars().all(|c| {
            c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '*' | '"' | '`' | '[' | ']')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComparisonOp;

    fn table(name: &str, alias: Option<&str>) -> FallbackTable {
        FallbackTable {
            table: name.to_string(),
            alias: alias.map(str::to_string),
        }
    }

    #[test]
    fn test_reference_statement() {
        let ast = parse_fallback(
            "SELECT users.id, orders.total FROM users JOIN orders ON users.id = orders.user_id \
             WHERE orders.status = 'completed'",
        );

        assert_eq!(ast.from, vec![table("users", None)]);
        assert_eq!(ast.select.len(), 2);
        assert_eq!(ast.select[1].column, ColumnRef::qualified("orders", "total"));
        assert_eq!(ast.join.len(), 1);
        assert_eq!(ast.join[0].table, "orders");
        assert_eq!(ast.join[0].left, Some(ColumnRef::qualified("users", "id")));
        assert_eq!(ast.join[0].right, Some(ColumnRef::qualified("orders", "user_id")));

        let predicate = ast.predicate.unwrap();
        assert_eq!(predicate.left, ColumnRef::qualified("orders", "status"));
        assert_eq!(predicate.operator, ComparisonOp::Eq);
        assert_eq!(predicate.literal, "completed");
    }

    #[test]
    fn test_aliases_with_and_without_as() {
        let ast = parse_fallback(
            "select o.total as amount, u.name uname from Orders AS o \
             left join [users] u on o.user_id = u.id",
        );

        assert_eq!(ast.from, vec![table("Orders", Some("o"))]);
        assert_eq!(ast.join[0].table, "users");
        assert_eq!(ast.join[0].alias.as_deref(), Some("u"));
        assert_eq!(ast.select[0].alias.as_deref(), Some("amount"));
        assert_eq!(ast.select[1].alias.as_deref(), Some("uname"));
        assert_eq!(ast.select[1].column, ColumnRef::qualified("u", "name"));
    }

    #[test]
    fn test_comma_separated_from_list() {
        let ast = parse_fallback("SELECT * FROM a, b x WHERE a.id = 1");
        assert_eq!(ast.from, vec![table("a", None), table("b", Some("x"))]);
        assert!(ast.select.is_empty());
    }

    #[test]
    fn test_keyword_after_table_is_not_an_alias() {
        let ast = parse_fallback("SELECT id FROM users WHERE id > 3 ORDER BY id");
        assert_eq!(ast.from, vec![table("users", None)]);
        let predicate = ast.predicate.unwrap();
        assert_eq!(predicate.operator, ComparisonOp::Gt);
        assert_eq!(predicate.literal, "3");
    }

    #[test]
    fn test_multiple_joins_stop_at_next_join() {
        let ast = parse_fallback(
            "SELECT a.x FROM a INNER JOIN b ON a.id = b.a_id LEFT OUTER JOIN c ON b.id = c.b_id",
        );
        assert_eq!(ast.join.len(), 2);
        assert_eq!(ast.join[0].right, Some(ColumnRef::qualified("b", "a_id")));
        assert_eq!(ast.join[1].table, "c");
        assert_eq!(ast.join[1].left, Some(ColumnRef::qualified("b", "id")));
    }

    #[test]
    fn test_join_condition_reads_first_conjunct() {
        let ast = parse_fallback("SELECT 1 FROM a JOIN b ON (a.id = b.a_id AND b.kind = 'x')");
        assert_eq!(ast.join[0].left, Some(ColumnRef::qualified("a", "id")));
        assert_eq!(ast.join[0].right, Some(ColumnRef::qualified("b", "a_id")));
    }

    #[test]
    fn test_malformed_join_condition_keeps_extractable_half() {
        let ast = parse_fallback("SELECT 1 FROM a JOIN b ON a.id >= b.a_id");
        assert_eq!(ast.join[0].left, None);
        assert_eq!(ast.join[0].right, Some(ColumnRef::qualified("b", "a_id")));

        let ast = parse_fallback("SELECT 1 FROM a JOIN b USING (id)");
        assert_eq!(ast.join[0].table, "b");
        assert_eq!(ast.join[0].alias, None);
        assert_eq!((ast.join[0].left.clone(), ast.join[0].right.clone()), (None, None));
    }

    #[test]
    fn test_unqualified_join_side() {
        let ast = parse_fallback("SELECT 1 FROM a JOIN b ON id = b.a_id");
        assert_eq!(ast.join[0].left, Some(ColumnRef::unqualified("id")));
    }

    #[test]
    fn test_where_reads_only_first_fragment() {
        let ast = parse_fallback("SELECT id FROM t WHERE t.kind <> 'a' AND t.size > 3 OR t.x = 1");
        let predicate = ast.predicate.unwrap();
        assert_eq!(predicate.left, ColumnRef::qualified("t", "kind"));
        assert_eq!(predicate.operator, ComparisonOp::NotEq);
        assert_eq!(predicate.literal, "a");
    }

    #[test]
    fn test_unmatched_where_is_absent() {
        assert!(parse_fallback("SELECT id FROM t WHERE t.deleted IS NULL").predicate.is_none());
        assert!(parse_fallback("SELECT id FROM t WHERE lower(t.name) = 'x'").predicate.is_none());
    }

    #[test]
    fn test_nested_keywords_are_ignored() {
        let ast = parse_fallback(
            "SELECT EXTRACT(year FROM o.created) AS y, o.id FROM (SELECT * FROM raw) o \
             JOIN users u ON u.id = o.user_id WHERE u.name = 'from x'",
        );
        assert!(ast.from.is_empty());
        assert_eq!(ast.select.len(), 1);
        assert_eq!(ast.select[0].column, ColumnRef::qualified("o", "id"));
        assert_eq!(ast.join[0].table, "users");
        assert_eq!(ast.predicate.unwrap().literal, "from x");
    }

    #[test]
    fn test_wildcards_and_expressions_are_skipped() {
        let ast = parse_fallback("SELECT DISTINCT u.*, COUNT(*) AS n, u.id + 1, u.name FROM users u");
        assert_eq!(ast.select.len(), 1);
        assert_eq!(ast.select[0].column, ColumnRef::qualified("u", "name"));
    }

    #[test]
    fn test_broken_statements_yield_empty_ast() {
        assert!(parse_fallback("").is_empty());
        assert!(parse_fallback("SELECT FROM WHERE").is_empty());
        assert!(parse_fallback("hello world").is_empty());
        assert!(parse_fallback(";;;").is_empty());
    }

    #[test]
    fn test_trailing_semicolon_and_newlines() {
        let ast = parse_fallback("select\n  id\nfrom\n  users;\n");
        assert_eq!(ast.from, vec![table("users", None)]);
        assert_eq!(ast.select[0].column, ColumnRef::unqualified("id"));
    }

    #[test]
    fn test_quoted_column_alias_keeps_column() {
        let ast = parse_fallback(
            "SELECT o.total AS \"Order Total\", o.id AS [Order Id], o.note FROM orders o",
        );
        assert_eq!(ast.select.len(), 3);
        assert_eq!(ast.select[0].column, ColumnRef::qualified("o", "total"));
        assert_eq!(ast.select[0].alias.as_deref(), Some("Order Total"));
        assert_eq!(ast.select[1].alias.as_deref(), Some("Order Id"));
        assert_eq!(ast.select[2].alias, None);
    }

    #[test]
    fn test_clause_keywords_inside_literals_do_not_end_clauses() {
        let ast = parse_fallback("SELECT t.id FROM t WHERE t.note = 'in order'");
        assert_eq!(ast.predicate.unwrap().literal, "in order");

        let ast = parse_fallback("SELECT t.id FROM t WHERE t.note = 'a limit b' ORDER BY t.id");
        assert_eq!(ast.predicate.unwrap().literal, "a limit b");

        let ast = parse_fallback("SELECT 1 FROM a JOIN b ON a.kind = 'left join' WHERE a.id = 1");
        assert_eq!(ast.join.len(), 1);
        assert_eq!(ast.join[0].table, "b");
        assert_eq!(ast.predicate.unwrap().left, ColumnRef::qualified("a", "id"));
    }

    #[test]
    fn test_comments_are_ignored() {
        let ast = parse_fallback("SELECT a.x -- don't\nFROM a JOIN b ON a.id = b.a_id");
        assert_eq!(ast.from, vec![table("a", None)]);
        assert_eq!(ast.join[0].table, "b");
        assert_eq!(ast.join[0].right, Some(ColumnRef::qualified("b", "a_id")));

        let ast = parse_fallback("SELECT a.x /* it's FROM c */ FROM a WHERE a.x = '--kept'");
        assert_eq!(ast.from, vec![table("a", None)]);
        assert_eq!(ast.predicate.unwrap().literal, "--kept");
    }

    #[test]
    fn test_schema_qualified_tables_use_last_segment() {
        let ast = parse_fallback(
            "SELECT orders.id FROM sales.orders JOIN [sales].[users] u ON orders.user_id = u.id",
        );
        assert_eq!(ast.from, vec![table("orders", None)]);
        assert_eq!(ast.join[0].table, "users");
        assert_eq!(ast.join[0].alias.as_deref(), Some("u"));
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("a, f(b, c), 'x,y'", ','),
            vec!["a", " f(b, c)", " 'x,y'"]
        );
    }
}
