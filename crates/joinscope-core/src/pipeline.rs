//! End-to-end entry points: SQL text (or a host-parsed AST) to a graph.

use std::collections::BTreeMap;
#[cfg(feature = "tracing")]
use tracing::{debug, info_span};

use crate::ast::RawAst;
use crate::builder::build_graph;
use crate::error::InputError;
use crate::normalizer::normalize;
use crate::parser::{ParseOutcome, StatementParser};
use crate::types::{
    CanonicalStatement, Dialect, Graph, GraphOptions, GraphRequest, GraphResult, ParserKind,
    ParserPreference,
};

/// Main entry point: turns one SQL statement into a relationship graph.
///
/// Only blank input is an error. Parser failures fall through to the
/// fallback parser and construction failures become a diagnostic graph.
///
/// # Example
///
/// ```
/// use joinscope_core::{generate_graph, GraphRequest, LinkType};
///
/// let request = GraphRequest::new(
///     "SELECT u.name FROM users u JOIN orders o ON u.id = o.user_id",
/// );
/// let result = generate_graph(&request).unwrap();
///
/// assert!(result.graph.node("table:users").is_some());
/// assert!(result.graph.node("field:users.name").is_some());
/// assert_eq!(result.graph.links_of_type(LinkType::FieldJoin).count(), 1);
/// ```
pub fn generate_graph(request: &GraphRequest) -> Result<GraphResult, InputError> {
    #[cfg(feature = "tracing")]
    let _span = info_span!("generate_graph", dialect = ?request.dialect).entered();

    let parser = match request.parser {
        ParserPreference::Auto => StatementParser::for_dialect(request.dialect),
        ParserPreference::Fallback => StatementParser::new(),
    };
    run(&parser, &request.sql, &request.graph_options())
}

/// Builds a graph from an AST produced by the host's own parser.
///
/// An AST matching none of the known shapes yields the diagnostic graph.
pub fn generate_graph_from_ast(raw: RawAst, options: &GraphOptions) -> Graph {
    match normalize(raw) {
        Ok(statement) => build_graph(&statement, options),
        Err(error) => {
            #[cfg(feature = "tracing")]
            debug!(error = %error, "host AST not recognized");
            Graph::diagnostic(error.to_string())
        }
    }
}

/// A long-lived pipeline owned by a host.
///
/// Keeps its parser slots across calls and remembers the alias bindings of
/// the last graph that was built without degrading.
#[derive(Debug)]
pub struct Session {
    parser: StatementParser,
    options: GraphOptions,
    last_aliases: BTreeMap<String, String>,
}

impl Default for Session {
    /// The built-in grammar (generic dialect) in front of the fallback.
    fn default() -> Self {
        Self::new(StatementParser::for_dialect(Dialect::Generic))
    }
}

impl Session {
    pub fn new(parser: StatementParser) -> Self {
        Self {
            parser,
            options: GraphOptions::default(),
            last_aliases: BTreeMap::new(),
        }
    }

    pub fn with_options(mut self, options: GraphOptions) -> Self {
        self.options = options;
        self
    }

    pub fn generate(&mut self, sql: &str) -> Result<GraphResult, InputError> {
        let result = run(&self.parser, sql, &self.options)?;
        if !result.graph.is_diagnostic() {
            self.last_aliases = result.graph.aliases.clone();
        }
        Ok(result)
    }

    /// Alias to table bindings of the last non-diagnostic graph.
    pub fn last_aliases(&self) -> &BTreeMap<String, String> {
        &self.last_aliases
    }
}

fn run(
    parser: &StatementParser,
    sql: &str,
    options: &GraphOptions,
) -> Result<GraphResult, InputError> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(InputError::Empty);
    }

    let ParseOutcome { ast, parser: used } = parser.parse(sql);
    let (statement, parser_used) = statement_of(parser, sql, ast, used);

    Ok(GraphResult {
        graph: build_graph(&statement, options),
        statement,
        parser_used,
    })
}

/// Normalizes a parser slot's AST, re-parsing with the fallback when the
/// shape is not recognized.
fn statement_of(
    parser: &StatementParser,
    sql: &str,
    ast: RawAst,
    used: ParserKind,
) -> (CanonicalStatement, ParserKind) {
    match normalize(ast) {
        Ok(statement) => (statement, used),
        Err(_error) => {
            #[cfg(feature = "tracing")]
            debug!(error = %_error, parser = ?used, "re-parsing with fallback parser");

            let fallback = parser.parse_fallback(sql);
            let statement = normalize(fallback.ast).unwrap_or_default();
            (statement, fallback.parser)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use serde_json::json;

    #[test]
    fn test_blank_input_is_rejected() {
        assert_eq!(
            generate_graph(&GraphRequest::new("  \n\t ")).unwrap_err(),
            InputError::Empty
        );
    }

    #[test]
    fn test_grammar_parser_is_used_first() {
        let result =
            generate_graph(&GraphRequest::new("SELECT a.x FROM a JOIN b ON a.id = b.a_id")).unwrap();
        assert_eq!(result.parser_used, ParserKind::Grammar);
    }

    #[test]
    fn test_fallback_preference_skips_grammar() {
        let mut request = GraphRequest::new("SELECT a.x FROM a");
        request.parser = ParserPreference::Fallback;
        let result = generate_graph(&request).unwrap();
        assert_eq!(result.parser_used, ParserKind::Fallback);
        assert!(result.graph.node("field:a.x").is_some());
    }

    #[test]
    fn test_unrecognized_injected_ast_falls_back() {
        let parser = StatementParser::new()
            .with_grammar_fn(|_sql: &str| -> Result<RawAst, ParseError> {
                Ok(RawAst::Json(json!({"kind": "mystery"})))
            });
        let mut session = Session::new(parser);

        let result = session.generate("SELECT users.id FROM users").unwrap();

        assert_eq!(result.parser_used, ParserKind::Fallback);
        assert!(result.graph.node("field:users.id").is_some());
    }

    #[test]
    fn test_session_remembers_last_aliases() {
        let mut session = Session::default();

        session.generate("SELECT o.total FROM orders o").unwrap();
        assert_eq!(
            session.last_aliases().get("o").map(String::as_str),
            Some("orders")
        );

        session.generate("SELECT id FROM users").unwrap();
        assert!(session.last_aliases().is_empty());

        assert!(session.generate("").is_err());
        assert!(session.last_aliases().is_empty());
    }

    #[test]
    fn test_unrecognized_host_ast_is_diagnostic() {
        let graph = generate_graph_from_ast(json!([1, 2, 3]).into(), &GraphOptions::default());
        assert!(graph.is_diagnostic());
    }

    #[test]
    fn test_host_structured_ast() {
        let raw = RawAst::from(json!({
            "SELECT": {
                "result_columns": [{"expr": {"type": "column", "table": "u", "column": "name"}}],
                "FROM": [{"table": "users", "as": "u"}]
            }
        }));
        let graph = generate_graph_from_ast(raw, &GraphOptions::default());

        assert!(!graph.is_diagnostic());
        assert!(graph.node("field:users.name").is_some());
        assert!(graph.node("table:u").is_some_and(|n| n.is_alias()));
    }
}
