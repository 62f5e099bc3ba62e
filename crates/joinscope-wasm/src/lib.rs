use joinscope_core::{
    generate_graph, generate_graph_from_ast, GraphOptions, GraphRequest, RawAst, Session,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Error envelope returned in place of a result.
#[derive(Debug, Serialize)]
struct ErrorResult {
    error: String,
}

fn error_json(message: impl Into<String>) -> String {
    serde_json::to_string(&ErrorResult {
        error: message.into(),
    })
    .unwrap_or_else(|_| r#"{"error":"Failed to serialize error result"}"#.to_string())
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| error_json(format!("Failed to serialize result: {e}")))
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    #[cfg(feature = "tracing")]
    tracing_wasm::set_as_global_default();
}

/// Main entry point - accepts a JSON `GraphRequest`, returns a JSON `GraphResult`.
/// This function never throws - errors are returned in an `error` field
#[wasm_bindgen]
pub fn generate_graph_json(request_json: &str) -> String {
    let request: GraphRequest = match serde_json::from_str(request_json) {
        Ok(req) => req,
        Err(e) => return error_json(format!("Invalid request format: {e}")),
    };

    match generate_graph(&request) {
        Ok(result) => to_json(&result),
        Err(e) => error_json(e.to_string()),
    }
}

/// Builds a graph from an AST produced by a JavaScript SQL parser.
///
/// `ast_json` is the parser's output as JSON, in either the full-grammar
/// (`{"ast": {...}}`) or the structured (`{"SELECT": {...}}`) shape.
/// `options_json` may be empty for default options. Returns a JSON `Graph`;
/// an unrecognized AST yields the diagnostic graph.
#[wasm_bindgen]
pub fn graph_from_ast_json(ast_json: &str, options_json: &str) -> String {
    let ast: serde_json::Value = match serde_json::from_str(ast_json) {
        Ok(ast) => ast,
        Err(e) => return error_json(format!("Invalid AST JSON: {e}")),
    };
    let options: GraphOptions = if options_json.trim().is_empty() {
        GraphOptions::default()
    } else {
        match serde_json::from_str(options_json) {
            Ok(options) => options,
            Err(e) => return error_json(format!("Invalid options format: {e}")),
        }
    };

    to_json(&generate_graph_from_ast(RawAst::from(ast), &options))
}

/// A page-lifetime pipeline that remembers the last alias map.
#[wasm_bindgen]
pub struct JoinScope {
    session: Session,
}

#[wasm_bindgen]
impl JoinScope {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JoinScope {
        JoinScope {
            session: Session::default(),
        }
    }

    /// Graphs one statement; throws only on blank input.
    pub fn generate(&mut self, sql: &str) -> Result<String, JsValue> {
        self.session
            .generate(sql)
            .map(|result| to_json(&result))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Alias to table bindings of the last non-diagnostic graph, as JSON.
    #[wasm_bindgen(js_name = lastAliases)]
    pub fn last_aliases(&self) -> String {
        to_json(self.session.last_aliases())
    }
}

impl Default for JoinScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Get version information
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_graph_json_simple() {
        let request = r#"{"sql": "SELECT u.name FROM users u", "dialect": "generic"}"#;
        let result = generate_graph_json(request);

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert!(parsed["error"].is_null());
        assert_eq!(parsed["parserUsed"], "grammar");
        assert_eq!(parsed["graph"]["aliases"]["u"], "users");

        let nodes = parsed["graph"]["nodes"].as_array().unwrap();
        assert!(nodes.iter().any(|n| n["id"] == "field:users.name"));
    }

    #[test]
    fn test_generate_graph_json_with_options() {
        let request = r#"{"sql": "SELECT * FROM a, b", "options": {"inferJoins": false}}"#;
        let result = generate_graph_json(request);

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert!(parsed["graph"]["links"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_generate_graph_json_empty_sql() {
        let result = generate_graph_json(r#"{"sql": "   "}"#);

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["error"], "SQL input is empty");
    }

    #[test]
    fn test_generate_graph_json_invalid_request() {
        let result = generate_graph_json(r#"{"not_valid": true}"#);

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert!(parsed["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request format"));
    }

    #[test]
    fn test_graph_from_full_grammar_ast() {
        let ast = r#"{
            "ast": {
                "type": "select",
                "columns": [{"expr": {"type": "column_ref", "table": "o", "column": "total"}, "as": null}],
                "from": [
                    {"db": null, "table": "orders", "as": "o"},
                    {"db": null, "table": "users", "as": "u", "join": "INNER JOIN",
                     "on": {"type": "binary_expr", "operator": "=",
                            "left": {"type": "column_ref", "table": "o", "column": "user_id"},
                            "right": {"type": "column_ref", "table": "u", "column": "id"}}}
                ],
                "where": null
            }
        }"#;
        let result = graph_from_ast_json(ast, "");

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["diagnostic"], false);
        let links = parsed["links"].as_array().unwrap();
        assert!(links.iter().any(|l| l["type"] == "table-join"
            && l["source"] == "table:orders"
            && l["target"] == "table:users"));
    }

    #[test]
    fn test_graph_from_unknown_ast_is_diagnostic() {
        let result = graph_from_ast_json(r#"{"statement": 1}"#, r#"{"aliasJoins": false}"#);

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["diagnostic"], true);
    }

    #[test]
    fn test_session_keeps_last_aliases() {
        let mut scope = JoinScope::new();
        scope.generate("SELECT o.id FROM orders o").unwrap();

        let aliases: serde_json::Value = serde_json::from_str(&scope.last_aliases()).unwrap();
        assert_eq!(aliases["o"], "orders");
    }

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }
}
