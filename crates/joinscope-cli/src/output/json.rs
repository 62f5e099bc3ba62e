//! JSON output formatting.

use anyhow::{Context, Result};
use joinscope_core::GraphResult;

/// Format the graph result as JSON.
///
/// If `compact` is true, outputs minified JSON without whitespace.
pub fn format_json(result: &GraphResult, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(result)
    } else {
        serde_json::to_string_pretty(result)
    };
    json.context("Failed to serialize graph")
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinscope_core::{generate_graph, GraphRequest};

    fn users() -> GraphResult {
        generate_graph(&GraphRequest::new("SELECT id FROM users")).unwrap()
    }

    #[test]
    fn test_json_pretty() {
        let json = format_json(&users(), false).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"parserUsed\""));
        assert!(json.contains("\"table:users\""));
    }

    #[test]
    fn test_json_compact() {
        let json = format_json(&users(), true).unwrap();
        assert!(!json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["graph"]["diagnostic"], false);
    }
}
