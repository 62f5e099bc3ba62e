//! Mermaid diagram generation.

use joinscope_core::{Graph, LinkType};
use std::fmt::Write;

/// Format the graph as a Mermaid `flowchart LR`.
///
/// Each real table becomes a subgraph holding its fields, alias nodes hang
/// off their table with a dotted edge, and joins become labelled edges
/// between tables (or between alias nodes for joins drawn as written).
pub fn format_mermaid(graph: &Graph) -> String {
    let mut out = String::from("flowchart LR\n");

    for table in graph.table_nodes().filter(|n| !n.is_alias()) {
        let table_id = sanitize_id(&table.id);
        writeln!(out, "    subgraph {table_id}[\"{}\"]", escape_label(&table.name)).unwrap();
        for field in graph
            .field_nodes()
            .filter(|f| f.table.as_deref() == Some(table.original_name.as_str()))
        {
            writeln!(
                out,
                "        {}[\"{}\"]",
                sanitize_id(&field.id),
                escape_label(&field.name)
            )
            .unwrap();
        }
        writeln!(out, "    end").unwrap();
    }

    for alias in graph.table_nodes().filter(|n| n.is_alias()) {
        writeln!(
            out,
            "    {}([\"{}\"])",
            sanitize_id(&alias.id),
            escape_label(&alias.name)
        )
        .unwrap();
    }

    for link in &graph.links {
        let source = sanitize_id(&link.source);
        let target = sanitize_id(&link.target);
        match link.link_type {
            LinkType::AliasTable => writeln!(out, "    {source} -.-> {target}").unwrap(),
            LinkType::TableJoin | LinkType::FieldJoin => {
                let label = escape_label(link.condition.as_deref().unwrap_or_default());
                let edge = if link.is_alias_join() { "-.-" } else { "---" };
                writeln!(out, "    {source} {edge}|\"{label}\"| {target}").unwrap();
            }
            LinkType::FieldTable => {}
        }
    }

    out
}

/// Mermaid-safe node id. The `table:`/`field:` kind becomes a `table_`/`field_`
/// prefix. In the rest, `_` is doubled and any other non-alphanumeric
/// character is written as `_<hex>_`, so distinct ids never share an output.
fn sanitize_id(id: &str) -> String {
    let (kind, name) = id.split_once(':').unwrap_or(("node", id));
    let mut out = format!("{kind}_");
    for c in name.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => out.push(c),
            '_' => out.push_str("__"),
            c => write!(out, "_{:x}_", u32::from(c)).unwrap(),
        }
    }
    out
}

/// Escape label for Mermaid
fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinscope_core::{generate_graph, GraphRequest};

    #[test]
    fn test_mermaid_flowchart() {
        let graph = generate_graph(&GraphRequest::new(
            "SELECT o.total FROM orders o JOIN users u ON o.user_id = u.id",
        ))
        .unwrap()
        .graph;

        let output = format_mermaid(&graph);
        assert!(output.starts_with("flowchart LR\n"));
        assert!(output.contains("subgraph table_orders[\"orders\"]"));
        assert!(output.contains("field_orders_2e_total[\"o.total (orders.total)\"]"));
        assert!(output.contains("table_o([\"o (orders)\"])"));
        assert!(output.contains("table_o -.-> table_orders"));
        assert!(output.contains("table_orders ---|\"o.user_id = u.id\"| table_users"));
        assert!(output.contains("table_o -.-|\"o.user_id = u.id\"| table_u"));
    }

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("field:orders.total"), "field_orders_2e_total");
        assert_eq!(sanitize_id("field:orders.user_id"), "field_orders_2e_user__id");
        assert_eq!(sanitize_id("table:Query Result"), "table_Query_20_Result");
    }

    #[test]
    fn test_sanitize_id_keeps_distinct_ids_apart() {
        let ids = [
            "field:a_b.c",
            "field:a.b_c",
            "field:a._b",
            "field:a_.b",
            "table:a_b",
            "table:a b",
        ];
        let sanitized: std::collections::HashSet<String> =
            ids.iter().map(|id| sanitize_id(id)).collect();
        assert_eq!(sanitized.len(), ids.len());
    }
}
