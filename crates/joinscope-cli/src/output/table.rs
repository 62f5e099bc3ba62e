//! Human-readable table output formatting.

use is_terminal::IsTerminal;
use joinscope_core::{GraphResult, JoinConfidence, LinkType, Node};
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Format the graph result as human-readable text with optional colors.
pub fn format_table(result: &GraphResult, use_colors: bool) -> String {
    let colored = use_colors && std::io::stdout().is_terminal();
    let mut out = String::new();

    write_header(&mut out, colored);
    write_summary(&mut out, result, colored);
    write_tables(&mut out, result, colored);
    write_joins(&mut out, result, colored);

    out
}

fn write_header(out: &mut String, colored: bool) {
    let title = "JoinScope Graph";
    let line = "═".repeat(50);

    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
        writeln!(out, "{}", line.dimmed()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
        writeln!(out, "{line}").unwrap();
    }
}

fn write_summary(out: &mut String, result: &GraphResult, colored: bool) {
    let graph = &result.graph;
    let stats = format!(
        "Summary: {} tables | {} fields | {} joins | parser: {}",
        graph.table_nodes().filter(|n| !n.is_alias()).count(),
        graph.field_nodes().count(),
        graph
            .links_of_type(LinkType::TableJoin)
            .filter(|l| !l.is_alias_join())
            .count(),
        parser_name(result),
    );

    writeln!(out).unwrap();
    if colored {
        writeln!(out, "{}", stats.cyan()).unwrap();
    } else {
        writeln!(out, "{stats}").unwrap();
    }
    if graph.is_diagnostic() {
        let warning = "Graph construction failed; showing diagnostic graph";
        if colored {
            writeln!(out, "{}", warning.yellow()).unwrap();
        } else {
            writeln!(out, "{warning}").unwrap();
        }
    }
    writeln!(out).unwrap();
}

fn parser_name(result: &GraphResult) -> &'static str {
    match result.parser_used {
        joinscope_core::ParserKind::GrammarFn => "grammar-fn",
        joinscope_core::ParserKind::Grammar => "grammar",
        joinscope_core::ParserKind::Fallback => "fallback",
    }
}

fn write_tables(out: &mut String, result: &GraphResult, colored: bool) {
    let graph = &result.graph;

    if colored {
        writeln!(out, "{}", "Tables:".bold()).unwrap();
    } else {
        writeln!(out, "Tables:").unwrap();
    }

    for table in graph.table_nodes().filter(|n| !n.is_alias()) {
        let aliases: Vec<&str> = graph
            .aliases
            .iter()
            .filter(|(_, real)| **real == table.original_name)
            .map(|(alias, _)| alias.as_str())
            .collect();

        if aliases.is_empty() {
            writeln!(out, "  {}", table.name).unwrap();
        } else {
            writeln!(out, "  {} (as {})", table.name, aliases.join(", ")).unwrap();
        }

        for field in graph
            .field_nodes()
            .filter(|f| f.table.as_deref() == Some(table.original_name.as_str()))
        {
            writeln!(out, "    {}{}", field.name, markers(field, colored)).unwrap();
        }
    }
    writeln!(out).unwrap();
}

fn markers(field: &Node, colored: bool) -> String {
    let mut tags = Vec::new();
    if field.is_result_field() {
        tags.push("result");
    }
    if field.is_join_field() {
        tags.push("join");
    }
    if tags.is_empty() {
        return String::new();
    }

    let text = format!(" [{}]", tags.join(", "));
    if colored {
        text.green().to_string()
    } else {
        text
    }
}

fn write_joins(out: &mut String, result: &GraphResult, colored: bool) {
    let joins: Vec<_> = result
        .graph
        .links_of_type(LinkType::TableJoin)
        .filter(|l| !l.is_alias_join())
        .collect();
    if joins.is_empty() {
        return;
    }

    if colored {
        writeln!(out, "{}", "Joins:".bold()).unwrap();
    } else {
        writeln!(out, "Joins:").unwrap();
    }

    for link in joins {
        let arrow = if colored {
            "↔".green().to_string()
        } else {
            "↔".to_string()
        };
        let source = link.source.trim_start_matches("table:");
        let target = link.target.trim_start_matches("table:");
        let condition = link.condition.as_deref().unwrap_or_default();
        let guess = if link.confidence == Some(JoinConfidence::Inferred) {
            " (inferred)"
        } else {
            ""
        };
        writeln!(out, "  {source} {arrow} {target}  ON {condition}{guess}").unwrap();
    }
    writeln!(out).unwrap();
}
