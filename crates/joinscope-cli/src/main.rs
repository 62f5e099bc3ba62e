//! JoinScope CLI - SQL join relationship graph

use joinscope_cli::cli;
use joinscope_cli::input;
use joinscope_cli::logging;
use joinscope_cli::output;

use anyhow::{Context, Result};
use clap::Parser;
use joinscope_core::{generate_graph, GraphRequest};
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::warn;

use cli::{Args, OutputFormat};
use output::{format_json, format_mermaid, format_table};

/// The graph is a diagnostic stand-in.
const EXIT_FAILURE: u8 = 1;
/// Usage or input error (unreadable file, empty statement).
const EXIT_INPUT_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);

    match run(args) {
        Ok(degraded) => {
            if degraded {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("joinscope: error: {e:#}");
            ExitCode::from(EXIT_INPUT_ERROR)
        }
    }
}

/// Returns whether the graph had to degrade to a diagnostic graph.
fn run(args: Args) -> Result<bool> {
    let sql = if args.example {
        input::EXAMPLE_SQL.to_string()
    } else {
        input::read_input(args.file.as_deref())?
    };

    let request = GraphRequest {
        sql,
        dialect: args.dialect.into(),
        parser: args.parser.into(),
        options: Some(args.graph_options()),
    };
    let result = generate_graph(&request).context("Cannot graph statement")?;

    let output_str = match args.format {
        OutputFormat::Json => format_json(&result, args.compact)?,
        OutputFormat::Table => format_table(&result, args.output.is_none()),
        OutputFormat::Mermaid => format_mermaid(&result.graph),
    };

    write_output(&args.output, &output_str)?;

    let degraded = result.graph.is_diagnostic();
    if degraded {
        warn!(
            parser = ?result.parser_used,
            "graph construction failed, output is a diagnostic graph"
        );
        if !args.quiet && args.format != OutputFormat::Json {
            eprintln!("joinscope: warning: graph construction failed");
        }
    }

    Ok(degraded)
}

fn write_output(path: &Option<std::path::PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
