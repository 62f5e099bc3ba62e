//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use joinscope_core::{GraphOptions, ParserPreference};
use std::path::PathBuf;

/// JoinScope - SQL join relationship graph
#[derive(Parser, Debug)]
#[command(name = "joinscope")]
#[command(about = "Draw the tables, fields and joins of a SQL SELECT statement", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQL file holding one SELECT statement (reads from stdin if omitted)
    #[arg(value_name = "FILE", conflicts_with = "example")]
    pub file: Option<PathBuf>,

    /// SQL dialect used by the grammar parser
    #[arg(short, long, default_value = "generic", value_enum)]
    pub dialect: DialectArg,

    /// Which parsers to try
    #[arg(short, long, default_value = "auto", value_enum)]
    pub parser: ParserArg,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Do not guess joins between tables when none could be read
    #[arg(long)]
    pub no_infer_joins: bool,

    /// Do not draw joins between alias nodes
    #[arg(long)]
    pub no_alias_joins: bool,

    /// Graph the built-in example statement instead of reading input
    #[arg(long)]
    pub example: bool,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,
}

impl Args {
    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            infer_joins: self.no_infer_joins.then_some(false),
            alias_joins: self.no_alias_joins.then_some(false),
        }
    }
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Ansi,
    Bigquery,
    Clickhouse,
    Databricks,
    Duckdb,
    Hive,
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl From<DialectArg> for joinscope_core::Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => joinscope_core::Dialect::Generic,
            DialectArg::Ansi => joinscope_core::Dialect::Ansi,
            DialectArg::Bigquery => joinscope_core::Dialect::Bigquery,
            DialectArg::Clickhouse => joinscope_core::Dialect::Clickhouse,
            DialectArg::Databricks => joinscope_core::Dialect::Databricks,
            DialectArg::Duckdb => joinscope_core::Dialect::Duckdb,
            DialectArg::Hive => joinscope_core::Dialect::Hive,
            DialectArg::Mssql => joinscope_core::Dialect::Mssql,
            DialectArg::Mysql => joinscope_core::Dialect::Mysql,
            DialectArg::Postgres => joinscope_core::Dialect::Postgres,
            DialectArg::Redshift => joinscope_core::Dialect::Redshift,
            DialectArg::Snowflake => joinscope_core::Dialect::Snowflake,
            DialectArg::Sqlite => joinscope_core::Dialect::Sqlite,
        }
    }
}

/// Parser selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ParserArg {
    /// Grammar parser first, pattern matching when it fails
    Auto,
    /// Pattern matching only
    Fallback,
}

impl From<ParserArg> for ParserPreference {
    fn from(p: ParserArg) -> Self {
        match p {
            ParserArg::Auto => ParserPreference::Auto,
            ParserArg::Fallback => ParserPreference::Fallback,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Table,
    /// JSON graph result
    Json,
    /// Mermaid flowchart
    Mermaid,
}
