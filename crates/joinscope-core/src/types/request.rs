//! Request types for the statement-to-graph API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A request to turn one SQL SELECT statement into a relationship graph.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphRequest {
    /// The SQL statement (UTF-8, a single SELECT)
    pub sql: String,

    /// SQL dialect used by the grammar parser
    #[serde(default)]
    pub dialect: Dialect,

    /// Which parsers to try
    #[serde(default)]
    pub parser: ParserPreference,

    /// Optional graph construction options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<GraphOptions>,
}

impl GraphRequest {
    /// Create a request with default dialect, parser, and options.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            dialect: Dialect::default(),
            parser: ParserPreference::default(),
            options: None,
        }
    }

    /// Effective options, falling back to defaults.
    pub fn graph_options(&self) -> GraphOptions {
        self.options.clone().unwrap_or_default()
    }
}

/// Parser selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParserPreference {
    /// Try the full-grammar parser first, fall back to pattern matching.
    #[default]
    Auto,
    /// Skip the grammar parser and use the pattern-matching fallback only.
    Fallback,
}

/// Options that tune graph construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphOptions {
    /// Synthesize chain joins between consecutive tables when none were parsed (default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infer_joins: Option<bool>,

    /// Emit join links between alias table nodes as written (default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_joins: Option<bool>,
}

impl GraphOptions {
    pub fn infer_joins(&self) -> bool {
        self.infer_joins.unwrap_or(true)
    }

    pub fn alias_joins(&self) -> bool {
        self.alias_joins.unwrap_or(true)
    }
}

/// SQL dialect for the grammar parser.
///
/// The fallback parser is dialect agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
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

impl Dialect {
    pub fn to_sqlparser_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{
            AnsiDialect, BigQueryDialect, ClickHouseDialect, DatabricksDialect, DuckDbDialect,
            GenericDialect, HiveDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
            RedshiftSqlDialect, SQLiteDialect, SnowflakeDialect,
        };
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::Ansi => Box::new(AnsiDialect {}),
            Self::Bigquery => Box::new(BigQueryDialect {}),
            Self::Clickhouse => Box::new(ClickHouseDialect {}),
            Self::Databricks => Box::new(DatabricksDialect {}),
            Self::Duckdb => Box::new(DuckDbDialect {}),
            Self::Hive => Box::new(HiveDialect {}),
            Self::Mssql => Box::new(MsSqlDialect {}),
            Self::Mysql => Box::new(MySqlDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::Redshift => Box::new(RedshiftSqlDialect {}),
            Self::Snowflake => Box::new(SnowflakeDialect {}),
            Self::Sqlite => Box::new(SQLiteDialect {}),
        }
    }
}
