//! Types for the statement-to-graph API.
//!
//! Requests configure the pipeline, the canonical statement is the normalized
//! form every parser output is mapped onto, and the graph is what gets handed
//! to a renderer.

mod request;
mod response;
mod statement;

pub use request::{Dialect, GraphOptions, GraphRequest, ParserPreference};
pub use response::{
    field_id, table_id, Graph, GraphResult, JoinConfidence, JoinTarget, Link, LinkType, Node,
    NodeType, ParserKind, DIAGNOSTIC_FIELD, DIAGNOSTIC_TABLE, PLACEHOLDER_FIELD, PLACEHOLDER_TABLE,
};
pub use statement::{
    CanonicalStatement, ColumnRef, ComparisonOp, JoinClause, ProjectedColumn, TableRef,
    WhereCondition,
};
