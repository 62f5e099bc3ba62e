pub mod ast;
mod builder;
pub mod error;
mod naming;
mod normalizer;
pub mod parser;
mod pipeline;
pub mod types;

// Re-export main types and functions
pub use builder::build_graph;
pub use error::{GraphConstructionError, InputError, ParseError, ParseErrorKind, RecognitionError};
pub use normalizer::{normalize, normalize_shape};
pub use parser::{parse, parse_fallback, GrammarParser, ParseOutcome, SqlparserGrammar, StatementParser};
pub use pipeline::{generate_graph, generate_graph_from_ast, Session};

pub use ast::{AstShape, RawAst};

// Re-export types explicitly
pub use types::{
    // Node and link ids
    field_id,
    table_id,
    // Statement model
    CanonicalStatement,
    ColumnRef,
    ComparisonOp,
    // Request types
    Dialect,
    // Response types
    Graph,
    GraphOptions,
    GraphRequest,
    GraphResult,
    JoinClause,
    JoinConfidence,
    JoinTarget,
    Link,
    LinkType,
    Node,
    NodeType,
    ParserKind,
    ParserPreference,
    ProjectedColumn,
    TableRef,
    WhereCondition,
    DIAGNOSTIC_FIELD,
    DIAGNOSTIC_TABLE,
    PLACEHOLDER_FIELD,
    PLACEHOLDER_TABLE,
};
