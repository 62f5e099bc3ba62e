//! Graph construction: [`CanonicalStatement`] to [`Graph`].
//!
//! The builder runs a fixed sequence of steps over explicit working state:
//!
//! 1. register tables and aliases ([`tables`](self::tables)),
//! 2. extract join relations from ON equalities, or infer a chain of joins
//!    when none could be read ([`joins`](self::joins)),
//! 3. attribute projected and filtered columns to tables, then fold alias
//!    field sets into their real tables ([`fields`](self::fields)),
//! 4. emit nodes and links ([`emit`](self::emit)).
//!
//! [`build_graph`] never fails. Construction errors and panics become a
//! diagnostic graph, and a statement with nothing drawable becomes the
//! placeholder graph.

use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
#[cfg(feature = "tracing")]
use tracing::{info_span, warn};

mod emit;
mod fields;
mod joins;
mod tables;

use crate::error::{panic_message, GraphConstructionError};
use crate::types::{
    CanonicalStatement, Graph, GraphOptions, JoinConfidence, JoinTarget, Link, Node,
};

/// Builds the relationship graph for one statement.
pub fn build_graph(statement: &CanonicalStatement, options: &GraphOptions) -> Graph {
    #[cfg(feature = "tracing")]
    let _span = info_span!(
        "build_graph",
        tables = statement.tables.len(),
        joins = statement.joins.len()
    )
    .entered();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        GraphBuilder::new(statement, options).build()
    }));

    let error = match outcome {
        Ok(Ok(graph)) => return graph,
        Ok(Err(error)) => error,
        Err(payload) => GraphConstructionError::Panicked(panic_message(payload.as_ref())),
    };

    #[cfg(feature = "tracing")]
    warn!(error = %error, "graph construction failed, returning diagnostic graph");

    Graph::diagnostic(error.to_string())
}

/// A resolved join between two columns.
#[derive(Debug, Clone)]
pub(super) struct JoinRelation {
    pub(super) left_field: String,
    pub(super) right_field: String,
    /// Real tables behind the qualifiers
    pub(super) left_real: String,
    pub(super) right_real: String,
    /// Display text, alias form
    pub(super) condition: String,
    pub(super) confidence: JoinConfidence,
}

/// Working state of one conversion.
pub(super) struct GraphBuilder<'a> {
    pub(super) statement: &'a CanonicalStatement,
    pub(super) options: &'a GraphOptions,
    /// Real table names in registration order
    pub(super) tables: IndexSet<String>,
    /// Alias to real table
    pub(super) aliases: IndexMap<String, String>,
    /// Table or alias name to the fields seen through it
    pub(super) table_fields: IndexMap<String, IndexSet<String>>,
    /// Bare names of projected fields
    pub(super) result_fields: HashSet<String>,
    /// Field node id to display name
    pub(super) field_display: IndexMap<String, String>,
    pub(super) relations: Vec<JoinRelation>,
    /// Both endpoints of every relation, seen from each side
    pub(super) endpoints: Vec<JoinTarget>,
    pub(super) nodes: Vec<Node>,
    pub(super) links: Vec<Link>,
    pub(super) node_ids: HashSet<String>,
    /// Unordered table pairs that already have a join link
    pub(super) processed_pairs: HashSet<(String, String)>,
}

impl<'a> GraphBuilder<'a> {
    pub(super) fn new(statement: &'a CanonicalStatement, options: &'a GraphOptions) -> Self {
        Self {
            statement,
            options,
            tables: IndexSet::new(),
            aliases: IndexMap::new(),
            table_fields: IndexMap::new(),
            result_fields: HashSet::new(),
            field_display: IndexMap::new(),
            relations: Vec::new(),
            endpoints: Vec::new(),
            nodes: Vec::new(),
            links: Vec::new(),
            node_ids: HashSet::new(),
            processed_pairs: HashSet::new(),
        }
    }

    pub(super) fn build(mut self) -> Result<Graph, GraphConstructionError> {
        self.register_tables()?;
        self.extract_relations();
        if self.relations.is_empty() && self.tables.len() > 1 && self.options.infer_joins() {
            self.infer_relations();
        }

        self.attribute_fields();
        self.merge_alias_fields();

        self.emit_table_nodes();
        self.emit_field_nodes();
        self.emit_join_links()?;
        if self.options.alias_joins() && !self.aliases.is_empty() {
            self.emit_alias_joins();
        }

        if self.nodes.is_empty() {
            return Ok(Graph::placeholder());
        }

        let graph = Graph {
            nodes: self.nodes,
            links: self.links,
            diagnostic: false,
            aliases: self.aliases.into_iter().collect(),
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Real table behind a qualifier.
    pub(super) fn resolve(&self, qualifier: &str) -> String {
        self.aliases
            .get(qualifier)
            .cloned()
            .unwrap_or_else(|| qualifier.to_string())
    }

    /// Adds `field` to the real table's set and, when `qualifier` is an
    /// alias, to the alias's set too.
    pub(super) fn add_field(&mut self, qualifier: &str, real: &str, field: &str) {
        if let Some(fields) = self.table_fields.get_mut(real) {
            fields.insert(field.to_string());
        }
        if qualifier != real {
            if let Some(fields) = self.table_fields.get_mut(qualifier) {
                fields.insert(field.to_string());
            }
        }
    }
}

/// Order-independent key of a table pair.
pub(super) fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}
